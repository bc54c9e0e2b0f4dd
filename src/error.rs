//! Errors raised while assembling or interpreting UVM programs.

use thiserror::Error;

use crate::address::AddressNumberType;

#[derive(Debug, Error)]
pub enum UvmError {
  /// The opcode is not one of 198, 67, 244, 103. Recovered by the assembler.
  #[error("Unknown instruction A={0}")]
  UnknownOpcode(u64),

  /// Only raised under `FieldPolicy::Reject`.
  #[error("Field {field}={value} does not fit in {width} bits")]
  FieldOverflow {
    field: char,
    value: u64,
    width: u32
  },

  #[error("Error on line {line}: cannot parse instruction `{text}`")]
  MalformedInstructionLine {
    line: usize,
    text: String
  },

  #[error("Memory range {start}:{end} is outside of 0:{}", crate::uvm::MEMORY_SIZE)]
  InvalidRange {
    start: AddressNumberType,
    end: AddressNumberType
  },

  #[error("Memory range `{0}` is not of the form <start>:<end>")]
  MalformedRange(String),

  #[error("Memory address {address} is out of bounds")]
  AddressOutOfBounds {
    address: u64
  },

  #[error("CSV error: {0}")]
  Csv(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

pub type UvmResult<T> = Result<T, UvmError>;
