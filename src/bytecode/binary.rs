/*!
  This module is responsible for the encoding and decoding of binary instructions.

  The assembler writes each instruction in as few bytes as its opcode needs (see
  `Operation::layout`). The interpreter reads programs through a 48 bit window,
  `Command`, and extracts the same three fields from every window regardless of opcode:

      opcode = command         & 0xFF
      arg1   = (command >> 8)  & 0x1F
      arg2   = (command >> 13) & 0xFFFFF

  `ReadMemory` and `Subtract` have one more field each, at bit 25 and bit 18 respectively.
  Both lie inside `arg2`.
*/

use std::fmt::{Display, Formatter};

use crate::error::{UvmError, UvmResult};
use super::{Operation, Instruction};
use super::instruction::{B_OFFSET, B_BITS, C_OFFSET, D_BITS};

/// The interpreter's view of one instruction: up to 48 bits, little-endian.
pub type Command = u64;
/// The number of bytes in a `Command` window.
pub const COMMAND_BYTES: usize = 6;

const ARG1_MASK    : Command = 0x1F;
const ARG2_MASK    : Command = 0xFFFFF;
const ADDRESS_SHIFT: u32     = 25;
const RESULT_SHIFT : u32     = 18;

/// What to do with a field that is wider than its slot in the layout.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FieldPolicy {
  /// OR the value in unchecked and cut the result to the opcode's width. Wide values spill
  /// into their neighbors.
  Truncate,
  /// Fail with `UvmError::FieldOverflow`.
  Reject
}

impl Default for FieldPolicy {
  fn default() -> Self {
    FieldPolicy::Truncate
  }
}

/// An encoded instruction. The byte length is a function of the opcode.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct EncodedInstruction {
  pub operation: Operation,
  pub value: Command
}

impl EncodedInstruction {
  /// The little-endian bytes of the instruction, `operation.width()` of them.
  pub fn to_bytes(&self) -> Vec<u8> {
    self.value.to_le_bytes()[..self.operation.width()].to_vec()
  }

  /// Renders the bytes as `0xHH,0xHH,...`, the form used in the assembly log.
  pub fn hex_list(&self) -> String {
    self.to_bytes()
        .iter()
        .map(|byte| format!("0x{:02X}", byte))
        .collect::<Vec<String>>()
        .join(",")
  }
}

fn low_bits(bits: u32) -> Command {
  match bits >= Command::BITS {
    true  => Command::MAX,
    false => (1 << bits) - 1
  }
}

fn check_field(field: char, value: u64, width: u32) -> UvmResult<()> {
  match value <= low_bits(width) {
    true  => Ok(()),
    false => Err(UvmError::FieldOverflow{ field, value, width })
  }
}

/**
  Encodes the instruction into bytecode. An opcode outside of the instruction set yields
  `UvmError::UnknownOpcode`, which callers are expected to recover from by skipping the
  instruction.
*/
pub fn encode_instruction(instruction: &Instruction, policy: FieldPolicy)
  -> UvmResult<EncodedInstruction>
{
  let operation = instruction.operation().ok_or(UvmError::UnknownOpcode(instruction.a))?;
  let layout    = operation.layout();

  if policy == FieldPolicy::Reject {
    check_field('B', instruction.b, B_BITS)?;
    check_field('C', instruction.c, layout.c_bits)?;
    if layout.d_offset.is_some() {
      check_field('D', instruction.d, D_BITS)?;
    }
  }

  let mut value =
      ( operation.code() as Command ) |
      ( instruction.b << B_OFFSET   ) |
      ( instruction.c << C_OFFSET   );
  if let Some(d_offset) = layout.d_offset {
    value |= instruction.d << d_offset;
  }

  Ok(EncodedInstruction{
    operation,
    value: value & low_bits(8 * layout.width as u32)
  })
}


/// The fields of a `Command`. Fields are extracted the same way for every opcode.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct DecodedInstruction {
  pub command: Command,
  pub opcode : u8,
  pub arg1   : u64,
  pub arg2   : u64
}

impl DecodedInstruction {
  pub fn operation(&self) -> Option<Operation> {
    Operation::from_code(self.opcode as u64)
  }

  /// The source address of `ReadMemory`.
  pub fn address(&self) -> u64 {
    (self.command >> ADDRESS_SHIFT) & ARG1_MASK
  }

  /// The destination address of `Subtract`.
  pub fn result_address(&self) -> u64 {
    (self.command >> RESULT_SHIFT) & ARG1_MASK
  }
}

impl Display for DecodedInstruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.operation() {
      Some(Operation::ReadMemory) => {
        write!(f, "ReadMemory({}, {}, {})", self.arg1, self.arg2, self.address())
      }
      Some(Operation::Subtract) => {
        write!(f, "Subtract({}, {}, {})", self.arg1, self.arg2, self.result_address())
      }
      Some(operation) => {
        write!(f, "{}({}, {})", operation, self.arg1, self.arg2)
      }
      None => {
        write!(f, "Nop(opcode={})", self.opcode)
      }
    }
  }
}

pub fn decode_instruction(command: Command) -> DecodedInstruction {
  DecodedInstruction{
    command,
    opcode: (command & 0xFF) as u8,
    arg1  : (command >> B_OFFSET) & ARG1_MASK,
    arg2  : (command >> C_OFFSET) & ARG2_MASK
  }
}

/// Assembles a little-endian integer from at most eight bytes.
pub fn read_command(bytes: &[u8]) -> Command {
  bytes
    .iter()
    .take(8)
    .enumerate()
    .fold(0, |command, (i, &byte)| command | ((byte as Command) << (8 * i)))
}
