use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use strum_macros::Display as StrumDisplay;
use num_enum::{TryFromPrimitive, IntoPrimitive};

/**
  Opcodes of the virtual machine.

  The discriminants are the opcode bytes themselves, so an opcode byte read from a program
  converts to an `Operation` with `Operation::try_from`. The encoded size and the position of
  the optional `D` field are a function of the opcode alone. See `Operation::layout()`.
*/
#[derive(
  StrumDisplay, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,             Eq,            PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum Operation {
  LoadConstant = 198, // memory[B] = C
  ReadMemory   = 67,  // memory[B] = memory[D] + C
  WriteMemory  = 244, // memory[B] = memory[C]
  Subtract     = 103, // memory[D] = memory[B] - memory[C]
}

/**
  The bit layout of one opcode. Every opcode shares the same prefix

      [A:8][B:5][C:...]

  counting from the least significant bit, and differs only in how many bytes the encoded
  integer occupies and where, if anywhere, `D` is placed.
*/
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Layout {
  /// Encoded size in bytes.
  pub width: usize,
  /// Width of the `C` field in bits that survives encoding.
  pub c_bits: u32,
  /// Offset of the 5 bit `D` field, if the opcode encodes one.
  pub d_offset: Option<u32>,
}

pub const B_OFFSET: u32 = 8;
pub const B_BITS: u32 = 5;
pub const C_OFFSET: u32 = 13;
pub const D_BITS: u32 = 5;

impl Operation{
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Looks up an opcode given as a (possibly oversized) source field.
  pub fn from_code(code: u64) -> Option<Operation> {
    u8::try_from(code).ok().and_then(|byte| Operation::try_from(byte).ok())
  }

  pub fn layout(&self) -> Layout {
    match self {
      // [A:8][B:5][C:20][Reserved:15]
      Operation::LoadConstant => Layout{ width: 6, c_bits: 20, d_offset: None     },
      // [A:8][B:5][C:19], with [D:5] OR-ed over C at bit 25
      Operation::ReadMemory   => Layout{ width: 4, c_bits: 19, d_offset: Some(25) },
      // [A:8][B:5][C:5][Reserved:6]
      Operation::WriteMemory  => Layout{ width: 3, c_bits: 5,  d_offset: None     },
      // [A:8][B:5][C:5][D:5][Reserved:1]
      Operation::Subtract     => Layout{ width: 3, c_bits: 5,  d_offset: Some(18) },
    }
  }

  /// The number of bytes this opcode occupies in an assembled program.
  pub fn width(&self) -> usize {
    self.layout().width
  }
}


/// Holds the unencoded fields of one line of assembly. `D` is optional in the source and
/// defaults to zero.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct Instruction {
  pub a: u64,
  pub b: u64,
  pub c: u64,
  pub d: u64,
}

impl Instruction {
  pub fn new(a: u64, b: u64, c: u64, d: u64) -> Instruction {
    Instruction{ a, b, c, d }
  }

  pub fn operation(&self) -> Option<Operation> {
    Operation::from_code(self.a)
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.operation() {
      Some(operation) => {
        write!(f, "{}(A={}, B={}, C={}, D={})", operation, self.a, self.b, self.c, self.d)
      }
      None => {
        write!(f, "A={}, B={}, C={}, D={}", self.a, self.b, self.c, self.d)
      }
    }
  }
}
