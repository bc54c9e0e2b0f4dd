//! Addresses into the memory of the machine, and the half-open memory ranges used to report
//! the final memory state.

use std::ops::Add;
use std::fmt::{Display, Formatter};

use nom::{
  character::complete::{char as one_char, digit1, space0},
  combinator::{all_consuming, map_res},
  sequence::{delimited, separated_pair},
  error::ErrorKind,
  IResult
};

use crate::error::{UvmError, UvmResult};
use crate::uvm::MEMORY_SIZE;

// `AddressNumberType` is `usize`, as it is naturally an index into a memory store.
pub type AddressNumberType = usize;

/// A "pointer" to a memory cell is an index into the machine's memory array.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Address(pub AddressNumberType);

impl Address {
  /// Converts the address to an index into the memory array.
  pub fn idx(&self) -> AddressNumberType {
    self.0
  }

  /**
    Converts a decoded field into an address, failing if it does not name a cell. Fields are
    at most 20 bits wide, so only some of them can fall off the end of memory.
  */
  pub fn from_field(field: u64) -> UvmResult<Address> {
    match field < MEMORY_SIZE as u64 {
      true  => Ok(Address(field as AddressNumberType)),
      false => Err(UvmError::AddressOutOfBounds { address: field })
    }
  }
}

impl Display for Address{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "M[{}]", self.0)
  }
}

// Increment an address
impl Add<AddressNumberType> for Address{
  type Output = Address;
  fn add(self, rhs: AddressNumberType) -> Address{
    Address(self.0 + rhs)
  }
}


/// A half-open range `[start, end)` of memory cells, written `<start>:<end>` on the command line.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct MemoryRange {
  pub start: Address,
  pub end: Address
}

impl MemoryRange {
  /// Validates `start <= end <= MEMORY_SIZE`.
  pub fn new(start: AddressNumberType, end: AddressNumberType) -> UvmResult<MemoryRange> {
    if start > end || end > MEMORY_SIZE {
      return Err(UvmError::InvalidRange { start, end });
    }
    Ok(MemoryRange{ start: Address(start), end: Address(end) })
  }

  /// Parses the literal form `"<start>:<end>"`. Whitespace around either number is ignored.
  pub fn parse(text: &str) -> UvmResult<MemoryRange> {
    match all_consuming(range_p)(text) {
      Ok((_rest, (start, end))) => MemoryRange::new(start, end),
      Err(_e) => Err(UvmError::MalformedRange(text.to_string()))
    }
  }
}

impl Display for MemoryRange{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}", self.start.idx(), self.end.idx())
  }
}

fn number_p(text: &str) -> IResult<&str, AddressNumberType, (&str, ErrorKind)> {
  delimited(
    space0,
    map_res(digit1, |digits: &str| digits.parse::<AddressNumberType>()),
    space0
  )(text)
}

fn range_p(text: &str) -> IResult<&str, (AddressNumberType, AddressNumberType), (&str, ErrorKind)> {
  separated_pair(number_p, one_char(':'), number_p)(text)
}
