//! The UVM itself: a fixed block of 256 signed memory cells and a loop that walks a program,
//! decoding and executing one instruction at a time.

use std::fmt::{Display, Formatter};
use std::io::Write;

use clap::ValueEnum;
use prettytable::Table;

use crate::address::{Address, MemoryRange};
use crate::bytecode::*;
use crate::error::UvmResult;
use crate::table::{make_csv_table, make_memory_table, write_csv};

pub const MEMORY_SIZE: usize = 256;

/// The contents of a memory cell.
pub type Value = i64;

/// How far the instruction pointer advances after each instruction.
#[derive(ValueEnum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum Stride {
  /// Always `COMMAND_BYTES`. Programs containing anything but `LoadConstant` drift out of
  /// step with the instruction boundaries the assembler wrote.
  Fixed,
  /// The encoded width of the opcode under the instruction pointer. Unknown opcodes advance
  /// by `COMMAND_BYTES`.
  Encoded
}

impl Default for Stride {
  fn default() -> Self {
    Stride::Fixed
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum State {
  Running,
  Halted
}

pub struct Machine {
  memory: [Value; MEMORY_SIZE],
  stride: Stride,

  // Registers //
  ip   : usize, // Instruction Pointer, a byte offset into the program
  steps: usize, // Instructions decoded so far, unknown opcodes included
}

impl Default for Machine {
  fn default() -> Self {
    Machine::new(Stride::default())
  }
}

impl Machine {

  // region Low-level utility methods

  pub fn new(stride: Stride) -> Machine {
    Machine {
      memory: [0; MEMORY_SIZE],
      stride,
      ip    : 0,
      steps : 0
    }
  }

  pub fn memory(&self) -> &[Value] {
    &self.memory
  }

  pub fn ip(&self) -> usize {
    self.ip
  }

  pub fn steps(&self) -> usize {
    self.steps
  }

  pub fn value_at(&self, address: Address) -> Value {
    self.memory[address.idx()]
  }

  pub fn set_value_at(&mut self, address: Address, value: Value) {
    self.memory[address.idx()] = value;
  }

  /// The cells in `range`. The range was checked against `MEMORY_SIZE` when it was made.
  pub fn slice(&self, range: MemoryRange) -> &[Value] {
    &self.memory[range.start.idx()..range.end.idx()]
  }

  // endregion

  // region Interpretation

  /**
    Applies one decoded instruction to memory. Unknown opcodes are no-ops. Reading a cell
    past the end of memory, which only a `WriteMemory` or `Subtract` with a wide `C` field can
    do, fails with `AddressOutOfBounds`.
  */
  pub fn execute(&mut self, instruction: &DecodedInstruction) -> UvmResult<()> {
    let operation = match instruction.operation() {
      Some(operation) => operation,
      None            => return Ok(())
    };

    match operation {

      Operation::LoadConstant => {
        let target = Address::from_field(instruction.arg1)?;
        self.set_value_at(target, instruction.arg2 as Value);
      }

      Operation::ReadMemory => {
        let target = Address::from_field(instruction.arg1)?;
        let source = Address::from_field(instruction.address())?;
        let value  = self.value_at(source).wrapping_add(instruction.arg2 as Value);
        self.set_value_at(target, value);
      }

      Operation::WriteMemory => {
        let target = Address::from_field(instruction.arg1)?;
        let source = Address::from_field(instruction.arg2)?;
        self.set_value_at(target, self.value_at(source));
      }

      Operation::Subtract => {
        let minuend    = Address::from_field(instruction.arg1)?;
        let subtrahend = Address::from_field(instruction.arg2)?;
        let target     = Address::from_field(instruction.result_address())?;
        let value      = self.value_at(minuend).wrapping_sub(self.value_at(subtrahend));
        self.set_value_at(target, value);
      }

    }
    Ok(())
  }

  /// The number of bytes the instruction at the instruction pointer spans.
  fn stride_at(&self, program: &[u8]) -> usize {
    match self.stride {
      Stride::Fixed   => COMMAND_BYTES,
      Stride::Encoded => {
        program
          .get(self.ip)
          .and_then(|&opcode| Operation::from_code(opcode as u64))
          .map_or(COMMAND_BYTES, |operation| operation.width())
      }
    }
  }

  /**
    Decodes and executes the instruction at the instruction pointer. Running off the end of
    the program, including a trailing partial instruction, halts the machine. That is the
    normal way for a program to end.
  */
  pub fn step(&mut self, program: &[u8]) -> UvmResult<State> {
    let width = self.stride_at(program);
    if self.ip + width > program.len() {
      return Ok(State::Halted);
    }

    let instruction = decode_instruction(read_command(&program[self.ip..self.ip + width]));
    self.execute(&instruction)?;
    self.ip    += width;
    self.steps += 1;

    #[cfg(feature = "trace_computation")]
    eprintln!("{}\n{}", instruction, self);

    Ok(State::Running)
  }

  /// Runs the program from the start until it halts.
  pub fn run(&mut self, program: &[u8]) -> UvmResult<()> {
    self.ip = 0;
    while self.step(program)? == State::Running {}
    Ok(())
  }

  // endregion

}

/// Runs `program` on a fresh machine until it halts.
pub fn interpret(program: &[u8], stride: Stride) -> UvmResult<Machine> {
  let mut machine = Machine::new(stride);
  machine.run(program)?;
  Ok(machine)
}

/// The result file: one row per cell, numbered from zero at the start of the slice.
pub fn result_table(cells: &[Value]) -> Table {
  let mut table = make_csv_table(&["Address", "Value"]);
  for (address, value) in cells.iter().enumerate() {
    table.add_row(row![address, value]);
  }
  table
}

/// Writes the result file as CSV with the header `Address,Value`.
pub fn write_result<W: Write>(cells: &[Value], writer: W) -> UvmResult<()> {
  write_csv(&result_table(cells), writer)
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    // Only cells that have been written to are interesting.
    let cells = self.memory()
                    .iter()
                    .enumerate()
                    .filter(|&(_, &value)| value != 0)
                    .map(|(address, &value)| (address, value));
    let table = make_memory_table('M', cells, None);

    write!(f, "IP: {}\tSteps: {}\n{}", self.ip, self.steps, table)
  }
}
