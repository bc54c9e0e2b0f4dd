/*!
  The assembler turns a listing into a program. It owns two buffers for the length of one
  run: the program bytes, and one log record per instruction it encoded. Lines that cannot be
  encoded contribute to neither.
*/

use std::io::Write;

use prettytable::Table;

use crate::bytecode::*;
use crate::error::{UvmError, UvmResult};
use crate::table::{make_csv_table, write_csv};

pub const LOG_HEADER: [&str; 5] = ["A", "B", "C", "D", "bytes"];

/// What to do with a line that does not parse.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LinePolicy {
  /// Report the line and go on to the next.
  Skip,
  /// Stop assembling and fail with `UvmError::MalformedInstructionLine`.
  Abort
}

impl Default for LinePolicy {
  fn default() -> Self {
    LinePolicy::Skip
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct AssemblyConfig {
  pub field_policy: FieldPolicy,
  pub line_policy : LinePolicy
}

/// A row of the assembly log.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogRecord {
  pub instruction: Instruction,
  /// The encoded bytes as `0xHH,0xHH,...`.
  pub bytes: String
}

/// The result of one assembly run.
#[derive(Debug, Default)]
pub struct Assembly {
  pub bytes: Vec<u8>,
  pub log: Vec<LogRecord>,
  /// Recoverable errors, in the order they were encountered.
  pub skipped: Vec<UvmError>
}

impl Assembly {
  pub fn log_table(&self) -> Table {
    let mut table = make_csv_table(&LOG_HEADER);
    for record in &self.log {
      let instruction = record.instruction;
      table.add_row(row![instruction.a, instruction.b, instruction.c, instruction.d, record.bytes]);
    }
    table
  }

  /// Writes the log as CSV with the header `A,B,C,D,bytes`.
  pub fn write_log<W: Write>(&self, writer: W) -> UvmResult<()> {
    write_csv(&self.log_table(), writer)
  }
}

pub struct Assembler {
  config: AssemblyConfig,
  output: Assembly
}

impl Assembler {
  pub fn new(config: AssemblyConfig) -> Assembler {
    Assembler{
      config,
      output: Assembly::default()
    }
  }

  /**
    Encodes one instruction and appends it to the program. Returns whether anything was
    appended. Unknown opcodes, and under `FieldPolicy::Reject` oversized fields, are reported
    and skipped.
  */
  pub fn assemble_instruction(&mut self, instruction: &Instruction) -> bool {
    match encode_instruction(instruction, self.config.field_policy) {

      Ok(encoded) => {
        self.output.bytes.extend(encoded.to_bytes());
        self.output.log.push(LogRecord{
          instruction: *instruction,
          bytes: encoded.hex_list()
        });
        true
      }

      Err(error) => {
        eprintln!("{}", error);
        self.output.skipped.push(error);
        false
      }

    }
  }

  /// Assembles every line of `text`, in order, and returns what was produced.
  pub fn assemble(mut self, text: &str) -> UvmResult<Assembly> {
    for syntax in parse_assembly(text) {
      match syntax {

        ParsedAssemblySyntax::Instruction{ instruction, .. } => {
          self.assemble_instruction(&instruction);
        }

        malformed => {
          // `to_error` is only `None` for instructions.
          if let Some(error) = malformed.to_error() {
            if self.config.line_policy == LinePolicy::Abort {
              return Err(error);
            }
            eprintln!("{}", error);
            self.output.skipped.push(error);
          }
        }

      }
    }
    Ok(self.output)
  }
}

/// Assembles `text` with the given configuration.
pub fn assemble(text: &str, config: AssemblyConfig) -> UvmResult<Assembly> {
  Assembler::new(config).assemble(text)
}


#[cfg(test)]
mod tests {
  use super::*;

  fn log_csv(assembly: &Assembly) -> String {
    let mut buffer: Vec<u8> = vec![];
    assembly.write_log(&mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
  }

  #[test]
  fn program_and_log(){
    let text = "A=198, B=5, C=1000\nA=244, B=1, C=7\n";
    let assembly = assemble(text, AssemblyConfig::default()).unwrap();

    assert_eq!(
      assembly.bytes,
      vec![0xC6, 0x05, 0x7D, 0x00, 0x00, 0x00, 0xF4, 0xE1, 0x00]
    );
    assert_eq!(assembly.log.len(), 2);
    assert_eq!(
      log_csv(&assembly),
      "A,B,C,D,bytes\n\
       198,5,1000,0,\"0xC6,0x05,0x7D,0x00,0x00,0x00\"\n\
       244,1,7,0,\"0xF4,0xE1,0x00\"\n"
    );
  }

  #[test]
  fn unknown_opcode_is_skipped(){
    let text = "A=198, B=1, C=2\nA=1, B=2, C=3\nA=198, B=2, C=3\n";
    let assembly = assemble(text, AssemblyConfig::default()).unwrap();

    assert_eq!(assembly.bytes.len(), 12);
    assert_eq!(assembly.log.len(), 2);
    assert_eq!(assembly.log[1].instruction, Instruction::new(198, 2, 3, 0));
    assert!(matches!(assembly.skipped[..], [UvmError::UnknownOpcode(1)]));
  }

  #[test]
  fn single_instruction(){
    let mut assembler = Assembler::new(AssemblyConfig::default());
    assert!(!assembler.assemble_instruction(&Instruction::new(7, 0, 0, 0)));
    assert!(assembler.assemble_instruction(&Instruction::new(103, 2, 3, 5)));
    let assembly = assembler.assemble("").unwrap();
    assert_eq!(assembly.bytes, vec![0x67, 0x62, 0x14]);
    assert_eq!(assembly.log[0].bytes, "0x67,0x62,0x14");
  }

  #[test]
  fn log_keeps_source_d(){
    let assembly = assemble("A=244, B=1, C=7, D=3", AssemblyConfig::default()).unwrap();
    assert_eq!(assembly.bytes, vec![0xF4, 0xE1, 0x00]);
    assert_eq!(log_csv(&assembly), "A,B,C,D,bytes\n244,1,7,3,\"0xF4,0xE1,0x00\"\n");
  }

  #[test]
  fn empty_listing(){
    let assembly = assemble("\n\n", AssemblyConfig::default()).unwrap();
    assert!(assembly.bytes.is_empty());
    assert_eq!(log_csv(&assembly), "A,B,C,D,bytes\n");
  }

  #[test]
  fn malformed_line_skipped(){
    let text = "A=198, B=1, C=2\nA198 B=1\nA=198, B=3, C=4";
    let assembly = assemble(text, AssemblyConfig::default()).unwrap();
    assert_eq!(assembly.log.len(), 2);
    assert!(matches!(
      assembly.skipped[..],
      [UvmError::MalformedInstructionLine{ line: 2, .. }]
    ));
  }

  #[test]
  fn malformed_line_aborts(){
    let config = AssemblyConfig{ line_policy: LinePolicy::Abort, ..AssemblyConfig::default() };
    let result = assemble("A=198, B=1, C=2\nA198 B=1\n", config);
    assert!(matches!(result, Err(UvmError::MalformedInstructionLine{ line: 2, .. })));
  }

  #[test]
  fn strict_fields(){
    let config = AssemblyConfig{ field_policy: FieldPolicy::Reject, ..AssemblyConfig::default() };
    let assembly = assemble("A=198, B=40, C=2\nA=198, B=4, C=2", config).unwrap();
    assert_eq!(assembly.log.len(), 1);
    assert!(matches!(
      assembly.skipped[..],
      [UvmError::FieldOverflow{ field: 'B', value: 40, width: 5 }]
    ));
  }
}
