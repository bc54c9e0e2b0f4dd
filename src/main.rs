//! `uvm` assembles UVM listings into binary programs and interprets those programs.
//!
//! ```text
//! uvm assemble  <input_file> <output_file> --log_file <log.csv>
//! uvm interpret <input_file> <output_file> --memory_range <start>:<end>
//! ```

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

mod address;
mod assembler;
mod bytecode;
mod error;
mod table;
mod uvm;

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};

use crate::address::MemoryRange;
use crate::assembler::{AssemblyConfig, LinePolicy};
use crate::bytecode::FieldPolicy;
use crate::table::make_memory_table;
use crate::uvm::Stride;

#[derive(ValueEnum, Copy, Clone, Eq, PartialEq, Debug)]
enum Mode {
  Assemble,
  Interpret
}

/// Assembler and Interpreter for UVM
#[derive(Parser, Debug)]
#[command(name = "uvm")]
struct Args {
  /// Operation mode
  #[arg(value_enum)]
  mode: Mode,

  /// Input file
  input_file: PathBuf,

  /// Output file or result file
  output_file: PathBuf,

  /// Log file (CSV format) for assembler
  #[arg(long = "log_file", required_if_eq("mode", "assemble"))]
  log_file: Option<PathBuf>,

  /// Memory range for interpreter (start:end)
  #[arg(long = "memory_range", required_if_eq("mode", "interpret"))]
  memory_range: Option<String>,

  /// Skip instructions whose fields do not fit their bit widths instead of encoding them
  #[arg(long = "strict_fields")]
  strict_fields: bool,

  /// Stop at the first line that cannot be parsed
  #[arg(long = "fail_fast")]
  fail_fast: bool,

  /// How far the interpreter advances after each instruction
  #[arg(long, value_enum, default_value_t = Stride::Fixed)]
  stride: Stride,

  /// Print the resulting memory slice as a table
  #[arg(long)]
  dump: bool,
}

impl Args {
  fn assembly_config(&self) -> AssemblyConfig {
    AssemblyConfig{
      field_policy: match self.strict_fields {
        true  => FieldPolicy::Reject,
        false => FieldPolicy::Truncate
      },
      line_policy: match self.fail_fast {
        true  => LinePolicy::Abort,
        false => LinePolicy::Skip
      }
    }
  }
}

/// Reads an input file, reporting a missing file the way users of the tool expect.
fn read_input<T, F>(path: &Path, read: F) -> Result<T>
  where F: FnOnce(&Path) -> std::io::Result<T>
{
  read(path).map_err(|error| match error.kind() {
    ErrorKind::NotFound => anyhow!("Error! File {} not found", path.display()),
    _ => anyhow::Error::new(error).context(format!("Error! Cannot read {}", path.display()))
  })
}

fn create_output(path: &Path) -> Result<File> {
  File::create(path).with_context(|| format!("Error! Cannot write {}", path.display()))
}

fn assemble(args: &Args) -> Result<()> {
  let log_file = args
    .log_file
    .as_ref()
    .context("Error! Log file is required for assembly.")?;

  let text     = read_input(&args.input_file, |path| fs::read_to_string(path))?;
  let assembly = assembler::assemble(&text, args.assembly_config())?;
  if !assembly.skipped.is_empty() {
    println!(
      "Assembled {} instructions, skipped {}",
      assembly.log.len(), assembly.skipped.len()
    );
  }

  fs::write(&args.output_file, &assembly.bytes)
    .with_context(|| format!("Error! Cannot write {}", args.output_file.display()))?;
  println!("Binary written to {}", args.output_file.display());

  assembly.write_log(create_output(log_file)?)?;
  println!("Log written to {}", log_file.display());

  Ok(())
}

fn interpret(args: &Args) -> Result<()> {
  let memory_range = args
    .memory_range
    .as_ref()
    .context("Error! Memory range is required for interpretation.")?;
  let range = MemoryRange::parse(memory_range)?;

  let program = read_input(&args.input_file, |path| fs::read(path))?;
  let machine = uvm::interpret(&program, args.stride)?;
  let cells   = machine.slice(range);

  if args.dump {
    println!("Executed {} instructions, halted at byte {}", machine.steps(), machine.ip());
    let start = range.start.idx();
    let rows  = cells.iter().enumerate().map(|(i, &value)| (start + i, value));
    println!("{}", make_memory_table('M', rows, None));
  }

  uvm::write_result(cells, create_output(&args.output_file)?)?;
  println!("Result written to {}", args.output_file.display());

  Ok(())
}

fn main() -> Result<()> {
  let args = Args::parse();

  match args.mode {
    Mode::Assemble  => assemble(&args),
    Mode::Interpret => interpret(&args)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::env::temp_dir;
  use std::process;

  // Unique per test so tests can run in parallel.
  fn scratch_path(name: &str) -> PathBuf {
    temp_dir().join(format!("uvm-{}-{}", process::id(), name))
  }

  fn args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv).unwrap()
  }

  #[test]
  fn assemble_then_interpret(){
    let source = scratch_path("round_trip.asm");
    let binary = scratch_path("round_trip.bin");
    let log    = scratch_path("round_trip.csv");
    let result = scratch_path("round_trip.result.csv");
    fs::write(&source, "A=198, B=0, C=12\n\nA=198, B=2, C=700\nA=5, B=1, C=1\nA=198, B=0, C=13\n").unwrap();

    assemble(&args(&[
      "uvm", "assemble",
      source.to_str().unwrap(), binary.to_str().unwrap(),
      "--log_file", log.to_str().unwrap()
    ])).unwrap();
    assert_eq!(fs::read(&binary).unwrap().len(), 18);
    let log_text = fs::read_to_string(&log).unwrap();
    assert_eq!(log_text.lines().count(), 4);
    assert!(log_text.starts_with("A,B,C,D,bytes\n198,0,12,0,\"0xC6,0x80,0x01,0x00,0x00,0x00\"\n"));

    interpret(&args(&[
      "uvm", "interpret",
      binary.to_str().unwrap(), result.to_str().unwrap(),
      "--memory_range", "0:4"
    ])).unwrap();
    assert_eq!(
      fs::read_to_string(&result).unwrap(),
      "Address,Value\n0,13\n1,0\n2,700\n3,0\n"
    );

    for path in &[source, binary, log, result] {
      let _ = fs::remove_file(path);
    }
  }

  #[test]
  fn missing_input_file(){
    let missing = scratch_path("does_not_exist.asm");
    let output  = scratch_path("does_not_exist.bin");
    let error = assemble(&args(&[
      "uvm", "assemble",
      missing.to_str().unwrap(), output.to_str().unwrap(),
      "--log_file", "unused.csv"
    ])).unwrap_err();
    assert_eq!(error.to_string(), format!("Error! File {} not found", missing.display()));
  }

  #[test]
  fn required_flags(){
    assert!(Args::try_parse_from(&["uvm", "assemble", "in", "out"]).is_err());
    assert!(Args::try_parse_from(&["uvm", "interpret", "in", "out"]).is_err());
    assert!(Args::try_parse_from(&["uvm", "interpret", "in", "out", "--memory_range", "0:4"]).is_ok());
    assert!(Args::try_parse_from(&["uvm", "compile", "in", "out"]).is_err());
  }

  #[test]
  fn options(){
    let parsed = args(&[
      "uvm", "interpret", "in", "out", "--memory_range", "0:4", "--stride", "encoded", "--dump"
    ]);
    assert_eq!(parsed.stride, Stride::Encoded);
    assert!(parsed.dump);

    let parsed = args(&[
      "uvm", "assemble", "in", "out", "--log_file", "log.csv", "--strict_fields", "--fail_fast"
    ]);
    assert_eq!(
      parsed.assembly_config(),
      AssemblyConfig{ field_policy: FieldPolicy::Reject, line_policy: LinePolicy::Abort }
    );
  }

  #[test]
  fn bad_range(){
    let error = interpret(&args(&[
      "uvm", "interpret", "in", "out", "--memory_range", "0:300"
    ])).unwrap_err();
    assert_eq!(error.to_string(), "Memory range 0:300 is outside of 0:256");
  }
}
