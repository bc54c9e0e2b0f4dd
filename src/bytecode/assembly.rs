/*!
  The human readable textual form of bytecode is called assembly. A line of assembly names
  the fields of one instruction:

      A=198, B=5, C=1000
      A=103, B=2, C=3, D=5

  Whitespace around `=` and `,` is ignored, fields may come in any order, `D` may be omitted,
  and blank lines are skipped.
*/

use std::fmt::{Display, Formatter};

use nom::{
  character::complete::{
    alpha1,
    char as one_char,
    digit1,
    space0
  },
  combinator::{all_consuming, map_res},
  error::ErrorKind,
  multi::separated_nonempty_list,
  sequence::{delimited, separated_pair},
  IResult
};

use crate::bytecode::Instruction;
use crate::error::UvmError;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParsedAssemblySyntax<'a> {
  Instruction{
    line: usize,
    instruction: Instruction
  },
  Malformed{
    line: usize,
    text: &'a str
  }
}
// Abbreviated name internally
use ParsedAssemblySyntax as Syntax;

impl<'a> ParsedAssemblySyntax<'a> {
  /// Converts a malformed line into the corresponding error.
  pub fn to_error(&self) -> Option<UvmError> {
    match self {
      Syntax::Malformed{ line, text } => {
        Some(UvmError::MalformedInstructionLine{ line: *line, text: text.to_string() })
      }
      Syntax::Instruction{ .. } => None
    }
  }
}

impl<'a> Display for ParsedAssemblySyntax<'a>{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self{
      Syntax::Instruction{ line, instruction } => {
        write!(f, "{}: {}", line, instruction)
      }
      Syntax::Malformed{ line, text } => {
        write!(f, "Error on line {}: cannot parse instruction `{}`", line, text)
      }
    }
  }
}

// `key = value`
fn field_p(text: &str) -> IResult<&str, (&str, u64), (&str, ErrorKind)> {
  separated_pair(
    delimited(space0, alpha1, space0),
    one_char('='),
    delimited(
      space0,
      map_res(digit1, |digits: &str| digits.parse::<u64>()),
      space0
    )
  )(text)
}

fn fields_p(text: &str) -> IResult<&str, Vec<(&str, u64)>, (&str, ErrorKind)> {
  all_consuming(separated_nonempty_list(one_char(','), field_p))(text)
}

/**
  Parses a single line of assembly. `A`, `B` and `C` are required. Other keys are accepted and
  ignored, and a repeated key takes the last value given.
*/
pub fn parse_instruction(text: &str) -> Option<Instruction> {
  let (_rest, fields) = fields_p(text).ok()?;

  let (mut a, mut b, mut c, mut d) = (None, None, None, 0);
  for (key, value) in fields {
    match key {
      "A" => a = Some(value),
      "B" => b = Some(value),
      "C" => c = Some(value),
      "D" => d = value,
      _   => {}
    }
  }

  Some(Instruction::new(a?, b?, c?, d))
}

/// Parses a listing, one instruction per non-blank line. Line numbers start at 1.
pub fn parse_assembly(text: &str) -> Vec<Syntax<'_>> {
  text
    .lines()
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .map(|(i, line)| {
      let line_number = i + 1;
      let line = line.trim();
      match parse_instruction(line) {
        Some(instruction) => Syntax::Instruction{ line: line_number, instruction },
        None              => Syntax::Malformed{ line: line_number, text: line }
      }
    })
    .collect()
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn three_fields(){
    assert_eq!(
      parse_instruction("A=198, B=5, C=1000"),
      Some(Instruction::new(198, 5, 1000, 0))
    );
  }

  #[test]
  fn four_fields_with_whitespace(){
    assert_eq!(
      parse_instruction("  A = 103 ,B=2,   C =3 , D= 5\t"),
      Some(Instruction::new(103, 2, 3, 5))
    );
  }

  #[test]
  fn any_order(){
    assert_eq!(
      parse_instruction("D=1, C=2, B=3, A=67"),
      Some(Instruction::new(67, 3, 2, 1))
    );
  }

  #[test]
  fn malformed_lines(){
    for text in &[
      "A=198, B=5",          // missing C
      "A=198 B=5 C=1",       // missing commas
      "A198, B=5, C=1",      // missing '='
      "A=198, B=5, C=-1",    // negative
      "A=198, B=5, C=1,",    // trailing comma
      "A=1.5, B=0, C=0",
      "A=99999999999999999999, B=0, C=0",
    ] {
      assert_eq!(parse_instruction(text), None, "{} should not parse", text);
    }
  }

  #[test]
  fn listing(){
    let text = "A=198, B=1, C=10\n\n   \nA=198 B=2\r\nA=244, B=3, C=1\n";
    let parsed = parse_assembly(text);
    assert_eq!(
      parsed,
      vec![
        Syntax::Instruction{ line: 1, instruction: Instruction::new(198, 1, 10, 0) },
        Syntax::Malformed{ line: 4, text: "A=198 B=2" },
        Syntax::Instruction{ line: 5, instruction: Instruction::new(244, 3, 1, 0) },
      ]
    );
    assert!(parsed[0].to_error().is_none());
    assert_eq!(
      format!("{}", parsed[1].to_error().unwrap()),
      "Error on line 4: cannot parse instruction `A=198 B=2`"
    );
  }
}
