//! Tables shared by the assembler and the machine: the terminal display format, and CSV output
//! for the assembly log and the interpreter's result file.

use std::io::Write;

use prettytable::{format as TableFormat, Cell, Row, Table};

use crate::error::{UvmError, UvmResult};
use crate::uvm::Value;

lazy_static! {
  pub static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

/**
  Builds a display table of memory cells. `cells` yields `(address, value)` pairs, and the
  cell at `highlight`, if any, is marked with an arrow.
*/
pub fn make_memory_table<I>(name: char, cells: I, highlight: Option<usize>) -> Table
  where I: IntoIterator<Item = (usize, Value)>
{
  let mut table = Table::new();

  table.set_format(*TABLE_DISPLAY_FORMAT);
  table.set_titles(row![ubr->"Address", ubl->"Contents"]);

  for (address, value) in cells {
    match Some(address) == highlight {

      true  => {
        table.add_row(row![r->format!("* --> {}[{}] =", name, address), value]);
      }

      false => {
        table.add_row(row![r->format!("{}[{}] =", name, address), value]);
      }

    } // end match on highlight
  } // end for
  table
}

/// Starts a table for CSV output. The header is an ordinary first row so that it is written
/// verbatim.
pub fn make_csv_table(header: &[&str]) -> Table {
  let mut table = Table::new();
  table.add_row(Row::new(header.iter().map(|title| Cell::new(title)).collect()));
  table
}

/// Writes `table` as CSV. Fields containing commas are quoted.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> UvmResult<()> {
  table
    .to_csv(writer)
    .map(|_writer| ())
    .map_err(|e| UvmError::Csv(e.to_string()))
}


#[cfg(test)]
mod tests {
  use super::*;

  fn to_csv_string(table: &Table) -> String {
    let mut buffer: Vec<u8> = vec![];
    write_csv(table, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
  }

  #[test]
  fn csv_header_and_rows(){
    let mut table = make_csv_table(&["Address", "Value"]);
    table.add_row(row![0, 42]);
    table.add_row(row![1, -7]);
    assert_eq!(to_csv_string(&table), "Address,Value\n0,42\n1,-7\n");
  }

  #[test]
  fn csv_quotes_commas(){
    let mut table = make_csv_table(&["A", "bytes"]);
    table.add_row(row![244, "0xF4,0xE1,0x00"]);
    assert_eq!(to_csv_string(&table), "A,bytes\n244,\"0xF4,0xE1,0x00\"\n");
  }

  #[test]
  fn memory_table_rows(){
    let table = make_memory_table('M', vec![(3, 10), (4, -1)], Some(4));
    assert_eq!(table.len(), 2);
    let rendered = table.to_string();
    assert!(rendered.contains("M[3] ="));
    assert!(rendered.contains("* --> M[4] ="));
    assert!(rendered.contains("-1"));
  }
}
