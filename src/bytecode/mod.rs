/*!

  A UVM program is a flat sequence of little-endian instructions with no header, no length
  prefix and no separators. Each instruction begins with its 8 bit opcode, and the opcode
  alone determines how many bytes follow:

    LoadConstant (198): 6 bytes
    ReadMemory    (67): 4 bytes
    WriteMemory  (244): 3 bytes
    Subtract     (103): 3 bytes

  The interpreter, by contrast, historically reads programs in fixed 6 byte strides. Only
  programs made entirely of `LoadConstant` instructions line up with that stride. See
  `uvm::Stride` for the width-aware alternative.

  An `Instruction` is the source form of an instruction, a set of named integer fields
  `A`, `B`, `C`, `D`, as written in assembly. The opcode is kept as a plain number there, since
  an unknown opcode is not a parse error but an instruction the assembler skips.

*/

mod binary;
mod instruction;
mod assembly;

pub use binary::{encode_instruction, decode_instruction, read_command,
                 DecodedInstruction, FieldPolicy, COMMAND_BYTES};
pub use instruction::{Instruction, Operation};
pub use assembly::{parse_assembly, ParsedAssemblySyntax};
