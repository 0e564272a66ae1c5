//! C4 (half): the compiled representation bytecode executes against
//! (spec §3.7, §4.4, §6.1).

pub mod chunk;
pub mod encode;
pub mod instr;

pub use chunk::{Chunk, Constant, Module};
pub use encode::{decode_code, encode_code, read_module, write_module, DecodeError};
pub use instr::Instr;
