//! On-disk bytecode layout (spec §6.1).
//!
//! File layout: a 4-byte magic, a version byte, a flags byte, a
//! little-endian `u32` body length, then the body. The body is the
//! bincode encoding of a [`WireModule`], except each chunk's instruction
//! stream is first flattened into the exact byte form spec §6.1 pins
//! down: one opcode byte followed by one little-endian `u16` operand
//! (jump deltas are the `u16`'s bit pattern reinterpreted as `i16`),
//! stored as a plain byte vector so the format is stable even if the
//! in-memory `Instr` enum's discriminants ever change.
//!
//! Grounded on the teacher's `bytecode.rs` framing style (hand-written
//! magic/version/flags header around a serialized payload).

use serde::{Deserialize, Serialize};

use super::chunk::{Chunk, Constant, Module};
use super::instr::Instr;

const MAGIC: [u8; 4] = *b"SLTB";
const VERSION: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    BadMagic,
    UnsupportedVersion(u8),
    Truncated,
    UnknownOpcode(u8),
    Deserialize,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::BadMagic => write!(f, "not a Slate bytecode file"),
            DecodeError::UnsupportedVersion(v) => write!(f, "unsupported bytecode version {v}"),
            DecodeError::Truncated => write!(f, "truncated bytecode stream"),
            DecodeError::UnknownOpcode(op) => write!(f, "unknown opcode 0x{op:02x}"),
            DecodeError::Deserialize => write!(f, "malformed constant pool or chunk metadata"),
        }
    }
}

impl std::error::Error for DecodeError {}

fn opcode_of(instr: &Instr) -> (u8, u16) {
    match *instr {
        Instr::LoadConst(n) => (0x01, n),
        Instr::LoadNull => (0x02, 0),
        Instr::LoadUndefined => (0x03, 0),
        Instr::LoadTrue => (0x04, 0),
        Instr::LoadFalse => (0x05, 0),
        Instr::LoadLocal(n) => (0x06, n),
        Instr::StoreLocal(n) => (0x07, n),
        Instr::LoadGlobal(n) => (0x08, n),
        Instr::StoreGlobal(n) => (0x09, n),
        Instr::DefineGlobal(n) => (0x0e, n),
        Instr::LoadUpvalue(n) => (0x0a, n),
        Instr::StoreUpvalue(n) => (0x0d, n),
        Instr::Pop => (0x0b, 0),
        Instr::Dup => (0x0c, 0),
        Instr::Add => (0x10, 0),
        Instr::Sub => (0x11, 0),
        Instr::Mul => (0x12, 0),
        Instr::Div => (0x13, 0),
        Instr::FloorDiv => (0x14, 0),
        Instr::Mod => (0x15, 0),
        Instr::Pow => (0x16, 0),
        Instr::Neg => (0x17, 0),
        Instr::Not => (0x18, 0),
        Instr::Eq => (0x20, 0),
        Instr::NotEq => (0x21, 0),
        Instr::Lt => (0x22, 0),
        Instr::LtEq => (0x23, 0),
        Instr::Gt => (0x24, 0),
        Instr::GtEq => (0x25, 0),
        Instr::Jump(delta) => (0x30, delta as u16),
        Instr::JumpIfFalse(delta) => (0x31, delta as u16),
        Instr::JumpIfTrue(delta) => (0x32, delta as u16),
        Instr::Call(n) => (0x40, n),
        Instr::Return => (0x41, 0),
        Instr::MakeArray(n) => (0x50, n),
        Instr::MakeObject(n) => (0x51, n),
        Instr::GetIndex => (0x52, 0),
        Instr::SetIndex => (0x53, 0),
        Instr::GetProperty(n) => (0x54, n),
        Instr::SetProperty(n) => (0x55, n),
        Instr::GetMethod(n) => (0x56, n),
        Instr::MakeRange => (0x60, 0),
        Instr::GetIter => (0x61, 0),
        Instr::IterHasNext => (0x62, 0),
        Instr::IterNext => (0x63, 0),
        Instr::MakeClosure(n) => (0x70, n),
        Instr::MakeClass(n) => (0x72, n),
        Instr::NewInstance(n) => (0x71, n),
    }
}

fn instr_of(opcode: u8, operand: u16) -> Result<Instr, DecodeError> {
    Ok(match opcode {
        0x01 => Instr::LoadConst(operand),
        0x02 => Instr::LoadNull,
        0x03 => Instr::LoadUndefined,
        0x04 => Instr::LoadTrue,
        0x05 => Instr::LoadFalse,
        0x06 => Instr::LoadLocal(operand),
        0x07 => Instr::StoreLocal(operand),
        0x08 => Instr::LoadGlobal(operand),
        0x09 => Instr::StoreGlobal(operand),
        0x0e => Instr::DefineGlobal(operand),
        0x0a => Instr::LoadUpvalue(operand),
        0x0d => Instr::StoreUpvalue(operand),
        0x0b => Instr::Pop,
        0x0c => Instr::Dup,
        0x10 => Instr::Add,
        0x11 => Instr::Sub,
        0x12 => Instr::Mul,
        0x13 => Instr::Div,
        0x14 => Instr::FloorDiv,
        0x15 => Instr::Mod,
        0x16 => Instr::Pow,
        0x17 => Instr::Neg,
        0x18 => Instr::Not,
        0x20 => Instr::Eq,
        0x21 => Instr::NotEq,
        0x22 => Instr::Lt,
        0x23 => Instr::LtEq,
        0x24 => Instr::Gt,
        0x25 => Instr::GtEq,
        0x30 => Instr::Jump(operand as i16),
        0x31 => Instr::JumpIfFalse(operand as i16),
        0x32 => Instr::JumpIfTrue(operand as i16),
        0x40 => Instr::Call(operand),
        0x41 => Instr::Return,
        0x50 => Instr::MakeArray(operand),
        0x51 => Instr::MakeObject(operand),
        0x52 => Instr::GetIndex,
        0x53 => Instr::SetIndex,
        0x54 => Instr::GetProperty(operand),
        0x55 => Instr::SetProperty(operand),
        0x56 => Instr::GetMethod(operand),
        0x60 => Instr::MakeRange,
        0x61 => Instr::GetIter,
        0x62 => Instr::IterHasNext,
        0x63 => Instr::IterNext,
        0x70 => Instr::MakeClosure(operand),
        0x72 => Instr::MakeClass(operand),
        0x71 => Instr::NewInstance(operand),
        other => return Err(DecodeError::UnknownOpcode(other)),
    })
}

pub fn encode_code(code: &[Instr]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(code.len() * 3);
    for instr in code {
        let (opcode, operand) = opcode_of(instr);
        bytes.push(opcode);
        bytes.extend_from_slice(&operand.to_le_bytes());
    }
    bytes
}

pub fn decode_code(bytes: &[u8]) -> Result<Vec<Instr>, DecodeError> {
    if bytes.len() % 3 != 0 {
        return Err(DecodeError::Truncated);
    }
    bytes
        .chunks_exact(3)
        .map(|triple| {
            let operand = u16::from_le_bytes([triple[1], triple[2]]);
            instr_of(triple[0], operand)
        })
        .collect()
}

/// On-disk mirror of [`Chunk`] with the instruction stream flattened to
/// raw bytes per spec §6.1.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireChunk {
    name: Option<String>,
    arity: usize,
    num_locals: usize,
    code: Vec<u8>,
    constants: Vec<Constant>,
    num_upvalues: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireModule {
    chunks: Vec<WireChunk>,
    globals: Vec<String>,
}

pub fn write_module(module: &Module) -> Vec<u8> {
    let wire = WireModule {
        chunks: module
            .chunks
            .iter()
            .map(|c| WireChunk {
                name: c.name.clone(),
                arity: c.arity,
                num_locals: c.num_locals,
                code: encode_code(&c.code),
                constants: c.constants.clone(),
                num_upvalues: c.num_upvalues,
            })
            .collect(),
        globals: module.globals.clone(),
    };
    let body = match bincode::serialize(&wire) {
        Ok(body) => body,
        Err(_) => unreachable!("in-memory module is always serializable"),
    };

    let mut out = Vec::with_capacity(4 + 1 + 1 + 4 + body.len());
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.push(0); // flags, reserved
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

pub fn read_module(bytes: &[u8]) -> Result<Module, DecodeError> {
    if bytes.len() < 10 {
        return Err(DecodeError::Truncated);
    }
    if bytes[0..4] != MAGIC {
        return Err(DecodeError::BadMagic);
    }
    let version = bytes[4];
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let body_len = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    let body = bytes.get(10..10 + body_len).ok_or(DecodeError::Truncated)?;
    let wire: WireModule = bincode::deserialize(body).map_err(|_| DecodeError::Deserialize)?;

    let mut chunks = Vec::with_capacity(wire.chunks.len());
    for wc in wire.chunks {
        let code = decode_code(&wc.code)?;
        let lines = vec![0u32; code.len()];
        chunks.push(Chunk {
            name: wc.name,
            arity: wc.arity,
            num_locals: wc.num_locals,
            code,
            constants: wc.constants,
            lines,
            num_upvalues: wc.num_upvalues,
        });
    }
    Ok(Module {
        chunks,
        globals: wire.globals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instr_round_trips_through_the_byte_encoding() {
        let code = vec![
            Instr::LoadConst(42),
            Instr::Jump(-7),
            Instr::Add,
            Instr::Return,
        ];
        let bytes = encode_code(&code);
        assert_eq!(bytes.len(), code.len() * 3);
        assert_eq!(decode_code(&bytes).unwrap(), code);
    }

    #[test]
    fn module_round_trips_through_the_file_format() {
        let mut chunk = Chunk::new(Some("main".to_string()), 0);
        chunk.add_constant(Constant::Int32(7));
        chunk.push_instr(Instr::LoadConst(0));
        chunk.push_instr(Instr::Return);
        let mut module = Module::new();
        module.push_chunk(chunk);

        let bytes = write_module(&module);
        assert_eq!(&bytes[0..4], b"SLTB");
        let decoded = read_module(&bytes).unwrap();
        assert_eq!(decoded.chunks[0].code, module.chunks[0].code);
        assert_eq!(decoded.chunks[0].constants, module.chunks[0].constants);
    }

    #[test]
    fn rejects_bad_magic() {
        assert_eq!(read_module(b"not-slate-bytecode").unwrap_err(), DecodeError::BadMagic);
    }
}
