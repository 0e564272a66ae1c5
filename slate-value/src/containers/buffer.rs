//! Shared byte buffer capabilities: an immutable buffer, a growable
//! builder, and a positional reader (spec §3.1 lists `buffer`,
//! `buffer_builder`, and `buffer_reader` as three distinct handles,
//! mirroring the `string`/`string_builder` split in `containers::string`).
//!
//! Grounded on the teacher's binary-serialization helpers (`bytecode.rs`
//! uses the same little-endian-by-default, explicit-width read/write
//! style this module exposes at the value layer).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    OutOfBounds { offset: usize, needed: usize, len: usize },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::OutOfBounds { offset, needed, len } => write!(
                f,
                "buffer read/write at offset {offset} needs {needed} bytes but len is {len}"
            ),
        }
    }
}

impl std::error::Error for BufferError {}

macro_rules! numeric_decode {
    ($read:ident, $ty:ty) => {
        pub fn $read(&self, offset: usize, endian: Endian) -> Result<$ty, BufferError> {
            let width = std::mem::size_of::<$ty>();
            let bytes = self.0.get(offset..offset + width).ok_or(BufferError::OutOfBounds {
                offset,
                needed: width,
                len: self.0.len(),
            })?;
            let arr: [u8; std::mem::size_of::<$ty>()] = match bytes.try_into() {
                Ok(arr) => arr,
                Err(_) => unreachable!("the slice above is exactly `width` bytes"),
            };
            Ok(match endian {
                Endian::Little => <$ty>::from_le_bytes(arr),
                Endian::Big => <$ty>::from_be_bytes(arr),
            })
        }
    };
}

macro_rules! numeric_encode {
    ($write:ident, $ty:ty) => {
        pub fn $write(&self, offset: usize, value: $ty, endian: Endian) -> Result<(), BufferError> {
            let width = std::mem::size_of::<$ty>();
            let bytes = match endian {
                Endian::Little => value.to_le_bytes(),
                Endian::Big => value.to_be_bytes(),
            };
            let mut inner = self.0.borrow_mut();
            if offset + width > inner.len() {
                return Err(BufferError::OutOfBounds {
                    offset,
                    needed: width,
                    len: inner.len(),
                });
            }
            inner[offset..offset + width].copy_from_slice(&bytes);
            Ok(())
        }
    };
}

/// An immutable, shared byte buffer (spec §3.1's `buffer` variant).
/// Produced by [`BufferBuilder::finalize`] or built directly from bytes;
/// supports positional decode, slicing, concat, and hex formatting but no
/// mutation or growth.
#[derive(Clone)]
pub struct SlateBuffer(Rc<[u8]>);

impl SlateBuffer {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Rc::from(bytes))
    }

    pub fn with_len(len: usize) -> Self {
        Self(Rc::from(vec![0u8; len]))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_byte(&self, offset: usize) -> Option<u8> {
        self.0.get(offset).copied()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn slice(&self, start: usize, len: usize) -> SlateBuffer {
        let end = (start + len).min(self.0.len());
        let start = start.min(end);
        SlateBuffer::from_bytes(self.0[start..end].to_vec())
    }

    pub fn concat(&self, other: &SlateBuffer) -> SlateBuffer {
        let mut bytes = Vec::with_capacity(self.0.len() + other.0.len());
        bytes.extend_from_slice(&self.0);
        bytes.extend_from_slice(&other.0);
        SlateBuffer::from_bytes(bytes)
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn ptr_eq(&self, other: &SlateBuffer) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    numeric_decode!(read_u16, u16);
    numeric_decode!(read_i16, i16);
    numeric_decode!(read_u32, u32);
    numeric_decode!(read_i32, i32);
    numeric_decode!(read_u64, u64);
    numeric_decode!(read_i64, i64);
    numeric_decode!(read_f32, f32);
    numeric_decode!(read_f64, f64);
}

impl PartialEq for SlateBuffer {
    /// Buffers compare by identity of the shared handle (spec §4.2), not
    /// their contents.
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for SlateBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlateBuffer(0x{})", self.to_hex())
    }
}

/// A shared, growable byte buffer (spec §3.1's `buffer_builder` variant).
/// Finalizing yields an immutable [`SlateBuffer`], mirroring
/// `StringBuilder::finalize`.
#[derive(Clone)]
pub struct BufferBuilder(Rc<RefCell<Vec<u8>>>);

impl BufferBuilder {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self(Rc::new(RefCell::new(Vec::with_capacity(cap))))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn push_byte(&self, value: u8) {
        self.0.borrow_mut().push(value);
    }

    pub fn extend(&self, bytes: &[u8]) {
        self.0.borrow_mut().extend_from_slice(bytes);
    }

    pub fn set_byte(&self, offset: usize, value: u8) -> Result<(), BufferError> {
        let mut inner = self.0.borrow_mut();
        let slot = inner.get_mut(offset).ok_or(BufferError::OutOfBounds {
            offset,
            needed: 1,
            len: inner.len(),
        })?;
        *slot = value;
        Ok(())
    }

    /// Writes past the current end grow the builder with zero-fill, the
    /// same "append on demand" behavior `StringBuilder::insert` gives
    /// string construction.
    pub fn write_bytes_at(&self, offset: usize, bytes: &[u8]) {
        let mut inner = self.0.borrow_mut();
        let end = offset + bytes.len();
        if inner.len() < end {
            inner.resize(end, 0);
        }
        inner[offset..end].copy_from_slice(bytes);
    }

    numeric_encode!(write_u16, u16);
    numeric_encode!(write_i16, i16);
    numeric_encode!(write_u32, u32);
    numeric_encode!(write_i32, i32);
    numeric_encode!(write_u64, u64);
    numeric_encode!(write_i64, i64);
    numeric_encode!(write_f32, f32);
    numeric_encode!(write_f64, f64);

    pub fn finalize(&self) -> SlateBuffer {
        SlateBuffer::from_bytes(self.0.borrow().clone())
    }

    pub fn ptr_eq(&self, other: &BufferBuilder) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for BufferBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for BufferBuilder {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for BufferBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferBuilder(len={})", self.0.borrow().len())
    }
}

/// A shared, position-tracked cursor over a [`SlateBuffer`] (spec §3.1's
/// `buffer_reader` variant). Sequential `read_*` calls advance the
/// position; out-of-range reads fail without moving it.
#[derive(Clone)]
pub struct BufferReader(Rc<RefCell<BufferReaderInner>>);

struct BufferReaderInner {
    buffer: SlateBuffer,
    position: Cell<usize>,
}

macro_rules! sequential_read {
    ($read:ident, $decode:ident, $ty:ty) => {
        pub fn $read(&self, endian: Endian) -> Result<$ty, BufferError> {
            let inner = self.0.borrow();
            let pos = inner.position.get();
            let value = inner.buffer.$decode(pos, endian)?;
            inner.position.set(pos + std::mem::size_of::<$ty>());
            Ok(value)
        }
    };
}

impl BufferReader {
    pub fn new(buffer: SlateBuffer) -> Self {
        Self(Rc::new(RefCell::new(BufferReaderInner { buffer, position: Cell::new(0) })))
    }

    pub fn position(&self) -> usize {
        self.0.borrow().position.get()
    }

    pub fn seek(&self, position: usize) {
        self.0.borrow().position.set(position);
    }

    pub fn remaining(&self) -> usize {
        let inner = self.0.borrow();
        inner.buffer.len().saturating_sub(inner.position.get())
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    pub fn read_byte(&self) -> Result<u8, BufferError> {
        let inner = self.0.borrow();
        let pos = inner.position.get();
        let byte = inner.buffer.get_byte(pos).ok_or(BufferError::OutOfBounds {
            offset: pos,
            needed: 1,
            len: inner.buffer.len(),
        })?;
        inner.position.set(pos + 1);
        Ok(byte)
    }

    sequential_read!(read_u16, read_u16, u16);
    sequential_read!(read_i16, read_i16, i16);
    sequential_read!(read_u32, read_u32, u32);
    sequential_read!(read_i32, read_i32, i32);
    sequential_read!(read_u64, read_u64, u64);
    sequential_read!(read_i64, read_i64, i64);
    sequential_read!(read_f32, read_f32, f32);
    sequential_read!(read_f64, read_f64, f64);

    pub fn ptr_eq(&self, other: &BufferReader) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for BufferReader {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for BufferReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        write!(f, "BufferReader(position={}, len={})", inner.position.get(), inner.buffer.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_write_then_finalize_reads_back_little_endian() {
        let b = BufferBuilder::new();
        b.write_bytes_at(0, &[0, 0, 0, 0]);
        b.write_u32(0, 0xdead_beef, Endian::Little).unwrap();
        let buf = b.finalize();
        assert_eq!(buf.read_u32(0, Endian::Little).unwrap(), 0xdead_beef);
    }

    #[test]
    fn endianness_changes_byte_order() {
        let b = BufferBuilder::new();
        b.write_bytes_at(0, &[0, 0]);
        b.write_u16(0, 0x1234, Endian::Big).unwrap();
        let buf = b.finalize();
        assert_eq!(buf.get_byte(0), Some(0x12));
        assert_eq!(buf.get_byte(1), Some(0x34));
    }

    #[test]
    fn out_of_bounds_read_is_an_error() {
        let buf = SlateBuffer::with_len(1);
        assert!(buf.read_u32(0, Endian::Little).is_err());
    }

    #[test]
    fn hex_formatting() {
        let buf = SlateBuffer::from_bytes(vec![0x0a, 0xff]);
        assert_eq!(buf.to_hex(), "0aff");
    }

    #[test]
    fn reader_advances_position_across_sequential_reads() {
        let b = BufferBuilder::new();
        b.write_bytes_at(0, &[0; 6]);
        b.write_u16(0, 1, Endian::Little).unwrap();
        b.write_u32(2, 2, Endian::Little).unwrap();
        let reader = BufferReader::new(b.finalize());
        assert_eq!(reader.read_u16(Endian::Little).unwrap(), 1);
        assert_eq!(reader.read_u32(Endian::Little).unwrap(), 2);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn reader_out_of_range_read_does_not_move_position() {
        let reader = BufferReader::new(SlateBuffer::with_len(1));
        assert!(reader.read_u32(Endian::Little).is_err());
        assert_eq!(reader.position(), 0);
    }
}
