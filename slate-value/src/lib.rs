//! Shared containers (C1) and the tagged runtime value (C2) for Slate.
//!
//! This crate has no notion of bytecode or execution; it only defines the
//! capability containers the rest of the system is built on, and the
//! value model layered on top of them. See `spec.md` §3–§4.1–§4.2.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod containers;
pub mod value;

pub use containers::{
    ArrayError, BufferBuilder, BufferError, BufferReader, Endian, SlateArray, SlateBigInt, SlateBuffer, SlateObject, SlateString, StringBuilder,
    StringError,
};
pub use value::{
    compare, equals, is_falsy, is_truthy, numeric_compare, ArithError, BoundMethodValue, ClassValue, ClosureValue, DateInZone, DebugLocation,
    Duration, FunctionValue, Instant, IteratorValue, LocalDate, LocalDateTime, LocalTime, NativeFunction, Period, PrimitiveClasses, RangeError,
    RangeValue, Value, ValueKind, Zone,
};
