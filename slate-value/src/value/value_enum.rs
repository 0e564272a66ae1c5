//! The tagged runtime value (C2, spec §3.1).

use std::fmt;
use std::rc::Rc;

use crate::containers::{BufferBuilder, BufferReader, SlateArray, SlateBigInt, SlateBuffer, SlateObject, SlateString, StringBuilder};
use crate::value::class::ClassValue;
use crate::value::function::{ClosureValue, FunctionValue, NativeFunction};
use crate::value::iterator::IteratorValue;
use crate::value::range::RangeValue;
use crate::value::temporal::{DateInZone, Duration, Instant, LocalDate, LocalDateTime, LocalTime, Period, Zone};

/// The single value type every Slate expression evaluates to.
///
/// Container variants (`Array`, `Object`, `Buffer`, `StringBuilder`) are
/// `Rc`-backed shared handles: cloning a `Value` clones the handle, not
/// the underlying storage, which is what gives Slate reference semantics
/// for mutable containers while scalars remain copy-by-value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),

    Int32(i32),
    BigInt(SlateBigInt),
    Float32(f32),
    Float64(f64),

    Str(SlateString),
    StringBuilder(StringBuilder),
    Array(SlateArray),
    Object(SlateObject),
    Buffer(SlateBuffer),
    BufferBuilder(BufferBuilder),
    BufferReader(BufferReader),

    Range(Rc<RangeValue>),
    Iterator(IteratorValue),

    Function(Rc<FunctionValue>),
    Closure(Rc<ClosureValue>),
    Native(Rc<NativeFunction>),
    /// A native method pre-bound to a receiver (spec §3.1). Produced by
    /// `GET_PROPERTY`/`GET_METHOD` when the resolved value is a native
    /// that wants its receiver; calling it supplies `receiver` as the
    /// first argument to `callee` ahead of whatever the call site pushes.
    BoundMethod(Rc<BoundMethodValue>),
    Class(Rc<ClassValue>),

    LocalDate(LocalDate),
    LocalTime(LocalTime),
    LocalDateTime(LocalDateTime),
    Zone(Zone),
    DateInZone(Rc<DateInZone>),
    Instant(Instant),
    Duration(Duration),
    Period(Period),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Undefined => ValueKind::Undefined,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int32(_) => ValueKind::Int32,
            Value::BigInt(_) => ValueKind::BigInt,
            Value::Float32(_) => ValueKind::Float32,
            Value::Float64(_) => ValueKind::Float64,
            Value::Str(_) => ValueKind::String,
            Value::StringBuilder(_) => ValueKind::StringBuilder,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
            Value::Buffer(_) => ValueKind::Buffer,
            Value::BufferBuilder(_) => ValueKind::BufferBuilder,
            Value::BufferReader(_) => ValueKind::BufferReader,
            Value::Range(_) => ValueKind::Range,
            Value::Iterator(_) => ValueKind::Iterator,
            Value::Function(_) => ValueKind::Function,
            Value::Closure(_) => ValueKind::Closure,
            Value::Native(_) => ValueKind::Native,
            Value::BoundMethod(_) => ValueKind::BoundMethod,
            Value::Class(_) => ValueKind::Class,
            Value::LocalDate(_) => ValueKind::LocalDate,
            Value::LocalTime(_) => ValueKind::LocalTime,
            Value::LocalDateTime(_) => ValueKind::LocalDateTime,
            Value::Zone(_) => ValueKind::Zone,
            Value::DateInZone(_) => ValueKind::DateInZone,
            Value::Instant(_) => ValueKind::Instant,
            Value::Duration(_) => ValueKind::Duration,
            Value::Period(_) => ValueKind::Period,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int32(_) | Value::BigInt(_) | Value::Float32(_) | Value::Float64(_)
        )
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(i) => Some(*i as f64),
            Value::BigInt(b) => Some(b.to_f64()),
            Value::Float32(f) => Some(*f as f64),
            Value::Float64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Function(_) | Value::Closure(_) | Value::Native(_) | Value::BoundMethod(_) | Value::Class(_)
        )
    }
}

/// A native function paired with the receiver it was resolved against.
#[derive(Clone)]
pub struct BoundMethodValue {
    pub receiver: Value,
    pub callee: Rc<NativeFunction>,
}

impl BoundMethodValue {
    pub fn new(receiver: Value, callee: Rc<NativeFunction>) -> Self {
        Self { receiver, callee }
    }
}

impl fmt::Debug for BoundMethodValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundMethodValue({})", self.callee.name)
    }
}

impl PartialEq for BoundMethodValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.callee, &other.callee) && self.receiver == other.receiver
    }
}

/// Discriminant-only mirror of [`Value`], used for diagnostics and class
/// lookup (spec §3.3: every value's class is found from its kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Undefined,
    Bool,
    Int32,
    BigInt,
    Float32,
    Float64,
    String,
    StringBuilder,
    Array,
    Object,
    Buffer,
    BufferBuilder,
    BufferReader,
    Range,
    Iterator,
    Function,
    Closure,
    Native,
    BoundMethod,
    Class,
    LocalDate,
    LocalTime,
    LocalDateTime,
    Zone,
    DateInZone,
    Instant,
    Duration,
    Period,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "Null",
            ValueKind::Undefined => "Undefined",
            ValueKind::Bool => "Boolean",
            ValueKind::Int32 => "Int",
            ValueKind::BigInt => "BigInt",
            ValueKind::Float32 => "Float32",
            ValueKind::Float64 => "Float64",
            ValueKind::String => "String",
            ValueKind::StringBuilder => "StringBuilder",
            ValueKind::Array => "Array",
            ValueKind::Object => "Object",
            ValueKind::Buffer => "Buffer",
            ValueKind::BufferBuilder => "BufferBuilder",
            ValueKind::BufferReader => "BufferReader",
            ValueKind::Range => "Range",
            ValueKind::Iterator => "Iterator",
            ValueKind::Function => "Function",
            ValueKind::Closure => "Closure",
            ValueKind::Native => "NativeFunction",
            ValueKind::BoundMethod => "BoundMethod",
            ValueKind::Class => "Class",
            ValueKind::LocalDate => "LocalDate",
            ValueKind::LocalTime => "LocalTime",
            ValueKind::LocalDateTime => "LocalDateTime",
            ValueKind::Zone => "Zone",
            ValueKind::DateInZone => "DateInZone",
            ValueKind::Instant => "Instant",
            ValueKind::Duration => "Duration",
            ValueKind::Period => "Period",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int32(i) => write!(f, "{i}"),
            Value::BigInt(b) => write!(f, "{b}"),
            Value::Float32(x) => write!(f, "{x}"),
            Value::Float64(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::StringBuilder(_) => write!(f, "<string builder>"),
            Value::Array(a) => {
                write!(f, "[")?;
                for (i, v) in a.to_vec().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Object(_) => write!(f, "<object>"),
            Value::Buffer(b) => write!(f, "<buffer 0x{}>", b.to_hex()),
            Value::BufferBuilder(_) => write!(f, "<buffer builder>"),
            Value::BufferReader(r) => write!(f, "<buffer reader at {}>", r.position()),
            Value::Range(r) => write!(f, "{}..{}", r.start, r.end),
            Value::Iterator(_) => write!(f, "<iterator>"),
            Value::Function(fun) => match &fun.name {
                Some(name) => write!(f, "<function {name}>"),
                None => write!(f, "<anonymous function>"),
            },
            Value::Closure(c) => write!(f, "<closure {}>", c.function.name.as_ref().map(|n| n.as_str()).unwrap_or("anonymous")),
            Value::Native(n) => write!(f, "<native function {}>", n.name),
            Value::BoundMethod(b) => write!(f, "<bound method {}>", b.callee.name),
            Value::Class(c) => write!(f, "{c}"),
            Value::LocalDate(d) => write!(f, "{d}"),
            Value::LocalTime(t) => write!(f, "{t}"),
            Value::LocalDateTime(dt) => write!(f, "{dt}"),
            Value::Zone(z) => write!(f, "{}", z.name),
            Value::DateInZone(z) => write!(f, "{} {}", z.datetime, z.zone.name),
            Value::Instant(i) => write!(f, "<instant {}ms>", i.epoch_millis),
            Value::Duration(d) => write!(f, "{}s", d.as_seconds_f64()),
            Value::Period(p) => write!(f, "P{}Y{}M{}D", p.years, p.months, p.days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::SlateString;

    #[test]
    fn kind_round_trips_each_variant_family() {
        assert_eq!(Value::Int32(1).kind(), ValueKind::Int32);
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert_eq!(
            Value::Str(SlateString::new("x").unwrap()).kind(),
            ValueKind::String
        );
    }

    #[test]
    fn display_formats_arrays_recursively() {
        let arr = SlateArray::from_vec(vec![Value::Int32(1), Value::Int32(2)]);
        assert_eq!(format!("{}", Value::Array(arr)), "[1, 2]");
    }
}
