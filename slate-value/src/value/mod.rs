//! C2: the tagged value model layered on top of the C1 containers
//! (spec §3.1–§3.5, §4.2).

pub mod arithmetic;
pub mod class;
pub mod equality;
pub mod function;
pub mod iterator;
pub mod range;
pub mod temporal;
pub mod truthy;
pub mod value_enum;

pub use arithmetic::ArithError;
pub use class::{ClassValue, PrimitiveClasses};
pub use equality::{compare, equals, numeric_compare};
pub use function::{ClosureValue, FunctionValue, NativeFunction};
pub use iterator::IteratorValue;
pub use range::{RangeError, RangeValue};
pub use temporal::{DateInZone, Duration, Instant, LocalDate, LocalDateTime, LocalTime, Period, Zone};
pub use truthy::{is_falsy, is_truthy};
pub use value_enum::{BoundMethodValue, Value, ValueKind};

/// Optional source-location metadata attached to runtime diagnostics
/// (spec §6.4). Carried separately from [`Value`] since only a handful of
/// call sites (errors, stack traces) need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugLocation {
    pub line: u32,
    pub column: u32,
}

impl DebugLocation {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for DebugLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
