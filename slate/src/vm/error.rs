//! Runtime error taxonomy (spec §7).
//!
//! Grounded on the teacher's `vm/error.rs` split: a plain `VmError` enum
//! with one variant per failure kind and a hand-rolled `Display`, paired
//! at the VM boundary with a `SpannedVmError` that carries the frame's
//! source line. Every runtime error unwinds the whole VM; there is no
//! in-language `catch`.

use std::fmt;

use slate_value::ValueKind;

#[derive(Debug, Clone, PartialEq)]
pub enum VmError {
    /// An operation was applied to a value of the wrong kind (spec §7).
    TypeError { message: String },
    /// A call supplied the wrong number of arguments.
    ArityError { expected: usize, got: usize },
    /// A global was referenced before it was defined, or a property was
    /// read off a value that has no such property and no prototype chain
    /// to fall back on.
    NameError { name: String },
    /// An index or length fell outside the bounds a container allows.
    RangeError { message: String },
    /// Integer division or modulo by zero.
    ArithmeticError { message: String },
    /// The call-frame stack grew past its configured limit.
    StackOverflowError,
    /// Catch-all for conditions the other variants don't name.
    RuntimeError { message: String },
}

impl VmError {
    pub fn type_error(message: impl Into<String>) -> Self {
        VmError::TypeError { message: message.into() }
    }

    /// Builds a `TypeError` for an operation that expected one kind and
    /// received another, e.g. calling a non-callable or indexing a
    /// non-container.
    pub fn type_error_expected(operation: &str, expected: &str, got: ValueKind) -> Self {
        VmError::TypeError {
            message: format!("{operation} expected {expected}, got {got}"),
        }
    }

    pub fn arity(expected: usize, got: usize) -> Self {
        VmError::ArityError { expected, got }
    }

    pub fn undefined_global(name: impl Into<String>) -> Self {
        VmError::NameError { name: name.into() }
    }

    pub fn index_out_of_bounds(index: i64, len: usize) -> Self {
        VmError::RangeError {
            message: format!("index {index} out of bounds for length {len}"),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        VmError::RuntimeError { message: message.into() }
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::TypeError { message } => write!(f, "TypeError: {message}"),
            VmError::ArityError { expected, got } => {
                write!(f, "ArityError: expected {expected} argument(s), got {got}")
            }
            VmError::NameError { name } => write!(f, "NameError: '{name}' is not defined"),
            VmError::RangeError { message } => write!(f, "RangeError: {message}"),
            VmError::ArithmeticError { message } => write!(f, "ArithmeticError: {message}"),
            VmError::StackOverflowError => write!(f, "StackOverflowError: call stack exceeded its maximum depth"),
            VmError::RuntimeError { message } => write!(f, "RuntimeError: {message}"),
        }
    }
}

impl std::error::Error for VmError {}

/// A [`VmError`] paired with the source line of the frame active when it
/// was raised (spec §6.4's "frame-source-line" diagnostic). `line` is
/// `0` when the originating chunk carries no debug info (bytecode
/// loaded from disk rather than freshly compiled).
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedVmError {
    pub error: VmError,
    pub line: u32,
    /// Name of the function active when the error was raised, innermost
    /// first, for a minimal backtrace (spec §6.4).
    pub frame_names: Vec<String>,
}

impl SpannedVmError {
    pub fn new(error: VmError, line: u32, frame_names: Vec<String>) -> Self {
        Self { error, line, frame_names }
    }
}

impl fmt::Display for SpannedVmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}", self.error, self.line)?;
        for name in &self.frame_names {
            write!(f, "\n  in {name}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SpannedVmError {}

pub type VmResult<T> = Result<T, VmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_error_category() {
        let err = VmError::undefined_global("foo");
        assert_eq!(err.to_string(), "NameError: 'foo' is not defined");
    }

    #[test]
    fn spanned_error_appends_line_and_backtrace() {
        let spanned = SpannedVmError::new(VmError::ArithmeticError { message: "division by zero".to_string() }, 1, vec!["<script>".to_string()]);
        assert_eq!(spanned.to_string(), "ArithmeticError: division by zero at line 1\n  in <script>");
    }

    #[test]
    fn type_error_expected_names_both_kinds() {
        let err = VmError::type_error_expected("call", "a callable", ValueKind::Int32);
        assert!(err.to_string().contains("expected a callable"));
        assert!(err.to_string().contains("got Int"));
    }
}
