//! Slate: bytecode compiler and stack VM for a small dynamically-typed
//! scripting language (spec §1-§8).
//!
//! `slate-value` (C1+C2) supplies the value model this crate's
//! `compiler` (C3→C4) lowers an AST into and its `vm` (C5) executes
//! against. This crate owns compilation and execution only; parsing
//! lives in the sibling `slate-parser` crate.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod bytecode;
pub mod compiler;
pub mod vm;

use std::fmt;

pub use slate_value::Value;

/// Everything that can go wrong turning source text into a finished
/// result, folding the three pipeline stages' error types into one
/// (spec §7; grounded on the teacher's `PipelineError` in
/// `pipeline.rs`, which does the same across its own parse/lower/load
/// stages).
#[derive(Debug, Clone)]
pub enum SlateError {
    Parse(slate_parser::ParseError),
    Compile(compiler::CompileError),
    Runtime(vm::error::SpannedVmError),
}

impl fmt::Display for SlateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlateError::Parse(e) => write!(f, "parse error: {e}"),
            SlateError::Compile(e) => write!(f, "compile error: {e}"),
            SlateError::Runtime(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SlateError {}

impl From<slate_parser::ParseError> for SlateError {
    fn from(e: slate_parser::ParseError) -> Self {
        SlateError::Parse(e)
    }
}

impl From<compiler::CompileError> for SlateError {
    fn from(e: compiler::CompileError) -> Self {
        SlateError::Compile(e)
    }
}

impl From<vm::error::SpannedVmError> for SlateError {
    fn from(e: vm::error::SpannedVmError) -> Self {
        SlateError::Runtime(e)
    }
}

/// Parses, compiles, and runs a complete program in one call (spec §8's
/// end-to-end scenarios), the way the teacher's
/// `api::compile_and_run_value` chains its own three stages.
pub fn run(source: &str) -> Result<Value, SlateError> {
    let program = slate_parser::parse(source)?;
    let module = compiler::compile(&program)?;
    let mut machine = vm::Vm::new(module);
    Ok(machine.run()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_a_one_line_script_end_to_end() {
        assert_eq!(run("1 + 2;").unwrap(), Value::Int32(3));
    }

    #[test]
    fn surfaces_a_parse_error_without_reaching_the_vm() {
        let err = run("var = ;").unwrap_err();
        assert!(matches!(err, SlateError::Parse(_)));
    }
}
