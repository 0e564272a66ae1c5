//! Function and closure values (spec §3.4).
//!
//! C2 only knows a function as an address into the compiled bytecode plus
//! its calling convention metadata; the bytecode itself is owned by C4 and
//! is deliberately opaque here to keep the dependency graph acyclic
//! (C2 must not depend on C4).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::containers::SlateString;
use crate::value::value_enum::Value;

/// A shared, mutable cell holding one captured variable (spec §3.4).
///
/// Closures snapshot each captured variable into its own cell at
/// creation time rather than aliasing the defining frame's stack slot
/// (no open/closed upvalue machinery): this is enough to make the
/// `makeCounter` pattern (spec §8 S3) work — repeated calls to the same
/// closure instance share the cell and see each other's writes — without
/// the enclosing function's *own* later reads of that local observing
/// writes made through the cell, or vice versa.
pub type UpvalueCell = Rc<RefCell<Value>>;

/// Static metadata for a compiled function: where its code starts in the
/// owning chunk table and how many parameters it expects.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionValue {
    pub name: Option<SlateString>,
    pub arity: usize,
    /// Index into the VM's compiled-chunk table (spec §4.4).
    pub chunk_index: usize,
}

impl FunctionValue {
    pub fn new(name: Option<SlateString>, arity: usize, chunk_index: usize) -> Self {
        Self {
            name,
            arity,
            chunk_index,
        }
    }
}

/// A function value bundled with its captured upvalues (spec §3.4's
/// closure model). Each captured variable is a [`UpvalueCell`] rather
/// than a plain `Value` so that mutations inside the closure body
/// (`LoadUpvalue`/`StoreUpvalue`) persist across separate calls to the
/// same closure instance.
#[derive(Debug, Clone)]
pub struct ClosureValue {
    pub function: Rc<FunctionValue>,
    pub captured: Vec<UpvalueCell>,
}

impl ClosureValue {
    pub fn new(function: Rc<FunctionValue>, captured: Vec<UpvalueCell>) -> Self {
        Self { function, captured }
    }
}

impl PartialEq for ClosureValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.function, &other.function)
            && self.captured.len() == other.captured.len()
            && self
                .captured
                .iter()
                .zip(other.captured.iter())
                .all(|(a, b)| Rc::ptr_eq(a, b))
    }
}

/// A host-provided builtin (spec §6.2/§6.3). Equality and Debug are
/// identity-based since the payload is an opaque closure.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: SlateString,
    pub arity: Option<usize>,
    pub func: Rc<dyn Fn(&[Value]) -> Result<Value, String>>,
}

impl NativeFunction {
    pub fn new(
        name: SlateString,
        arity: Option<usize>,
        func: Rc<dyn Fn(&[Value]) -> Result<Value, String>>,
    ) -> Self {
        Self { name, arity, func }
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        if let Some(arity) = self.arity {
            if args.len() != arity {
                return Err(format!(
                    "native function '{}' expects {} argument(s), got {}",
                    self.name,
                    arity,
                    args.len()
                ));
            }
        }
        (self.func)(args)
    }

    pub fn ptr_eq(&self, other: &NativeFunction) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_carries_its_captured_values() {
        let func = Rc::new(FunctionValue::new(None, 0, 0));
        let closure = ClosureValue::new(func, vec![Value::Int32(1)]);
        assert_eq!(closure.captured.len(), 1);
    }

    #[test]
    fn native_function_checks_arity() {
        let native = NativeFunction::new(
            SlateString::new("id").unwrap(),
            Some(1),
            Rc::new(|args: &[Value]| Ok(args[0].clone())),
        );
        assert!(native.call(&[]).is_err());
        assert_eq!(native.call(&[Value::Int32(3)]).unwrap(), Value::Int32(3));
    }
}
