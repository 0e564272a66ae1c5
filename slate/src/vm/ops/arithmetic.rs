//! `Add`..`Not`, `Eq`..`GtEq` (spec §4.2, §4.5). Delegates straight to
//! slate-value's promotion-lattice helpers; this module only owns the
//! `Instr` dispatch and the `String + String` concatenation spec §4.2
//! carves out as Add's one non-numeric case.

use slate_value::value::arithmetic;
use slate_value::{compare, equals, ArithError, Value};

use super::super::error::VmError;
use super::super::Vm;
use crate::bytecode::Instr;

fn map_arith_err(e: ArithError) -> VmError {
    match e {
        ArithError::DivisionByZero => VmError::ArithmeticError { message: "division by zero".to_string() },
        ArithError::ModuloByZero => VmError::ArithmeticError { message: "modulo by zero".to_string() },
        ArithError::NotANumber => VmError::type_error("arithmetic operand is not a number"),
    }
}

impl Vm {
    /// `Add`/`Sub`/.../`Pow`: binary arithmetic, plus string concatenation
    /// when both operands of `Add` are strings.
    pub(in crate::vm) fn binary_arith(&self, instr: Instr, a: &Value, b: &Value) -> Result<Value, VmError> {
        if instr == Instr::Add {
            if let (Value::Str(x), Value::Str(y)) = (a, b) {
                return Ok(Value::Str(x.append(y)));
            }
        }
        let result = match instr {
            Instr::Add => arithmetic::add(a, b),
            Instr::Sub => arithmetic::sub(a, b),
            Instr::Mul => arithmetic::mul(a, b),
            Instr::Div => arithmetic::div(a, b),
            Instr::FloorDiv => arithmetic::floor_div(a, b),
            Instr::Mod => arithmetic::modulo(a, b),
            Instr::Pow => arithmetic::pow(a, b),
            other => unreachable!("binary_arith called with non-arithmetic instruction {other:?}"),
        };
        result.map_err(map_arith_err)
    }

    pub(in crate::vm) fn unary_neg(&self, a: &Value) -> Result<Value, VmError> {
        arithmetic::neg(a).map_err(map_arith_err)
    }

    pub(in crate::vm) fn comparison(&self, instr: Instr, a: &Value, b: &Value) -> Result<Value, VmError> {
        match instr {
            Instr::Eq => Ok(Value::Bool(equals(a, b))),
            Instr::NotEq => Ok(Value::Bool(!equals(a, b))),
            Instr::Lt | Instr::LtEq | Instr::Gt | Instr::GtEq => {
                let ordering = compare(a, b).ok_or_else(|| {
                    VmError::type_error(format!("cannot compare {} and {}", a.kind(), b.kind()))
                })?;
                let result = match instr {
                    Instr::Lt => ordering.is_lt(),
                    Instr::LtEq => ordering.is_le(),
                    Instr::Gt => ordering.is_gt(),
                    Instr::GtEq => ordering.is_ge(),
                    _ => unreachable!("matched above"),
                };
                Ok(Value::Bool(result))
            }
            other => unreachable!("comparison called with non-comparison instruction {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_value::SlateString;

    fn vm() -> Vm {
        Vm::new(crate::bytecode::Module::new())
    }

    #[test]
    fn add_concatenates_strings() {
        let vm = vm();
        let a = Value::Str(SlateString::new("hi ").unwrap());
        let b = Value::Str(SlateString::new("there").unwrap());
        assert_eq!(vm.binary_arith(Instr::Add, &a, &b).unwrap(), Value::Str(SlateString::new("hi there").unwrap()));
    }

    #[test]
    fn add_promotes_overflowing_ints_to_bigint() {
        let vm = vm();
        let result = vm.binary_arith(Instr::Add, &Value::Int32(i32::MAX), &Value::Int32(1)).unwrap();
        assert!(matches!(result, Value::BigInt(_)));
    }

    #[test]
    fn div_by_zero_is_an_arithmetic_error() {
        let vm = vm();
        let err = vm.binary_arith(Instr::Div, &Value::Int32(1), &Value::Int32(0)).unwrap_err();
        assert!(matches!(err, VmError::ArithmeticError { .. }));
    }

    #[test]
    fn comparison_between_incompatible_kinds_is_a_type_error() {
        let vm = vm();
        let err = vm.comparison(Instr::Lt, &Value::Int32(1), &Value::Null).unwrap_err();
        assert!(matches!(err, VmError::TypeError { .. }));
    }
}
