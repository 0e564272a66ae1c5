//! Numeric promotion lattice and arithmetic (spec §3.2).
//!
//! ```text
//! int32 --overflow--> bigint --widen--> float64
//!                                  ^
//! float32 ------------widen-------+
//! ```
//!
//! Int32 arithmetic that would overflow promotes to [`SlateBigInt`] rather
//! than wrapping (unlike the teacher's `wrapping_add`, which this
//! deliberately diverges from per spec). Mixing any integral lane with a
//! float lane promotes to float64. Integer division and modulo by zero
//! are runtime errors; float division by zero follows IEEE-754 and
//! produces `inf`/`NaN`.

use std::fmt;

use crate::containers::SlateBigInt;
use crate::value::value_enum::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithError {
    DivisionByZero,
    ModuloByZero,
    NotANumber,
}

impl fmt::Display for ArithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithError::DivisionByZero => write!(f, "division by zero"),
            ArithError::ModuloByZero => write!(f, "modulo by zero"),
            ArithError::NotANumber => write!(f, "operand is not a number"),
        }
    }
}

impl std::error::Error for ArithError {}

/// A numeric value peeled out of [`Value`], used internally while
/// promoting operands to a common lane.
#[derive(Debug, Clone)]
enum Lane {
    Int32(i32),
    BigInt(SlateBigInt),
    Float32(f32),
    Float64(f64),
}

fn lane_of(v: &Value) -> Result<Lane, ArithError> {
    match v {
        Value::Int32(i) => Ok(Lane::Int32(*i)),
        Value::BigInt(b) => Ok(Lane::BigInt(b.clone())),
        Value::Float32(f) => Ok(Lane::Float32(*f)),
        Value::Float64(f) => Ok(Lane::Float64(*f)),
        _ => Err(ArithError::NotANumber),
    }
}

/// Rank in the promotion lattice; higher wins when combining two lanes.
fn rank(lane: &Lane) -> u8 {
    match lane {
        Lane::Int32(_) => 0,
        Lane::BigInt(_) => 1,
        Lane::Float32(_) => 2,
        Lane::Float64(_) => 3,
    }
}

fn promote_pair(a: Lane, b: Lane) -> (Lane, Lane) {
    let target = rank(&a).max(rank(&b));
    (widen(a, target), widen(b, target))
}

fn widen(lane: Lane, target: u8) -> Lane {
    if rank(&lane) >= target {
        return lane;
    }
    match target {
        1 => match lane {
            Lane::Int32(i) => Lane::BigInt(SlateBigInt::from_i32(i)),
            other => other,
        },
        2 => match lane {
            Lane::Int32(i) => Lane::Float32(i as f32),
            Lane::BigInt(b) => Lane::Float32(b.to_f64() as f32),
            other => other,
        },
        3 => match lane {
            Lane::Int32(i) => Lane::Float64(i as f64),
            Lane::BigInt(b) => Lane::Float64(b.to_f64()),
            Lane::Float32(f) => Lane::Float64(f as f64),
            other => other,
        },
        _ => lane,
    }
}

fn lane_to_value(lane: Lane) -> Value {
    match lane {
        Lane::Int32(i) => Value::Int32(i),
        Lane::BigInt(b) => match b.to_i32() {
            Some(i) => Value::Int32(i),
            None => Value::BigInt(b),
        },
        Lane::Float32(f) => Value::Float32(f),
        Lane::Float64(f) => Value::Float64(f),
    }
}

macro_rules! checked_int_op {
    ($a:expr, $b:expr, $checked:ident, $bigint_op:ident) => {{
        match $a.$checked($b) {
            Some(result) => Lane::Int32(result),
            None => Lane::BigInt(SlateBigInt::from_i32($a).$bigint_op(&SlateBigInt::from_i32($b))),
        }
    }};
}

pub fn add(a: &Value, b: &Value) -> Result<Value, ArithError> {
    let (la, lb) = promote_pair(lane_of(a)?, lane_of(b)?);
    let result = match (la, lb) {
        (Lane::Int32(x), Lane::Int32(y)) => checked_int_op!(x, y, checked_add, add),
        (Lane::BigInt(x), Lane::BigInt(y)) => Lane::BigInt(x.add(&y)),
        (Lane::Float32(x), Lane::Float32(y)) => Lane::Float32(x + y),
        (Lane::Float64(x), Lane::Float64(y)) => Lane::Float64(x + y),
        _ => unreachable!("promote_pair equalizes lanes"),
    };
    Ok(lane_to_value(result))
}

pub fn sub(a: &Value, b: &Value) -> Result<Value, ArithError> {
    let (la, lb) = promote_pair(lane_of(a)?, lane_of(b)?);
    let result = match (la, lb) {
        (Lane::Int32(x), Lane::Int32(y)) => checked_int_op!(x, y, checked_sub, sub),
        (Lane::BigInt(x), Lane::BigInt(y)) => Lane::BigInt(x.sub(&y)),
        (Lane::Float32(x), Lane::Float32(y)) => Lane::Float32(x - y),
        (Lane::Float64(x), Lane::Float64(y)) => Lane::Float64(x - y),
        _ => unreachable!("promote_pair equalizes lanes"),
    };
    Ok(lane_to_value(result))
}

pub fn mul(a: &Value, b: &Value) -> Result<Value, ArithError> {
    let (la, lb) = promote_pair(lane_of(a)?, lane_of(b)?);
    let result = match (la, lb) {
        (Lane::Int32(x), Lane::Int32(y)) => checked_int_op!(x, y, checked_mul, mul),
        (Lane::BigInt(x), Lane::BigInt(y)) => Lane::BigInt(x.mul(&y)),
        (Lane::Float32(x), Lane::Float32(y)) => Lane::Float32(x * y),
        (Lane::Float64(x), Lane::Float64(y)) => Lane::Float64(x * y),
        _ => unreachable!("promote_pair equalizes lanes"),
    };
    Ok(lane_to_value(result))
}

/// `/`: integral lanes divide exactly or not at all — an exact quotient
/// stays integral, an inexact one promotes to `float64` (spec §3.2).
/// Float lanes follow IEEE-754 throughout, including division by zero.
pub fn div(a: &Value, b: &Value) -> Result<Value, ArithError> {
    let (la, lb) = promote_pair(lane_of(a)?, lane_of(b)?);
    let result = match (la, lb) {
        (Lane::Int32(x), Lane::Int32(y)) => {
            if y == 0 {
                return Err(ArithError::DivisionByZero);
            }
            if x % y == 0 {
                match x.checked_div(y) {
                    Some(result) => Lane::Int32(result),
                    None => Lane::Float64(x as f64 / y as f64),
                }
            } else {
                Lane::Float64(x as f64 / y as f64)
            }
        }
        (Lane::BigInt(x), Lane::BigInt(y)) => {
            if y.is_zero() {
                return Err(ArithError::DivisionByZero);
            }
            if x.is_exactly_divisible_by(&y) {
                match x.div_trunc(&y) {
                    Some(q) => Lane::BigInt(q),
                    None => unreachable!("y is checked non-zero above"),
                }
            } else {
                Lane::Float64(x.to_f64() / y.to_f64())
            }
        }
        (Lane::Float32(x), Lane::Float32(y)) => Lane::Float32(x / y),
        (Lane::Float64(x), Lane::Float64(y)) => Lane::Float64(x / y),
        _ => unreachable!("promote_pair equalizes lanes"),
    };
    Ok(lane_to_value(result))
}

/// `//`: floor division, stays integral for integral operands.
pub fn floor_div(a: &Value, b: &Value) -> Result<Value, ArithError> {
    let (la, lb) = promote_pair(lane_of(a)?, lane_of(b)?);
    let result = match (la, lb) {
        (Lane::Int32(x), Lane::Int32(y)) => {
            if y == 0 {
                return Err(ArithError::DivisionByZero);
            }
            Lane::Int32(x.div_euclid(y))
        }
        (Lane::BigInt(x), Lane::BigInt(y)) => {
            Lane::BigInt(x.floor_div(&y).ok_or(ArithError::DivisionByZero)?)
        }
        (Lane::Float32(x), Lane::Float32(y)) => Lane::Float32((x / y).floor()),
        (Lane::Float64(x), Lane::Float64(y)) => Lane::Float64((x / y).floor()),
        _ => unreachable!("promote_pair equalizes lanes"),
    };
    Ok(lane_to_value(result))
}

/// `%`: remainder follows the divisor's sign (Python semantics), not the
/// dividend's (Rust/C semantics).
pub fn modulo(a: &Value, b: &Value) -> Result<Value, ArithError> {
    let (la, lb) = promote_pair(lane_of(a)?, lane_of(b)?);
    let result = match (la, lb) {
        (Lane::Int32(x), Lane::Int32(y)) => {
            if y == 0 {
                return Err(ArithError::ModuloByZero);
            }
            Lane::Int32(x.rem_euclid(y)).normalize_sign(y)
        }
        (Lane::BigInt(x), Lane::BigInt(y)) => {
            Lane::BigInt(x.modulo(&y).ok_or(ArithError::ModuloByZero)?)
        }
        (Lane::Float32(x), Lane::Float32(y)) => {
            let r = x.rem_euclid(y);
            Lane::Float32(if y < 0.0 && r != 0.0 { r + y } else { r })
        }
        (Lane::Float64(x), Lane::Float64(y)) => {
            let r = x.rem_euclid(y);
            Lane::Float64(if y < 0.0 && r != 0.0 { r + y } else { r })
        }
        _ => unreachable!("promote_pair equalizes lanes"),
    };
    Ok(lane_to_value(result))
}

impl Lane {
    /// `rem_euclid` always returns a non-negative result; Python's `%`
    /// instead takes the sign of the divisor. This corrects the sign for
    /// the int32 lane (used only by [`modulo`]).
    fn normalize_sign(self, divisor: i32) -> Lane {
        match self {
            Lane::Int32(r) if divisor < 0 && r != 0 => Lane::Int32(r + divisor),
            other => other,
        }
    }
}

pub fn pow(a: &Value, b: &Value) -> Result<Value, ArithError> {
    let (la, lb) = promote_pair(lane_of(a)?, lane_of(b)?);
    let result = match (la, lb) {
        (Lane::Int32(x), Lane::Int32(y)) if y >= 0 => match x.checked_pow(y as u32) {
            Some(result) => Lane::Int32(result),
            None => {
                let mut acc = SlateBigInt::from_i32(1);
                let base = SlateBigInt::from_i32(x);
                for _ in 0..y {
                    acc = acc.mul(&base);
                }
                Lane::BigInt(acc)
            }
        },
        (Lane::Int32(x), Lane::Int32(y)) => Lane::Float64((x as f64).powf(y as f64)),
        (Lane::BigInt(x), Lane::BigInt(y)) => {
            let exp = y.to_i32().unwrap_or(i32::MAX).max(0);
            let mut acc = SlateBigInt::from_i32(1);
            for _ in 0..exp {
                acc = acc.mul(&x);
            }
            Lane::BigInt(acc)
        }
        (Lane::Float32(x), Lane::Float32(y)) => Lane::Float32(x.powf(y)),
        (Lane::Float64(x), Lane::Float64(y)) => Lane::Float64(x.powf(y)),
        _ => unreachable!("promote_pair equalizes lanes"),
    };
    Ok(lane_to_value(result))
}

pub fn neg(a: &Value) -> Result<Value, ArithError> {
    let lane = lane_of(a)?;
    let result = match lane {
        Lane::Int32(x) => match x.checked_neg() {
            Some(r) => Lane::Int32(r),
            None => Lane::BigInt(SlateBigInt::from_i32(x).neg()),
        },
        Lane::BigInt(x) => Lane::BigInt(x.neg()),
        Lane::Float32(x) => Lane::Float32(-x),
        Lane::Float64(x) => Lane::Float64(-x),
    };
    Ok(lane_to_value(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int32_overflow_promotes_to_bigint_without_wrapping() {
        let a = Value::Int32(i32::MAX);
        let b = Value::Int32(1);
        let result = add(&a, &b).unwrap();
        assert!(matches!(result, Value::BigInt(_)));
    }

    #[test]
    fn mixing_int_and_float_promotes_to_float64() {
        let result = add(&Value::Int32(1), &Value::Float64(0.5)).unwrap();
        assert_eq!(result, Value::Float64(1.5));
    }

    #[test]
    fn integer_division_by_zero_errors() {
        assert_eq!(div(&Value::Int32(1), &Value::Int32(0)).unwrap_err(), ArithError::DivisionByZero);
    }

    #[test]
    fn float_division_by_zero_is_infinity() {
        let result = div(&Value::Float64(1.0), &Value::Float64(0.0)).unwrap();
        assert_eq!(result, Value::Float64(f64::INFINITY));
    }

    #[test]
    fn modulo_follows_divisor_sign() {
        let result = modulo(&Value::Int32(-7), &Value::Int32(3)).unwrap();
        assert_eq!(result, Value::Int32(2));
    }

    #[test]
    fn float_modulo_follows_divisor_sign() {
        let result = modulo(&Value::Float64(7.0), &Value::Float64(-3.0)).unwrap();
        assert_eq!(result, Value::Float64(-2.0));
    }

    #[test]
    fn floor_div_stays_integral() {
        let result = floor_div(&Value::Int32(7), &Value::Int32(2)).unwrap();
        assert_eq!(result, Value::Int32(3));
    }
}
