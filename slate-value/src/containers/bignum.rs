//! Arbitrary-precision integer, used as the overflow target of the int32
//! numeric tower (spec §3.2). A thin wrapper over `num_bigint::BigInt` so
//! the rest of the crate can add conversions without an orphan-rule
//! conflict.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlateBigInt(BigInt);

impl SlateBigInt {
    pub fn from_i32(v: i32) -> Self {
        Self(BigInt::from(v))
    }

    pub fn from_i64(v: i64) -> Self {
        Self(BigInt::from(v))
    }

    pub fn inner(&self) -> &BigInt {
        &self.0
    }

    pub fn into_inner(self) -> BigInt {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Narrows back to `i32` when the value fits, for display/demotion
    /// purposes. The promotion lattice (spec §3.2) never auto-demotes, but
    /// literals and builtins need this.
    pub fn to_i32(&self) -> Option<i32> {
        self.0.to_i32()
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    pub fn parse(s: &str) -> Option<Self> {
        s.parse::<BigInt>().ok().map(Self)
    }

    pub fn add(&self, other: &Self) -> Self {
        Self(&self.0 + &other.0)
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self(&self.0 - &other.0)
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self(&self.0 * &other.0)
    }

    pub fn neg(&self) -> Self {
        Self(-&self.0)
    }

    /// Whether `self / other` has zero remainder (`other` non-zero
    /// assumed); used to decide `/`'s exact-vs-promote-to-float64 branch
    /// (spec §3.2).
    pub fn is_exactly_divisible_by(&self, other: &Self) -> bool {
        (&self.0 % &other.0).is_zero()
    }

    /// Truncating division, spec §3.2's integer `/` for the bignum lane.
    pub fn div_trunc(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        Some(Self(&self.0 / &other.0))
    }

    /// Remainder following the divisor's sign (Python `%` semantics).
    pub fn modulo(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        use num_integer::Integer;
        Some(Self(self.0.mod_floor(&other.0)))
    }

    pub fn floor_div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        use num_integer::Integer;
        Some(Self(self.0.div_floor(&other.0)))
    }
}

impl fmt::Debug for SlateBigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SlateBigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_does_not_overflow() {
        let a = SlateBigInt::from_i64(i64::MAX);
        let b = SlateBigInt::from_i64(i64::MAX);
        let sum = a.add(&b);
        assert!(sum.to_i32().is_none());
    }

    #[test]
    fn modulo_follows_divisor_sign() {
        let a = SlateBigInt::from_i32(-7);
        let b = SlateBigInt::from_i32(3);
        assert_eq!(a.modulo(&b).unwrap().to_i32(), Some(2));
    }

    #[test]
    fn division_by_zero_is_none() {
        let a = SlateBigInt::from_i32(1);
        let zero = SlateBigInt::from_i32(0);
        assert!(a.div_trunc(&zero).is_none());
    }
}
