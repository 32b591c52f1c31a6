use std::{
    cmp::Ordering,
    fmt::{Display, Error, Formatter},
    ops::{Add, Mul, Neg, Sub},
    str::FromStr,
};

use rug::{ops::Pow, Integer as MultiPrecisionInteger};
use thiserror::Error;

use crate::utils;

use super::{EuclideanDomain, OrderedRing, Ring};

/// The integer ring.
pub type Z = IntegerRing;
/// The integer ring.
pub const Z: IntegerRing = IntegerRing::new();

/// The integer ring.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct IntegerRing;

impl Default for IntegerRing {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegerRing {
    pub const fn new() -> IntegerRing {
        IntegerRing
    }
}

impl Display for IntegerRing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Z")
    }
}

/// An error raised when a numeric literal cannot be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseNumberError {
    #[error("invalid integer literal '{0}'")]
    InvalidInteger(String),
    #[error("invalid rational literal '{0}'")]
    InvalidRational(String),
    #[error("zero denominator in '{0}'")]
    ZeroDenominator(String),
}

/// An arbitrary-precision integer. Values that fit in an `i64` are
/// always stored as [Integer::Natural], so that the derived equality
/// and hash are canonical.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Integer {
    Natural(i64),
    Large(MultiPrecisionInteger),
}

impl From<i64> for Integer {
    #[inline]
    fn from(value: i64) -> Self {
        Integer::Natural(value)
    }
}

impl From<i32> for Integer {
    #[inline]
    fn from(value: i32) -> Self {
        Integer::Natural(value as i64)
    }
}

impl From<u64> for Integer {
    #[inline]
    fn from(value: u64) -> Self {
        if value <= i64::MAX as u64 {
            Integer::Natural(value as i64)
        } else {
            Integer::Large(MultiPrecisionInteger::from(value))
        }
    }
}

impl From<MultiPrecisionInteger> for Integer {
    #[inline]
    fn from(value: MultiPrecisionInteger) -> Self {
        Integer::from_large(value)
    }
}

impl Integer {
    #[inline]
    pub fn new(num: i64) -> Integer {
        Integer::Natural(num)
    }

    #[inline]
    pub fn zero() -> Integer {
        Integer::Natural(0)
    }

    #[inline]
    pub fn one() -> Integer {
        Integer::Natural(1)
    }

    /// Create an integer from a multi-precision one, downcasting when possible.
    #[inline]
    pub fn from_large(n: MultiPrecisionInteger) -> Integer {
        match n.to_i64() {
            Some(n) => Integer::Natural(n),
            None => Integer::Large(n),
        }
    }

    /// Convert to a multi-precision integer.
    pub fn to_multi_prec(&self) -> MultiPrecisionInteger {
        match self {
            Integer::Natural(n) => MultiPrecisionInteger::from(*n),
            Integer::Large(r) => r.clone(),
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self, Integer::Natural(0))
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        matches!(self, Integer::Natural(1))
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Integer::Natural(n) => *n < 0,
            Integer::Large(r) => r.cmp0() == Ordering::Less,
        }
    }

    pub fn abs(&self) -> Integer {
        match self {
            Integer::Natural(n) => match n.checked_abs() {
                Some(a) => Integer::Natural(a),
                None => Integer::Large(MultiPrecisionInteger::from(*n).abs()),
            },
            Integer::Large(n) => Integer::Large(n.clone().abs()),
        }
    }

    pub fn pow(&self, e: u64) -> Integer {
        if e > u32::MAX as u64 {
            panic!("Power of exponentation is larger than 2^32: {}", e);
        }
        let e = e as u32;

        match self {
            Integer::Natural(n1) => {
                if let Some(pn) = n1.checked_pow(e) {
                    Integer::Natural(pn)
                } else {
                    Integer::from_large(MultiPrecisionInteger::from(*n1).pow(e))
                }
            }
            Integer::Large(r) => Integer::from_large(r.clone().pow(e)),
        }
    }

    /// Compute the non-negative greatest common divisor.
    pub fn gcd(&self, b: &Integer) -> Integer {
        match (self, b) {
            (Integer::Natural(n1), Integer::Natural(n2)) => {
                let g = utils::gcd_signed(*n1, *n2);
                Integer::from(g)
            }
            _ => Integer::from_large(self.to_multi_prec().gcd(&b.to_multi_prec())),
        }
    }

    /// Compute the non-negative least common multiple.
    pub fn lcm(&self, b: &Integer) -> Integer {
        if self.is_zero() || b.is_zero() {
            return Integer::zero();
        }

        let g = self.gcd(b);
        (&self.quot_rem(&g).0 * b).abs()
    }

    /// Truncated division, such that `self = q * b + r` and `r` has the sign of `self`.
    ///
    /// # Panics
    ///
    /// Panics when `b` is zero.
    pub fn quot_rem(&self, b: &Integer) -> (Integer, Integer) {
        if b.is_zero() {
            panic!("Cannot divide by zero");
        }

        if let (Integer::Natural(n1), Integer::Natural(n2)) = (self, b) {
            if let (Some(q), Some(r)) = (n1.checked_div(*n2), n1.checked_rem(*n2)) {
                return (Integer::Natural(q), Integer::Natural(r));
            }
        }

        let (q, r) = self.to_multi_prec().div_rem(b.to_multi_prec());
        (Integer::from_large(q), Integer::from_large(r))
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            Integer::Natural(n) => n.fmt(f),
            Integer::Large(r) => r.fmt(f),
        }
    }
}

impl FromStr for Integer {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if let Ok(n) = t.parse::<i64>() {
            return Ok(Integer::Natural(n));
        }

        t.parse::<MultiPrecisionInteger>()
            .map(Integer::from_large)
            .map_err(|_| ParseNumberError::InvalidInteger(s.to_string()))
    }
}

impl PartialOrd for Integer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Integer {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Integer::Natural(n1), Integer::Natural(n2)) => n1.cmp(n2),
            (Integer::Natural(n1), Integer::Large(n2)) => n2.partial_cmp(n1).unwrap_or(Ordering::Equal).reverse(),
            (Integer::Large(n1), Integer::Natural(n2)) => n1.partial_cmp(n2).unwrap_or(Ordering::Equal),
            (Integer::Large(n1), Integer::Large(n2)) => n1.cmp(n2),
        }
    }
}

impl<'a> Add<&'a Integer> for &'a Integer {
    type Output = Integer;

    fn add(self, rhs: &'a Integer) -> Integer {
        if let (Integer::Natural(n1), Integer::Natural(n2)) = (self, rhs) {
            if let Some(r) = n1.checked_add(*n2) {
                return Integer::Natural(r);
            }
        }

        Integer::from_large(self.to_multi_prec() + rhs.to_multi_prec())
    }
}

impl<'a> Sub<&'a Integer> for &'a Integer {
    type Output = Integer;

    fn sub(self, rhs: &'a Integer) -> Integer {
        if let (Integer::Natural(n1), Integer::Natural(n2)) = (self, rhs) {
            if let Some(r) = n1.checked_sub(*n2) {
                return Integer::Natural(r);
            }
        }

        Integer::from_large(self.to_multi_prec() - rhs.to_multi_prec())
    }
}

impl<'a> Mul<&'a Integer> for &'a Integer {
    type Output = Integer;

    fn mul(self, rhs: &'a Integer) -> Integer {
        if let (Integer::Natural(n1), Integer::Natural(n2)) = (self, rhs) {
            if let Some(r) = n1.checked_mul(*n2) {
                return Integer::Natural(r);
            }
        }

        Integer::from_large(self.to_multi_prec() * rhs.to_multi_prec())
    }
}

impl<'a> Neg for &'a Integer {
    type Output = Integer;

    fn neg(self) -> Integer {
        match self {
            Integer::Natural(n) => match n.checked_neg() {
                Some(r) => Integer::Natural(r),
                None => Integer::from_large(-MultiPrecisionInteger::from(*n)),
            },
            Integer::Large(r) => Integer::from_large(-r.clone()),
        }
    }
}

impl Neg for Integer {
    type Output = Integer;

    fn neg(self) -> Integer {
        -&self
    }
}

impl Ring for IntegerRing {
    type Element = Integer;

    #[inline]
    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a + b
    }

    #[inline]
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a - b
    }

    #[inline]
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a * b
    }

    #[inline]
    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = &*a + b;
    }

    #[inline]
    fn sub_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = &*a - b;
    }

    #[inline]
    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = &*a * b;
    }

    #[inline]
    fn neg(&self, a: &Self::Element) -> Self::Element {
        -a
    }

    #[inline]
    fn zero(&self) -> Self::Element {
        Integer::zero()
    }

    #[inline]
    fn one(&self) -> Self::Element {
        Integer::one()
    }

    #[inline]
    fn nth(&self, n: i64) -> Self::Element {
        Integer::Natural(n)
    }

    #[inline]
    fn pow(&self, b: &Self::Element, e: u64) -> Self::Element {
        b.pow(e)
    }

    #[inline]
    fn is_zero(a: &Self::Element) -> bool {
        a.is_zero()
    }

    #[inline]
    fn is_one(&self, a: &Self::Element) -> bool {
        a.is_one()
    }

    fn one_is_gcd_unit() -> bool {
        true
    }

    fn is_integer(&self, _a: &Self::Element) -> bool {
        true
    }

    fn try_inv(&self, a: &Self::Element) -> Option<Self::Element> {
        match a {
            Integer::Natural(1) | Integer::Natural(-1) => Some(a.clone()),
            _ => None,
        }
    }

    fn try_div(&self, a: &Self::Element, b: &Self::Element) -> Option<Self::Element> {
        if b.is_zero() {
            return None;
        }

        let (q, r) = a.quot_rem(b);
        if r.is_zero() {
            Some(q)
        } else {
            None
        }
    }
}

impl EuclideanDomain for IntegerRing {
    fn rem(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a.quot_rem(b).1
    }

    fn quot_rem(&self, a: &Self::Element, b: &Self::Element) -> (Self::Element, Self::Element) {
        a.quot_rem(b)
    }

    fn gcd(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a.gcd(b)
    }

    fn normalization_factor(&self, a: &Self::Element) -> Self::Element {
        if a.is_negative() {
            Integer::Natural(-1)
        } else {
            Integer::Natural(1)
        }
    }
}

impl OrderedRing for IntegerRing {
    fn cmp(&self, a: &Self::Element, b: &Self::Element) -> Ordering {
        a.cmp(b)
    }

    fn is_negative(&self, a: &Self::Element) -> bool {
        a.is_negative()
    }

    fn abs(&self, a: &Self::Element) -> Self::Element {
        a.abs()
    }
}
