use std::{
    cmp::Ordering,
    fmt::{Display, Error, Formatter},
    ops::{Add, Div, Mul, Neg, Sub},
    str::FromStr,
};

use super::{
    integer::{Integer, ParseNumberError},
    EuclideanDomain, Field, OrderedRing, Ring,
};

/// The field of rational numbers.
pub type Q = RationalField;
/// The field of rational numbers.
pub const Q: RationalField = RationalField::new();

/// The field of rational numbers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RationalField;

impl Default for RationalField {
    fn default() -> Self {
        Self::new()
    }
}

impl RationalField {
    pub const fn new() -> RationalField {
        RationalField
    }
}

impl Display for RationalField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Q")
    }
}

/// A rational number in canonical form: the denominator is positive
/// and coprime to the numerator.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Rational {
    numerator: Integer,
    denominator: Integer,
}

impl From<i64> for Rational {
    #[inline]
    fn from(value: i64) -> Self {
        Rational::from_integer(value.into())
    }
}

impl From<i32> for Rational {
    #[inline]
    fn from(value: i32) -> Self {
        Rational::from_integer(value.into())
    }
}

impl From<Integer> for Rational {
    #[inline]
    fn from(value: Integer) -> Self {
        Rational::from_integer(value)
    }
}

impl From<(i64, i64)> for Rational {
    #[inline]
    fn from(value: (i64, i64)) -> Self {
        Rational::new(value.0.into(), value.1.into())
    }
}

impl Rational {
    /// Create a normalized rational number.
    ///
    /// # Panics
    ///
    /// Panics when the denominator is zero.
    pub fn new(mut numerator: Integer, mut denominator: Integer) -> Rational {
        if denominator.is_zero() {
            panic!("Zero denominator in rational number");
        }

        let g = numerator.gcd(&denominator);
        if !g.is_one() {
            numerator = numerator.quot_rem(&g).0;
            denominator = denominator.quot_rem(&g).0;
        }

        if denominator.is_negative() {
            numerator = -numerator;
            denominator = -denominator;
        }

        Rational {
            numerator,
            denominator,
        }
    }

    #[inline]
    pub fn from_integer(numerator: Integer) -> Rational {
        Rational {
            numerator,
            denominator: Integer::one(),
        }
    }

    #[inline]
    pub fn zero() -> Rational {
        Rational::from_integer(Integer::zero())
    }

    #[inline]
    pub fn one() -> Rational {
        Rational::from_integer(Integer::one())
    }

    pub fn numerator(&self) -> &Integer {
        &self.numerator
    }

    pub fn denominator(&self) -> &Integer {
        &self.denominator
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.numerator.is_one() && self.denominator.is_one()
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        self.denominator.is_one()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }

    pub fn abs(&self) -> Rational {
        Rational {
            numerator: self.numerator.abs(),
            denominator: self.denominator.clone(),
        }
    }

    /// Compute the inverse.
    ///
    /// # Panics
    ///
    /// Panics when `self` is zero.
    pub fn inv(&self) -> Rational {
        Rational::new(self.denominator.clone(), self.numerator.clone())
    }

    pub fn pow(&self, e: u64) -> Rational {
        Rational {
            numerator: self.numerator.pow(e),
            denominator: self.denominator.pow(e),
        }
    }

    /// The gcd of the numerators over the lcm of the denominators.
    pub fn gcd(&self, other: &Rational) -> Rational {
        if self.is_zero() {
            return other.abs();
        }
        if other.is_zero() {
            return self.abs();
        }

        Rational {
            numerator: self.numerator.gcd(&other.numerator),
            denominator: self.denominator.lcm(&other.denominator),
        }
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        if self.denominator.is_one() {
            self.numerator.fmt(f)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl FromStr for Rational {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |_| ParseNumberError::InvalidRational(s.to_string());

        match s.split_once('/') {
            Some((n, d)) => {
                let n: Integer = n.parse().map_err(invalid)?;
                let d: Integer = d.parse().map_err(invalid)?;
                if d.is_zero() {
                    return Err(ParseNumberError::ZeroDenominator(s.to_string()));
                }
                Ok(Rational::new(n, d))
            }
            None => Ok(Rational::from_integer(s.parse().map_err(invalid)?)),
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.denominator == other.denominator {
            return self.numerator.cmp(&other.numerator);
        }

        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

impl<'a> Add<&'a Rational> for &'a Rational {
    type Output = Rational;

    fn add(self, rhs: &'a Rational) -> Rational {
        if self.denominator == rhs.denominator {
            return Rational::new(&self.numerator + &rhs.numerator, self.denominator.clone());
        }

        Rational::new(
            &(&self.numerator * &rhs.denominator) + &(&rhs.numerator * &self.denominator),
            &self.denominator * &rhs.denominator,
        )
    }
}

impl<'a> Sub<&'a Rational> for &'a Rational {
    type Output = Rational;

    fn sub(self, rhs: &'a Rational) -> Rational {
        self + &-rhs
    }
}

impl<'a> Mul<&'a Rational> for &'a Rational {
    type Output = Rational;

    fn mul(self, rhs: &'a Rational) -> Rational {
        if self.is_integer() && rhs.is_integer() {
            return Rational::from_integer(&self.numerator * &rhs.numerator);
        }

        Rational::new(
            &self.numerator * &rhs.numerator,
            &self.denominator * &rhs.denominator,
        )
    }
}

impl<'a> Div<&'a Rational> for &'a Rational {
    type Output = Rational;

    fn div(self, rhs: &'a Rational) -> Rational {
        Rational::new(
            &self.numerator * &rhs.denominator,
            &self.denominator * &rhs.numerator,
        )
    }
}

impl<'a> Neg for &'a Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }
}

impl Ring for RationalField {
    type Element = Rational;

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
        Rational::zero()
    }

    #[inline]
    fn one(&self) -> Self::Element {
        Rational::one()
    }

    #[inline]
    fn nth(&self, n: i64) -> Self::Element {
        n.into()
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
        false
    }

    fn is_integer(&self, a: &Self::Element) -> bool {
        a.is_integer()
    }

    fn try_inv(&self, a: &Self::Element) -> Option<Self::Element> {
        if a.is_zero() {
            None
        } else {
            Some(a.inv())
        }
    }

    fn try_div(&self, a: &Self::Element, b: &Self::Element) -> Option<Self::Element> {
        if b.is_zero() {
            None
        } else {
            Some(a / b)
        }
    }
}

impl EuclideanDomain for RationalField {
    fn rem(&self, _: &Self::Element, _: &Self::Element) -> Self::Element {
        Rational::zero()
    }

    fn quot_rem(&self, a: &Self::Element, b: &Self::Element) -> (Self::Element, Self::Element) {
        (a / b, Rational::zero())
    }

    fn gcd(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a.gcd(b)
    }

    fn normalization_factor(&self, a: &Self::Element) -> Self::Element {
        a.inv()
    }
}

impl Field for RationalField {
    #[inline]
    fn div(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a / b
    }

    #[inline]
    fn div_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = &*a / b;
    }

    #[inline]
    fn inv(&self, a: &Self::Element) -> Self::Element {
        a.inv()
    }
}

impl OrderedRing for RationalField {
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

#[cfg(test)]
mod test {
    use super::{Rational, RationalField, Q};
    use crate::domains::{
        integer::{Integer, ParseNumberError},
        EuclideanDomain, Field, Ring,
    };

    #[test]
    fn normalization() {
        let a = Rational::from((6, -4));
        assert_eq!(a.numerator(), &Integer::new(-3));
        assert_eq!(a.denominator(), &Integer::new(2));
        assert_eq!(a, Rational::from((-3, 2)));
    }

    #[test]
    fn arithmetic() {
        let a = Rational::from((1, 2));
        let b = Rational::from((1, 3));
        assert_eq!(Q.add(&a, &b), Rational::from((5, 6)));
        assert_eq!(Q.sub(&a, &b), Rational::from((1, 6)));
        assert_eq!(Q.mul(&a, &b), Rational::from((1, 6)));
        assert_eq!(Q.div(&a, &b), Rational::from((3, 2)));
        assert_eq!(Q.pow(&a, 3), Rational::from((1, 8)));
        assert!(RationalField::is_zero(&Q.sub(&a, &a)));
        assert_eq!(Q.try_inv(&Q.zero()), None);
    }

    #[test]
    fn content_gcd() {
        let a = Rational::from((4, 3));
        let b = Rational::from((6, 5));
        assert_eq!(Q.gcd(&a, &b), Rational::from((2, 15)));
        assert_eq!(Q.normalization_factor(&a), Rational::from((3, 4)));
    }

    #[test]
    fn parse() {
        assert_eq!("-3/6".parse::<Rational>(), Ok(Rational::from((-1, 2))));
        assert_eq!("7".parse::<Rational>(), Ok(Rational::from(7)));
        assert_eq!(Rational::from((-1, 2)).to_string(), "-1/2");
        assert!(matches!(
            "1/0".parse::<Rational>(),
            Err(ParseNumberError::ZeroDenominator(_))
        ));
        assert!("a/2".parse::<Rational>().is_err());
    }
}
