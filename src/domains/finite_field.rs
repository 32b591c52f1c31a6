use std::fmt::{Display, Formatter};

use crate::utils;

use super::{EuclideanDomain, Field, Ring};

/// A number in a finite field, stored as its representative in `[0, p)`.
///
/// Elements can only be created by a [Zp], which reduces them.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct FiniteFieldElement(u64);

impl Display for FiniteFieldElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The finite field `Z/pZ` for a prime `p < 2^63`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Zp {
    p: u64,
}

impl Zp {
    /// Create the field `Z/pZ`. The caller must guarantee that `p` is prime.
    ///
    /// # Panics
    ///
    /// Panics when `p < 2` or `p >= 2^63`.
    pub fn new(p: u64) -> Zp {
        if p < 2 || p > i64::MAX as u64 {
            panic!("Modulus {} is not supported", p);
        }
        Zp { p }
    }

    #[inline]
    pub fn get_prime(&self) -> u64 {
        self.p
    }

    /// Map an integer into the field.
    #[inline]
    pub fn to_element(&self, n: i64) -> FiniteFieldElement {
        FiniteFieldElement(n.rem_euclid(self.p as i64) as u64)
    }

    /// Get the representative in `[0, p)`.
    #[inline]
    pub fn from_element(&self, a: &FiniteFieldElement) -> u64 {
        a.0
    }

    /// Get the symmetric representative in `(-p/2, p/2]`.
    #[inline]
    pub fn to_symmetric_integer(&self, a: &FiniteFieldElement) -> i64 {
        if a.0 > self.p / 2 {
            a.0 as i64 - self.p as i64
        } else {
            a.0 as i64
        }
    }
}

impl Display for Zp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Z_{}", self.p)
    }
}

impl Ring for Zp {
    type Element = FiniteFieldElement;

    #[inline]
    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        let t = a.0 + b.0;
        if t >= self.p {
            FiniteFieldElement(t - self.p)
        } else {
            FiniteFieldElement(t)
        }
    }

    #[inline]
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        if a.0 >= b.0 {
            FiniteFieldElement(a.0 - b.0)
        } else {
            FiniteFieldElement(a.0 + (self.p - b.0))
        }
    }

    #[inline]
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        FiniteFieldElement(((a.0 as u128 * b.0 as u128) % self.p as u128) as u64)
    }

    #[inline]
    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.add(a, b);
    }

    #[inline]
    fn sub_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.sub(a, b);
    }

    #[inline]
    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.mul(a, b);
    }

    #[inline]
    fn neg(&self, a: &Self::Element) -> Self::Element {
        if a.0 == 0 {
            *a
        } else {
            FiniteFieldElement(self.p - a.0)
        }
    }

    #[inline]
    fn zero(&self) -> Self::Element {
        FiniteFieldElement(0)
    }

    #[inline]
    fn one(&self) -> Self::Element {
        FiniteFieldElement(1)
    }

    #[inline]
    fn nth(&self, n: i64) -> Self::Element {
        self.to_element(n)
    }

    #[inline]
    fn pow(&self, b: &Self::Element, e: u64) -> Self::Element {
        FiniteFieldElement(utils::pow_mod(b.0, e, self.p))
    }

    #[inline]
    fn is_zero(a: &Self::Element) -> bool {
        a.0 == 0
    }

    #[inline]
    fn is_one(&self, a: &Self::Element) -> bool {
        a.0 == 1
    }

    fn one_is_gcd_unit() -> bool {
        true
    }

    fn is_integer(&self, _a: &Self::Element) -> bool {
        true
    }

    fn try_inv(&self, a: &Self::Element) -> Option<Self::Element> {
        if a.0 == 0 {
            None
        } else {
            Some(self.inv(a))
        }
    }

    fn try_div(&self, a: &Self::Element, b: &Self::Element) -> Option<Self::Element> {
        self.try_inv(b).map(|i| self.mul(a, &i))
    }
}

impl EuclideanDomain for Zp {
    fn rem(&self, _: &Self::Element, _: &Self::Element) -> Self::Element {
        self.zero()
    }

    fn quot_rem(&self, a: &Self::Element, b: &Self::Element) -> (Self::Element, Self::Element) {
        (self.div(a, b), self.zero())
    }

    fn gcd(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        if a.0 == 0 && b.0 == 0 {
            self.zero()
        } else {
            self.one()
        }
    }

    fn normalization_factor(&self, a: &Self::Element) -> Self::Element {
        self.inv(a)
    }
}

impl Field for Zp {
    #[inline]
    fn div(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        self.mul(a, &self.inv(b))
    }

    #[inline]
    fn div_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.div(a, b);
    }

    /// Compute the inverse using Fermat's little theorem.
    ///
    /// # Panics
    ///
    /// Panics when `a` is zero.
    #[inline]
    fn inv(&self, a: &Self::Element) -> Self::Element {
        if a.0 == 0 {
            panic!("Division by 0 in {}", self);
        }
        FiniteFieldElement(utils::pow_mod(a.0, self.p - 2, self.p))
    }
}

#[cfg(test)]
mod test {
    use super::Zp;
    use crate::domains::{Field, Ring};
    use crate::poly::monomial::MonomialPool;
    use crate::poly::polynomial::PolynomialRing;

    #[test]
    fn arithmetic() {
        let f = Zp::new(7);
        let e = |n| f.to_element(n);
        assert_eq!(f.add(&e(5), &e(4)), e(2));
        assert_eq!(f.sub(&e(2), &e(5)), e(4));
        assert_eq!(f.mul(&e(3), &e(5)), e(1));
        assert_eq!(f.neg(&e(3)), e(4));
        assert_eq!(f.nth(-1), e(6));
        assert_eq!(f.inv(&e(3)), e(5));
        assert_eq!(f.div(&e(1), &e(3)), e(5));
        assert_eq!(f.try_inv(&e(0)), None);
        assert_eq!(f.to_symmetric_integer(&e(6)), -1);
        assert_eq!(f.from_element(&e(-8)), 6);
        assert_eq!(e(6).to_string(), "6");
    }

    #[test]
    fn elements_are_reduced() {
        let f = Zp::new(5);
        assert_eq!(f.to_element(7), f.to_element(2));
        assert_eq!(f.nth(-3), f.to_element(2));
        assert!(Zp::is_zero(&f.to_element(5)));

        let ring = PolynomialRing::new(f, MonomialPool::new());
        assert_eq!(ring.constant(f.to_element(7)), ring.constant(f.to_element(2)));
        assert!(ring.constant(f.to_element(5)).is_zero());

        let d = &ring.constant(f.one()) - &ring.constant(f.to_element(7));
        assert_eq!(d, ring.constant(f.to_element(4)));
    }
}
