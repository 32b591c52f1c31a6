//! Coefficient domains for polynomials.
//!
//! A domain is described by a (usually zero-sized) ring object that
//! performs the arithmetic on its [Ring::Element]s. Polynomials and terms
//! are generic over such a ring.

pub mod finite_field;
pub mod integer;
pub mod rational;

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::Hash;

pub trait Ring: Clone + PartialEq + Eq + Hash + Debug + Display {
    type Element: Clone + PartialEq + Eq + Hash + Debug + Display;

    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element);
    fn sub_assign(&self, a: &mut Self::Element, b: &Self::Element);
    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element);
    fn neg(&self, a: &Self::Element) -> Self::Element;
    fn zero(&self) -> Self::Element;
    fn one(&self) -> Self::Element;
    /// The image of the integer `n` in the ring.
    fn nth(&self, n: i64) -> Self::Element;
    fn pow(&self, b: &Self::Element, e: u64) -> Self::Element;
    fn is_zero(a: &Self::Element) -> bool;
    fn is_one(&self, a: &Self::Element) -> bool;
    /// Returns `true` when the gcd of two elements is one as soon as one of them is one.
    /// This is false for fields like the rationals, where the gcd is a content.
    fn one_is_gcd_unit() -> bool;
    /// Check if the element is the image of an integer.
    fn is_integer(&self, a: &Self::Element) -> bool;
    /// Return the multiplicative inverse of `a` if `a` is a unit.
    fn try_inv(&self, a: &Self::Element) -> Option<Self::Element>;
    /// Divide `a` by `b` if the division is exact.
    fn try_div(&self, a: &Self::Element, b: &Self::Element) -> Option<Self::Element>;
}

pub trait EuclideanDomain: Ring {
    fn rem(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn quot_rem(&self, a: &Self::Element, b: &Self::Element) -> (Self::Element, Self::Element);
    fn gcd(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    fn lcm(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        if Self::is_zero(a) || Self::is_zero(b) {
            return self.zero();
        }

        let g = self.gcd(a, b);
        let (q, _) = self.quot_rem(a, &g);
        let l = self.mul(&q, b);
        self.mul(&l, &self.normalization_factor(&l))
    }

    /// Get the unit that normalizes the element `a`.
    /// - For a field, this is the inverse of `a`.
    /// - For the integers, this is the sign of `a`.
    fn normalization_factor(&self, a: &Self::Element) -> Self::Element;
}

pub trait Field: EuclideanDomain {
    fn div(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn div_assign(&self, a: &mut Self::Element, b: &Self::Element);
    fn inv(&self, a: &Self::Element) -> Self::Element;
}

/// A ring with a total order that is compatible with its arithmetic.
pub trait OrderedRing: Ring {
    fn cmp(&self, a: &Self::Element, b: &Self::Element) -> Ordering;

    fn is_negative(&self, a: &Self::Element) -> bool {
        self.cmp(a, &self.zero()) == Ordering::Less
    }

    fn is_positive(&self, a: &Self::Element) -> bool {
        self.cmp(a, &self.zero()) == Ordering::Greater
    }

    fn abs(&self, a: &Self::Element) -> Self::Element {
        if self.is_negative(a) {
            self.neg(a)
        } else {
            a.clone()
        }
    }
}
