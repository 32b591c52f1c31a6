//! Canonical multivariate polynomials with interned monomials.
//!
//! Monomials are hash-consed in a [MonomialPool](monomial::MonomialPool),
//! so that monomial equality is a pointer comparison. Terms pair a coefficient
//! with an optional shared monomial and polynomials keep their terms sorted
//! in a fixed [MonomialOrder].

pub mod factorized;
pub mod gcd;
pub mod monomial;
pub mod polynomial;
pub mod term;
pub mod var_info;

use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;

use self::monomial::{Monomial, MonomialRef};
use crate::state::Variable;

pub const INLINED_EXPONENTS: usize = 6;

/// A variable together with its exponent in a monomial.
pub type VarExp = (Variable, u32);

/// An error raised by an exact division.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivisionError {
    #[error("coefficient is not invertible")]
    NonInvertibleCoefficient,
    #[error("divisor does not divide the dividend")]
    NotDivisible,
}

/// A total order on monomials that is compatible with multiplication.
pub trait MonomialOrder: Clone + Copy + Debug + Default + PartialEq + Eq + Hash + 'static {
    fn cmp(a: &Monomial, b: &Monomial) -> Ordering;
}

/// Lexicographic ordering of monomials, where the variable with the
/// smallest id is the most significant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LexOrder;

impl MonomialOrder for LexOrder {
    #[inline]
    fn cmp(a: &Monomial, b: &Monomial) -> Ordering {
        cmp_lex(a.pairs(), b.pairs())
    }
}

/// Graded lexicographic ordering of monomials: first by total degree,
/// then lexicographically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GradedLexOrder;

impl MonomialOrder for GradedLexOrder {
    #[inline]
    fn cmp(a: &Monomial, b: &Monomial) -> Ordering {
        a.cmp_graded(b)
    }
}

/// Graded reverse lexicographic ordering of monomials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GrevLexOrder;

impl MonomialOrder for GrevLexOrder {
    fn cmp(a: &Monomial, b: &Monomial) -> Ordering {
        match a.total_degree().cmp(&b.total_degree()) {
            Ordering::Equal => {}
            x => return x,
        }

        let (a, b) = (a.pairs(), b.pairs());
        for (x, y) in a.iter().rev().zip(b.iter().rev()) {
            if x.0 != y.0 {
                // the monomial containing the last variable is smaller
                return if x.0 > y.0 {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
            }

            match x.1.cmp(&y.1) {
                Ordering::Equal => {}
                o => return o.reverse(),
            }
        }

        a.len().cmp(&b.len())
    }
}

pub(crate) fn cmp_lex(a: &[VarExp], b: &[VarExp]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        if x.0 != y.0 {
            return if x.0 < y.0 {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        match x.1.cmp(&y.1) {
            Ordering::Equal => {}
            o => return o,
        }
    }

    a.len().cmp(&b.len())
}

/// Compare two optional monomials, where an absent monomial is the constant
/// monomial and therefore the smallest.
#[inline]
pub(crate) fn cmp_monomials<O: MonomialOrder>(
    a: Option<&MonomialRef>,
    b: Option<&MonomialRef>,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => {
            if x == y {
                Ordering::Equal
            } else {
                O::cmp(x, y)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use super::{monomial::MonomialPool, GradedLexOrder, GrevLexOrder, LexOrder, MonomialOrder};
    use crate::state::{State, VariableDomain};

    #[test]
    fn orders() {
        let x = State::fresh_variable(None, VariableDomain::Real);
        let y = State::fresh_variable(None, VariableDomain::Real);
        let z = State::fresh_variable(None, VariableDomain::Real);
        let pool = MonomialPool::new();

        let xz = pool.intern(&[(x, 1), (z, 1)]);
        let y2 = pool.intern(&[(y, 2)]);
        let x = pool.intern(&[(x, 1)]);

        assert_eq!(LexOrder::cmp(&xz, &y2), Ordering::Greater);
        assert_eq!(GradedLexOrder::cmp(&xz, &y2), Ordering::Greater);
        assert_eq!(GrevLexOrder::cmp(&xz, &y2), Ordering::Less);

        assert_eq!(LexOrder::cmp(&x, &y2), Ordering::Greater);
        assert_eq!(GradedLexOrder::cmp(&x, &y2), Ordering::Less);
        assert_eq!(LexOrder::cmp(&xz, &x), Ordering::Greater);
    }
}
