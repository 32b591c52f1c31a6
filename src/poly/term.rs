use std::collections::BTreeSet;

use ahash::HashMap;

use super::monomial::MonomialRef;
use super::polynomial::PolynomialRing;
use super::var_info::VariablesInformation;
use super::{DivisionError, MonomialOrder};
use crate::domains::{OrderedRing, Ring};
use crate::state::Variable;

/// The sign behaviour of an expression over all real assignments of its variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Definiteness {
    Negative,
    NegativeSemi,
    Indefinite,
    PositiveSemi,
    Positive,
}

/// A coefficient multiplied by an optional monomial, where an absent
/// monomial means the term is constant.
///
/// A term with a zero coefficient never carries a monomial.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Term<R: Ring> {
    pub coefficient: R::Element,
    pub monomial: Option<MonomialRef>,
}

impl<R: Ring> Term<R> {
    /// Create a new term. The monomial is dropped when the coefficient is zero.
    #[inline]
    pub fn new(coefficient: R::Element, monomial: Option<MonomialRef>) -> Term<R> {
        if R::is_zero(&coefficient) {
            Term {
                coefficient,
                monomial: None,
            }
        } else {
            Term {
                coefficient,
                monomial,
            }
        }
    }

    #[inline]
    pub fn zero(ring: &R) -> Term<R> {
        Term::constant(ring.zero())
    }

    #[inline]
    pub fn constant(coefficient: R::Element) -> Term<R> {
        Term {
            coefficient,
            monomial: None,
        }
    }

    /// Create the term `var`.
    pub fn variable<O: MonomialOrder>(var: Variable, ring: &PolynomialRing<R, O>) -> Term<R> {
        Term {
            coefficient: ring.ring.one(),
            monomial: ring.pool.variable(var, 1),
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        R::is_zero(&self.coefficient)
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.monomial.is_none()
    }

    pub fn is_one(&self, ring: &R) -> bool {
        self.monomial.is_none() && ring.is_one(&self.coefficient)
    }

    pub fn is_linear(&self) -> bool {
        self.monomial.as_ref().map(|m| m.is_linear()).unwrap_or(true)
    }

    pub fn total_degree(&self) -> u32 {
        self.monomial.as_ref().map(|m| m.total_degree()).unwrap_or(0)
    }

    /// The exponent of `var` in the term.
    pub fn degree(&self, var: Variable) -> u32 {
        self.monomial.as_ref().map(|m| m.exponent(var)).unwrap_or(0)
    }

    pub fn has(&self, var: Variable) -> bool {
        self.monomial.as_ref().map(|m| m.has(var)).unwrap_or(false)
    }

    pub fn nvars(&self) -> usize {
        self.monomial.as_ref().map(|m| m.nvars()).unwrap_or(0)
    }

    /// Check if the term has no variable other than `var`.
    pub fn has_no_other_variable(&self, var: Variable) -> bool {
        self.monomial
            .as_ref()
            .map(|m| m.has_no_other_variable(var))
            .unwrap_or(true)
    }

    /// Get the variable of a term of the form `c*x^e`.
    ///
    /// # Panics
    ///
    /// Panics when the term is constant or has several variables.
    pub fn single_variable(&self) -> Variable {
        match &self.monomial {
            Some(m) => m.single_variable(),
            None => panic!("Constant term has no variable"),
        }
    }

    pub fn gather_variables(&self, vars: &mut BTreeSet<Variable>) {
        if let Some(m) = &self.monomial {
            vars.extend(m.variables());
        }
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut vars = BTreeSet::new();
        self.gather_variables(&mut vars);
        vars
    }

    pub fn gather_var_info<O: MonomialOrder>(
        &self,
        info: &mut VariablesInformation<R, O>,
        ring: &PolynomialRing<R, O>,
    ) {
        if let Some(m) = &self.monomial {
            for &(v, e) in m.pairs() {
                info.variable_in_term(v, e, self, ring);
            }
        }
    }

    pub fn neg(&self, ring: &R) -> Term<R> {
        Term {
            coefficient: ring.neg(&self.coefficient),
            monomial: self.monomial.clone(),
        }
    }

    pub fn mul_coeff(&self, c: &R::Element, ring: &R) -> Term<R> {
        Term::new(ring.mul(&self.coefficient, c), self.monomial.clone())
    }

    pub fn mul_monomial<O: MonomialOrder>(
        &self,
        m: Option<&MonomialRef>,
        ring: &PolynomialRing<R, O>,
    ) -> Term<R> {
        if self.is_zero() {
            return self.clone();
        }
        Term {
            coefficient: self.coefficient.clone(),
            monomial: ring.pool.mul_opt(self.monomial.as_ref(), m),
        }
    }

    /// Multiply the term by `var^exp`.
    pub fn mul_var<O: MonomialOrder>(
        &self,
        var: Variable,
        exp: u32,
        ring: &PolynomialRing<R, O>,
    ) -> Term<R> {
        self.mul_monomial(ring.pool.variable(var, exp).as_ref(), ring)
    }

    pub fn mul<O: MonomialOrder>(&self, other: &Term<R>, ring: &PolynomialRing<R, O>) -> Term<R> {
        let coefficient = ring.ring.mul(&self.coefficient, &other.coefficient);
        if R::is_zero(&coefficient) {
            return Term::constant(coefficient);
        }

        Term {
            coefficient,
            monomial: ring
                .pool
                .mul_opt(self.monomial.as_ref(), other.monomial.as_ref()),
        }
    }

    /// Divide the coefficient by `c`.
    pub fn div_coeff(&self, c: &R::Element, ring: &R) -> Result<Term<R>, DivisionError> {
        let inv = ring
            .try_inv(c)
            .ok_or(DivisionError::NonInvertibleCoefficient)?;
        Ok(Term::new(ring.mul(&self.coefficient, &inv), self.monomial.clone()))
    }

    /// Divide by `var`, which must occur in the term.
    pub fn div_var<O: MonomialOrder>(
        &self,
        var: Variable,
        ring: &PolynomialRing<R, O>,
    ) -> Result<Term<R>, DivisionError> {
        match &self.monomial {
            Some(m) if m.has(var) => Ok(Term {
                coefficient: self.coefficient.clone(),
                monomial: ring.pool.decrement(m, var),
            }),
            _ if self.is_zero() => Ok(self.clone()),
            _ => Err(DivisionError::NotDivisible),
        }
    }

    pub fn div_monomial<O: MonomialOrder>(
        &self,
        m: Option<&MonomialRef>,
        ring: &PolynomialRing<R, O>,
    ) -> Result<Term<R>, DivisionError> {
        if self.is_zero() {
            return Ok(self.clone());
        }
        Ok(Term {
            coefficient: self.coefficient.clone(),
            monomial: ring.pool.div_opt(self.monomial.as_ref(), m)?,
        })
    }

    /// Divide by another term. The coefficient division must be exact.
    ///
    /// # Panics
    ///
    /// Panics when `other` is zero.
    pub fn div_term<O: MonomialOrder>(
        &self,
        other: &Term<R>,
        ring: &PolynomialRing<R, O>,
    ) -> Result<Term<R>, DivisionError> {
        if other.is_zero() {
            panic!("Cannot divide by a zero term");
        }
        if self.is_zero() {
            return Ok(self.clone());
        }

        let monomial = ring
            .pool
            .div_opt(self.monomial.as_ref(), other.monomial.as_ref())?;
        let coefficient = ring
            .ring
            .try_div(&self.coefficient, &other.coefficient)
            .ok_or(DivisionError::NotDivisible)?;

        Ok(Term {
            coefficient,
            monomial,
        })
    }

    /// Compute `lcm(self.monomial, m) / self.monomial`, keeping the coefficient.
    pub fn lcm_div<O: MonomialOrder>(
        &self,
        m: Option<&MonomialRef>,
        ring: &PolynomialRing<R, O>,
    ) -> Term<R> {
        let monomial = match (self.monomial.as_ref(), m) {
            (_, None) => None,
            (None, Some(m)) => Some(m.clone()),
            (Some(a), Some(b)) => {
                let l = ring.pool.lcm(a, b);
                // the lcm is always divisible by a
                ring.pool.div(&l, a).unwrap_or(None)
            }
        };

        Term::new(self.coefficient.clone(), monomial)
    }

    /// Compute the derivative with respect to `var`.
    pub fn derivative<O: MonomialOrder>(&self, var: Variable, ring: &PolynomialRing<R, O>) -> Term<R> {
        let Some(m) = &self.monomial else {
            return Term::constant(ring.ring.zero());
        };

        let (e, rest) = ring.pool.derivative_factor(m, var);
        if e == 0 {
            return Term::constant(ring.ring.zero());
        }

        Term::new(
            ring.ring.mul(&self.coefficient, &ring.ring.nth(e as i64)),
            rest,
        )
    }

    /// Replace variables by values.
    pub fn substitute<O: MonomialOrder>(
        &self,
        values: &HashMap<Variable, R::Element>,
        ring: &PolynomialRing<R, O>,
    ) -> Term<R> {
        let Some(m) = &self.monomial else {
            return self.clone();
        };

        let mut coefficient = self.coefficient.clone();
        let mut rest = Vec::with_capacity(m.nvars());
        for &(v, e) in m.pairs() {
            match values.get(&v) {
                Some(c) => ring.ring.mul_assign(&mut coefficient, &ring.ring.pow(c, e as u64)),
                None => rest.push((v, e)),
            }
        }

        if rest.len() == m.nvars() {
            return self.clone();
        }

        Term::new(coefficient, ring.pool.create(rest))
    }

    /// Replace variables by terms.
    pub fn substitute_terms<O: MonomialOrder>(
        &self,
        values: &HashMap<Variable, Term<R>>,
        ring: &PolynomialRing<R, O>,
    ) -> Term<R> {
        let Some(m) = &self.monomial else {
            return self.clone();
        };

        let mut res = Term::constant(self.coefficient.clone());
        let mut rest = Vec::with_capacity(m.nvars());
        for &(v, e) in m.pairs() {
            match values.get(&v) {
                Some(t) => res = res.mul(&t.pow(e, ring), ring),
                None => rest.push((v, e)),
            }
        }

        res.mul_monomial(ring.pool.create(rest).as_ref(), ring)
    }

    pub fn pow<O: MonomialOrder>(&self, e: u32, ring: &PolynomialRing<R, O>) -> Term<R> {
        Term::new(
            ring.ring.pow(&self.coefficient, e as u64),
            self.monomial.as_ref().and_then(|m| ring.pool.pow(m, e)),
        )
    }
}

impl<R: OrderedRing> Term<R> {
    /// Get the definiteness of the term: a term with an even monomial has the sign
    /// of its coefficient on all assignments, but may vanish.
    pub fn definiteness(&self, ring: &R) -> Definiteness {
        match &self.monomial {
            Some(m) => {
                if m.is_square() {
                    if ring.is_negative(&self.coefficient) {
                        Definiteness::NegativeSemi
                    } else {
                        Definiteness::PositiveSemi
                    }
                } else {
                    Definiteness::Indefinite
                }
            }
            None => {
                if ring.is_negative(&self.coefficient) {
                    Definiteness::Negative
                } else if ring.is_positive(&self.coefficient) {
                    Definiteness::Positive
                } else {
                    Definiteness::Indefinite
                }
            }
        }
    }

    /// Check if the term is a square, i.e., it has a positive coefficient
    /// and only even exponents.
    pub fn is_square(&self, ring: &R) -> bool {
        ring.is_positive(&self.coefficient)
            && self.monomial.as_ref().map(|m| m.is_square()).unwrap_or(true)
    }
}
