use std::collections::btree_map::{self, BTreeMap};

use super::polynomial::{Polynomial, PolynomialRing};
use super::term::Term;
use super::MonomialOrder;
use crate::domains::Ring;
use crate::state::Variable;

/// Statistics about the occurrences of a single variable in a polynomial.
#[derive(Clone, Debug)]
pub struct VariableInformation<R: Ring, O: MonomialOrder> {
    /// The number of terms the variable occurs in.
    pub occurrence: usize,
    pub min_degree: u32,
    pub max_degree: u32,
    /// The coefficient of every power of the variable, if collected.
    pub coefficients: BTreeMap<u32, Polynomial<R, O>>,
}

impl<R: Ring, O: MonomialOrder> VariableInformation<R, O> {
    fn new(exp: u32) -> Self {
        VariableInformation {
            occurrence: 0,
            min_degree: exp,
            max_degree: exp,
            coefficients: BTreeMap::new(),
        }
    }

    /// Get the coefficient of `var^exp`, if `var^exp` occurs.
    pub fn coefficient(&self, exp: u32) -> Option<&Polynomial<R, O>> {
        self.coefficients.get(&exp)
    }
}

/// Information about all variables of a polynomial, ordered by variable.
#[derive(Clone, Debug)]
pub struct VariablesInformation<R: Ring, O: MonomialOrder> {
    variables: BTreeMap<Variable, VariableInformation<R, O>>,
    collect_coefficients: bool,
}

impl<R: Ring, O: MonomialOrder> VariablesInformation<R, O> {
    pub fn new(collect_coefficients: bool) -> Self {
        VariablesInformation {
            variables: BTreeMap::new(),
            collect_coefficients,
        }
    }

    /// Record that `var^exp` occurs in `term`.
    pub fn variable_in_term(
        &mut self,
        var: Variable,
        exp: u32,
        term: &Term<R>,
        ring: &PolynomialRing<R, O>,
    ) {
        let info = self
            .variables
            .entry(var)
            .or_insert_with(|| VariableInformation::new(exp));

        info.occurrence += 1;
        info.min_degree = info.min_degree.min(exp);
        info.max_degree = info.max_degree.max(exp);

        if self.collect_coefficients {
            let rest = match &term.monomial {
                Some(m) => Term {
                    coefficient: term.coefficient.clone(),
                    monomial: ring.pool.drop_variable(m, var),
                },
                None => term.clone(),
            };

            info.coefficients
                .entry(exp)
                .or_insert_with(|| ring.zero())
                .add_term(rest);
        }
    }

    #[inline]
    pub fn has_coefficients(&self) -> bool {
        self.collect_coefficients
    }

    pub fn get(&self, var: Variable) -> Option<&VariableInformation<R, O>> {
        self.variables.get(&var)
    }

    pub fn occurs(&self, var: Variable) -> bool {
        self.variables.contains_key(&var)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Variable, VariableInformation<R, O>> {
        self.variables.iter()
    }
}
