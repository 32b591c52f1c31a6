use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Add, Mul, Neg, Sub};

use ahash::HashMap;

use super::monomial::{MonomialPool, MonomialRef};
use super::term::{Definiteness, Term};
use super::var_info::VariablesInformation;
use super::{cmp_monomials, DivisionError, GradedLexOrder, MonomialOrder, VarExp};
use crate::domains::{EuclideanDomain, OrderedRing, Ring};
use crate::state::Variable;

/// The context of a polynomial: its coefficient ring and the pool its
/// monomials are interned in.
#[derive(Clone, Debug)]
pub struct PolynomialRing<R: Ring, O: MonomialOrder = GradedLexOrder> {
    pub ring: R,
    pub pool: MonomialPool,
    _order: PhantomData<O>,
}

impl<R: Ring, O: MonomialOrder> PartialEq for PolynomialRing<R, O> {
    fn eq(&self, other: &Self) -> bool {
        self.ring == other.ring && self.pool.ptr_eq(&other.pool)
    }
}

impl<R: Ring, O: MonomialOrder> Eq for PolynomialRing<R, O> {}

impl<R: Ring> PolynomialRing<R> {
    /// Create a polynomial ring with the default graded lexicographic order.
    pub fn new(ring: R, pool: MonomialPool) -> PolynomialRing<R> {
        PolynomialRing::with_order(ring, pool)
    }
}

impl<R: Ring, O: MonomialOrder> PolynomialRing<R, O> {
    pub fn with_order(ring: R, pool: MonomialPool) -> PolynomialRing<R, O> {
        PolynomialRing {
            ring,
            pool,
            _order: PhantomData,
        }
    }

    pub fn zero(&self) -> Polynomial<R, O> {
        Polynomial {
            terms: vec![],
            ring: self.clone(),
        }
    }

    pub fn one(&self) -> Polynomial<R, O> {
        self.constant(self.ring.one())
    }

    pub fn constant(&self, coeff: R::Element) -> Polynomial<R, O> {
        self.from_term(Term::constant(coeff))
    }

    pub fn variable(&self, var: Variable) -> Polynomial<R, O> {
        self.from_term(Term::variable(var, self))
    }

    /// Create the term `coeff * prod v^e` from arbitrary pairs.
    pub fn term<I: IntoIterator<Item = VarExp>>(&self, coeff: R::Element, pairs: I) -> Term<R> {
        if R::is_zero(&coeff) {
            return Term::constant(coeff);
        }
        Term::new(coeff, self.pool.create(pairs))
    }

    pub fn from_term(&self, term: Term<R>) -> Polynomial<R, O> {
        Polynomial {
            terms: if term.is_zero() { vec![] } else { vec![term] },
            ring: self.clone(),
        }
    }

    /// Create a polynomial from terms in any order. Terms with the same monomial are merged.
    pub fn from_terms(&self, terms: Vec<Term<R>>) -> Polynomial<R, O> {
        let mut terms = terms;
        terms.retain(|t| !t.is_zero());
        terms.sort_by(|a, b| cmp_monomials::<O>(a.monomial.as_ref(), b.monomial.as_ref()));

        let mut res: Vec<Term<R>> = Vec::with_capacity(terms.len());
        for t in terms {
            if let Some(last) = res.last_mut() {
                if last.monomial == t.monomial {
                    self.ring.add_assign(&mut last.coefficient, &t.coefficient);
                    continue;
                }
            }
            res.push(t);
        }
        res.retain(|t| !t.is_zero());

        Polynomial {
            terms: res,
            ring: self.clone(),
        }
    }
}

/// A multivariate polynomial in canonical form: its terms are sorted
/// ascendingly in the order `O`, have pairwise distinct monomials and nonzero
/// coefficients. The leading term is the last term.
#[derive(Clone)]
pub struct Polynomial<R: Ring, O: MonomialOrder = GradedLexOrder> {
    terms: Vec<Term<R>>,
    pub ring: PolynomialRing<R, O>,
}

impl<R: Ring, O: MonomialOrder> Polynomial<R, O> {
    /// Create the zero polynomial.
    pub fn new(ring: &PolynomialRing<R, O>) -> Self {
        ring.zero()
    }

    pub fn from_terms(terms: Vec<Term<R>>, ring: &PolynomialRing<R, O>) -> Self {
        ring.from_terms(terms)
    }

    #[inline]
    pub fn zero(&self) -> Self {
        self.ring.zero()
    }

    #[inline]
    pub fn one(&self) -> Self {
        self.ring.one()
    }

    #[inline]
    pub fn constant(&self, coeff: R::Element) -> Self {
        self.ring.constant(coeff)
    }

    #[inline]
    pub fn variable(&self, var: Variable) -> Self {
        self.ring.variable(var)
    }

    #[inline]
    fn with_terms(&self, terms: Vec<Term<R>>) -> Self {
        Polynomial {
            terms,
            ring: self.ring.clone(),
        }
    }

    /// Get the terms in ascending order.
    #[inline]
    pub fn terms(&self) -> &[Term<R>] {
        &self.terms
    }

    #[inline]
    pub fn into_terms(self) -> Vec<Term<R>> {
        self.terms
    }

    #[inline]
    pub fn nterms(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.terms.len() == 1 && self.terms[0].is_one(&self.ring.ring)
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty() || (self.terms.len() == 1 && self.terms[0].is_constant())
    }

    pub fn is_linear(&self) -> bool {
        self.terms.iter().all(|t| t.is_linear())
    }

    /// Get the coefficient of the constant term.
    pub fn constant_coefficient(&self) -> R::Element {
        match self.terms.first() {
            Some(t) if t.is_constant() => t.coefficient.clone(),
            _ => self.ring.ring.zero(),
        }
    }

    /// Get the coefficient of the term with monomial `m`.
    pub fn coefficient(&self, m: Option<&MonomialRef>) -> R::Element {
        match self
            .terms
            .binary_search_by(|t| cmp_monomials::<O>(t.monomial.as_ref(), m))
        {
            Ok(i) => self.terms[i].coefficient.clone(),
            Err(_) => self.ring.ring.zero(),
        }
    }

    /// Get the leading term.
    #[inline]
    pub fn lterm(&self) -> Option<&Term<R>> {
        self.terms.last()
    }

    /// Get the leading coefficient, which is zero for the zero polynomial.
    pub fn lcoeff(&self) -> R::Element {
        match self.terms.last() {
            Some(t) => t.coefficient.clone(),
            None => self.ring.ring.zero(),
        }
    }

    /// Get the leading monomial.
    pub fn lmonomial(&self) -> Option<&MonomialRef> {
        self.terms.last().and_then(|t| t.monomial.as_ref())
    }

    /// Get the trailing (smallest) term.
    #[inline]
    pub fn trailing_term(&self) -> Option<&Term<R>> {
        self.terms.first()
    }

    pub fn total_degree(&self) -> u32 {
        self.terms.iter().map(|t| t.total_degree()).max().unwrap_or(0)
    }

    /// Get the highest exponent of `var`.
    pub fn degree(&self, var: Variable) -> u32 {
        self.terms.iter().map(|t| t.degree(var)).max().unwrap_or(0)
    }

    /// Get the lowest exponent of `var`.
    pub fn ldegree(&self, var: Variable) -> u32 {
        self.terms.iter().map(|t| t.degree(var)).min().unwrap_or(0)
    }

    pub fn has(&self, var: Variable) -> bool {
        self.terms.iter().any(|t| t.has(var))
    }

    pub fn gather_variables(&self, vars: &mut BTreeSet<Variable>) {
        for t in &self.terms {
            t.gather_variables(vars);
        }
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut vars = BTreeSet::new();
        self.gather_variables(&mut vars);
        vars
    }

    /// Check if at most one variable occurs.
    pub fn is_univariate(&self) -> bool {
        let mut var = None;
        for t in &self.terms {
            if let Some(m) = &t.monomial {
                if m.nvars() > 1 {
                    return false;
                }
                let v = m.single_variable();
                if *var.get_or_insert(v) != v {
                    return false;
                }
            }
        }
        true
    }

    /// Collect the occurrences, degree bounds and optionally the coefficients of every variable.
    pub fn gather_var_info(&self, collect_coefficients: bool) -> VariablesInformation<R, O> {
        let mut info = VariablesInformation::new(collect_coefficients);
        for t in &self.terms {
            t.gather_var_info(&mut info, &self.ring);
        }
        info
    }

    /// Check the canonical form invariants.
    pub fn is_canonical(&self) -> bool {
        self.terms.iter().all(|t| {
            !t.is_zero() && t.monomial.as_ref().map(|m| self.ring.pool.owns(m)).unwrap_or(true)
        }) && self.terms.windows(2).all(|w| {
            cmp_monomials::<O>(w[0].monomial.as_ref(), w[1].monomial.as_ref()) == Ordering::Less
        })
    }

    #[inline]
    fn check_ring(&self, other: &Self) {
        if self.ring != other.ring {
            panic!("Polynomials do not share the same ring and monomial pool");
        }
    }

    /// Add a single term in place.
    pub fn add_term(&mut self, term: Term<R>) {
        if term.is_zero() {
            return;
        }

        match self
            .terms
            .binary_search_by(|t| cmp_monomials::<O>(t.monomial.as_ref(), term.monomial.as_ref()))
        {
            Ok(i) => {
                self.ring
                    .ring
                    .add_assign(&mut self.terms[i].coefficient, &term.coefficient);
                if self.terms[i].is_zero() {
                    self.terms.remove(i);
                }
            }
            Err(i) => self.terms.insert(i, term),
        }
    }

    /// Merge the sorted term lists of `self` and `other`, negating `other` if `negate` is set.
    fn merge(&self, other: &Self, negate: bool) -> Self {
        self.check_ring(other);
        let ring = &self.ring.ring;

        let mut terms = Vec::with_capacity(self.terms.len() + other.terms.len());
        let (mut i, mut j) = (0, 0);
        while i < self.terms.len() && j < other.terms.len() {
            let (a, b) = (&self.terms[i], &other.terms[j]);
            match cmp_monomials::<O>(a.monomial.as_ref(), b.monomial.as_ref()) {
                Ordering::Less => {
                    terms.push(a.clone());
                    i += 1;
                }
                Ordering::Greater => {
                    terms.push(if negate { b.neg(ring) } else { b.clone() });
                    j += 1;
                }
                Ordering::Equal => {
                    let c = if negate {
                        ring.sub(&a.coefficient, &b.coefficient)
                    } else {
                        ring.add(&a.coefficient, &b.coefficient)
                    };
                    if !R::is_zero(&c) {
                        terms.push(Term {
                            coefficient: c,
                            monomial: a.monomial.clone(),
                        });
                    }
                    i += 1;
                    j += 1;
                }
            }
        }

        terms.extend_from_slice(&self.terms[i..]);
        if negate {
            terms.extend(other.terms[j..].iter().map(|t| t.neg(ring)));
        } else {
            terms.extend_from_slice(&other.terms[j..]);
        }

        self.with_terms(terms)
    }

    /// Multiply by a monomial, where `None` is the constant monomial.
    pub fn mul_monomial(&self, m: Option<&MonomialRef>) -> Self {
        if m.is_none() {
            return self.clone();
        }
        self.with_terms(
            self.terms
                .iter()
                .map(|t| t.mul_monomial(m, &self.ring))
                .collect(),
        )
    }

    pub fn mul_var(&self, var: Variable, exp: u32) -> Self {
        self.mul_monomial(self.ring.pool.variable(var, exp).as_ref())
    }

    pub fn mul_coeff(&self, c: &R::Element) -> Self {
        if R::is_zero(c) {
            return self.zero();
        }
        let ring = &self.ring.ring;
        self.with_terms(
            self.terms
                .iter()
                .map(|t| t.mul_coeff(c, ring))
                .filter(|t| !t.is_zero())
                .collect(),
        )
    }

    pub fn mul_term(&self, term: &Term<R>) -> Self {
        if term.is_zero() {
            return self.zero();
        }
        self.with_terms(
            self.terms
                .iter()
                .map(|t| t.mul(term, &self.ring))
                .filter(|t| !t.is_zero())
                .collect(),
        )
    }

    /// Divide all coefficients by `c`, which must be a unit.
    pub fn div_coeff(&self, c: &R::Element) -> Result<Self, DivisionError> {
        let ring = &self.ring.ring;
        let inv = ring
            .try_inv(c)
            .ok_or(DivisionError::NonInvertibleCoefficient)?;
        Ok(self.mul_coeff(&inv))
    }

    /// Divide every term by `var`.
    pub fn div_var(&self, var: Variable) -> Result<Self, DivisionError> {
        let terms = self
            .terms
            .iter()
            .map(|t| t.div_var(var, &self.ring))
            .collect::<Result<_, _>>()?;
        Ok(self.with_terms(terms))
    }

    /// Divide every term by the monomial `m`.
    pub fn div_monomial(&self, m: Option<&MonomialRef>) -> Result<Self, DivisionError> {
        let terms = self
            .terms
            .iter()
            .map(|t| t.div_monomial(m, &self.ring))
            .collect::<Result<_, _>>()?;
        Ok(self.with_terms(terms))
    }

    /// Divide every term by `term`.
    pub fn div_term(&self, term: &Term<R>) -> Result<Self, DivisionError> {
        let terms = self
            .terms
            .iter()
            .map(|t| t.div_term(term, &self.ring))
            .collect::<Result<_, _>>()?;
        Ok(self.with_terms(terms))
    }

    /// Divide by `div` by repeatedly dividing leading terms. Leading terms of the
    /// dividend that cannot be divided are moved to the remainder.
    ///
    /// # Panics
    ///
    /// Panics when `div` is zero.
    pub fn quot_rem(&self, div: &Self) -> (Self, Self) {
        self.check_ring(div);
        let lt = match div.lterm() {
            Some(t) => t,
            None => panic!("Cannot divide by the zero polynomial"),
        };

        if div.is_one() {
            return (self.clone(), self.zero());
        }

        let mut p = self.clone();
        let mut q = vec![];
        let mut r = vec![];
        while let Some(t) = p.terms.last() {
            match t.div_term(lt, &self.ring) {
                Ok(qt) => {
                    p = &p - &div.mul_term(&qt);
                    q.push(qt);
                }
                Err(_) => {
                    if let Some(t) = p.terms.pop() {
                        r.push(t);
                    }
                }
            }
        }

        (self.ring.from_terms(q), self.ring.from_terms(r))
    }

    /// Return the quotient if `div` divides `self`.
    ///
    /// # Panics
    ///
    /// Panics when `div` is zero.
    pub fn divides(&self, div: &Self) -> Option<Self> {
        let (q, r) = self.quot_rem(div);
        if r.is_zero() {
            Some(q)
        } else {
            None
        }
    }

    pub fn pow(&self, mut e: u32) -> Self {
        if e == 0 {
            return self.one();
        }
        if self.terms.len() == 1 {
            return self.with_terms(vec![self.terms[0].pow(e, &self.ring)]);
        }

        let mut base = self.clone();
        let mut res = self.one();
        while e > 0 {
            if e & 1 == 1 {
                res = &res * &base;
            }
            e >>= 1;
            if e > 0 {
                base = &base * &base;
            }
        }
        res
    }

    /// Compute the derivative with respect to `var`.
    pub fn derivative(&self, var: Variable) -> Self {
        self.ring.from_terms(
            self.terms
                .iter()
                .filter(|t| t.has(var))
                .map(|t| t.derivative(var, &self.ring))
                .collect(),
        )
    }

    /// Replace variables by coefficients.
    pub fn substitute(&self, values: &HashMap<Variable, R::Element>) -> Self {
        self.ring.from_terms(
            self.terms
                .iter()
                .map(|t| t.substitute(values, &self.ring))
                .collect(),
        )
    }

    /// Replace variables by polynomials.
    pub fn substitute_polynomials(&self, values: &HashMap<Variable, Self>) -> Self {
        let mut res = self.zero();
        for t in &self.terms {
            let Some(m) = &t.monomial else {
                res.add_term(t.clone());
                continue;
            };

            let mut rest = vec![];
            let mut prod = self.constant(t.coefficient.clone());
            for &(v, e) in m.pairs() {
                match values.get(&v) {
                    Some(p) => {
                        self.check_ring(p);
                        prod = &prod * &p.pow(e);
                    }
                    None => rest.push((v, e)),
                }
            }

            prod = prod.mul_monomial(self.ring.pool.create(rest).as_ref());
            res = &res + &prod;
        }
        res
    }

    /// Evaluate the polynomial. Returns `None` when a variable has no value.
    pub fn evaluate(&self, values: &HashMap<Variable, R::Element>) -> Option<R::Element> {
        let s = self.substitute(values);
        if s.is_constant() {
            Some(s.constant_coefficient())
        } else {
            None
        }
    }

    /// Get the greatest common divisor of all monomials, which is `None`
    /// when the polynomial is zero or has a constant term.
    pub fn monomial_content(&self) -> Option<MonomialRef> {
        let mut g = self.terms.first()?.monomial.clone()?;
        for t in &self.terms[1..] {
            g = self.ring.pool.gcd(&g, t.monomial.as_ref()?)?;
        }
        Some(g)
    }

    /// Write the polynomial as `sum_i c_i var^i` and return the coefficients `c_i`.
    pub fn to_univariate_coefficients(&self, var: Variable) -> Vec<Self> {
        let mut coeffs = vec![self.zero(); self.degree(var) as usize + 1];
        for t in &self.terms {
            match &t.monomial {
                Some(m) if m.has(var) => {
                    let rest = Term {
                        coefficient: t.coefficient.clone(),
                        monomial: self.ring.pool.drop_variable(m, var),
                    };
                    coeffs[m.exponent(var) as usize].add_term(rest);
                }
                _ => coeffs[0].add_term(t.clone()),
            }
        }
        coeffs
    }

    /// Compute `sum_i coeffs_i var^i`.
    pub fn from_univariate_coefficients(
        coeffs: &[Self],
        var: Variable,
        ring: &PolynomialRing<R, O>,
    ) -> Self {
        let mut terms = vec![];
        for (i, c) in coeffs.iter().enumerate() {
            let m = ring.pool.variable(var, i as u32);
            terms.extend(c.terms.iter().map(|t| t.mul_monomial(m.as_ref(), ring)));
        }
        ring.from_terms(terms)
    }

    /// Convert to a polynomial with a different monomial order.
    pub fn reorder<ON: MonomialOrder>(&self) -> Polynomial<R, ON> {
        let ring = PolynomialRing::with_order(self.ring.ring.clone(), self.ring.pool.clone());
        ring.from_terms(self.terms.clone())
    }
}

impl<R: EuclideanDomain, O: MonomialOrder> Polynomial<R, O> {
    /// Get the gcd of all coefficients.
    pub fn content(&self) -> R::Element {
        let ring = &self.ring.ring;
        let mut c = ring.zero();
        for t in &self.terms {
            c = ring.gcd(&c, &t.coefficient);
            if R::one_is_gcd_unit() && ring.is_one(&c) {
                break;
            }
        }
        c
    }

    /// Divide every coefficient by `c`, which must divide all of them.
    pub fn div_coeff_exact(&self, c: &R::Element) -> Self {
        let ring = &self.ring.ring;
        if ring.is_one(c) {
            return self.clone();
        }

        self.with_terms(
            self.terms
                .iter()
                .map(|t| {
                    let (q, r) = ring.quot_rem(&t.coefficient, c);
                    debug_assert!(R::is_zero(&r), "{} does not divide {}", c, t.coefficient);
                    Term {
                        coefficient: q,
                        monomial: t.monomial.clone(),
                    }
                })
                .collect(),
        )
    }

    /// Divide out the content.
    pub fn primitive_part(&self) -> Self {
        if self.is_zero() {
            return self.clone();
        }
        self.div_coeff_exact(&self.content())
    }

    /// Multiply by the unit that makes the leading coefficient normalized:
    /// one over a field and positive over the integers.
    pub fn normalize(&self) -> Self {
        if self.is_zero() {
            return self.clone();
        }

        let f = self.ring.ring.normalization_factor(&self.lcoeff());
        if self.ring.ring.is_one(&f) {
            self.clone()
        } else {
            self.mul_coeff(&f)
        }
    }
}

impl<R: OrderedRing, O: MonomialOrder> Polynomial<R, O> {
    /// Get the definiteness from the definiteness of the terms.
    pub fn definiteness(&self) -> Definiteness {
        let ring = &self.ring.ring;
        let mut positive = true;
        let mut negative = true;
        let mut strict = false;

        for t in &self.terms {
            match t.definiteness(ring) {
                Definiteness::Positive => {
                    negative = false;
                    strict = true;
                }
                Definiteness::PositiveSemi => negative = false,
                Definiteness::Negative => {
                    positive = false;
                    strict = true;
                }
                Definiteness::NegativeSemi => positive = false,
                Definiteness::Indefinite => return Definiteness::Indefinite,
            }
        }

        match (positive, negative, strict) {
            _ if self.is_zero() => Definiteness::Indefinite,
            (true, false, true) => Definiteness::Positive,
            (true, false, false) => Definiteness::PositiveSemi,
            (false, true, true) => Definiteness::Negative,
            (false, true, false) => Definiteness::NegativeSemi,
            _ => Definiteness::Indefinite,
        }
    }
}

impl<R: Ring, O: MonomialOrder> PartialEq for Polynomial<R, O> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

impl<R: Ring, O: MonomialOrder> Eq for Polynomial<R, O> {}

impl<R: Ring, O: MonomialOrder> Hash for Polynomial<R, O> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.terms.hash(state);
    }
}

impl<R: Ring, O: MonomialOrder> std::fmt::Debug for Polynomial<R, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return write!(f, "[]");
        }
        let mut first = true;
        write!(f, "[ ")?;
        for t in &self.terms {
            if first {
                first = false;
            } else {
                write!(f, ", ")?;
            }
            match &t.monomial {
                Some(m) => write!(
                    f,
                    "{{ {}, {:?} }}",
                    t.coefficient,
                    m.pairs()
                        .iter()
                        .map(|(v, e)| (v.get_id(), *e))
                        .collect::<Vec<_>>()
                )?,
                None => write!(f, "{{ {}, [] }}", t.coefficient)?,
            }
        }
        write!(f, " ]")
    }
}

impl<'a, 'b, R: Ring, O: MonomialOrder> Add<&'a Polynomial<R, O>> for &'b Polynomial<R, O> {
    type Output = Polynomial<R, O>;

    fn add(self, other: &'a Polynomial<R, O>) -> Self::Output {
        self.merge(other, false)
    }
}

impl<R: Ring, O: MonomialOrder> Add for Polynomial<R, O> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        if self.is_zero() {
            self.check_ring(&other);
            return other;
        }
        if other.is_zero() {
            self.check_ring(&other);
            return self;
        }
        self.merge(&other, false)
    }
}

impl<'a, 'b, R: Ring, O: MonomialOrder> Sub<&'a Polynomial<R, O>> for &'b Polynomial<R, O> {
    type Output = Polynomial<R, O>;

    fn sub(self, other: &'a Polynomial<R, O>) -> Self::Output {
        self.merge(other, true)
    }
}

impl<R: Ring, O: MonomialOrder> Sub for Polynomial<R, O> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        self.merge(&other, true)
    }
}

impl<'a, 'b, R: Ring, O: MonomialOrder> Mul<&'a Polynomial<R, O>> for &'b Polynomial<R, O> {
    type Output = Polynomial<R, O>;

    fn mul(self, other: &'a Polynomial<R, O>) -> Self::Output {
        self.check_ring(other);

        if self.is_zero() || other.is_zero() {
            return self.zero();
        }
        if other.terms.len() == 1 {
            return self.mul_term(&other.terms[0]);
        }
        if self.terms.len() == 1 {
            return other.mul_term(&self.terms[0]);
        }

        let mut terms = Vec::with_capacity(self.terms.len() * other.terms.len());
        for a in &self.terms {
            for b in &other.terms {
                terms.push(a.mul(b, &self.ring));
            }
        }
        self.ring.from_terms(terms)
    }
}

impl<R: Ring, O: MonomialOrder> Mul for Polynomial<R, O> {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        &self * &other
    }
}

impl<'a, R: Ring, O: MonomialOrder> Neg for &'a Polynomial<R, O> {
    type Output = Polynomial<R, O>;

    fn neg(self) -> Self::Output {
        let ring = &self.ring.ring;
        self.with_terms(self.terms.iter().map(|t| t.neg(ring)).collect())
    }
}

impl<R: Ring, O: MonomialOrder> Neg for Polynomial<R, O> {
    type Output = Self;

    fn neg(mut self) -> Self::Output {
        for t in &mut self.terms {
            t.coefficient = self.ring.ring.neg(&t.coefficient);
        }
        self
    }
}

#[cfg(test)]
mod test {
    use ahash::HashMap;

    use super::PolynomialRing;
    use crate::domains::integer::{Integer, Z};
    use crate::domains::rational::{Rational, Q};
    use crate::domains::finite_field::Zp;
    use crate::poly::monomial::MonomialPool;
    use crate::poly::term::Definiteness;
    use crate::poly::{DivisionError, LexOrder};
    use crate::state::{State, Variable, VariableDomain};

    fn vars<const N: usize>() -> [Variable; N] {
        [(); N].map(|_| State::fresh_variable(None, VariableDomain::Real))
    }

    #[test]
    fn add_cancels() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());

        let a = ring.from_terms(vec![
            ring.term(1.into(), [(x, 2)]),
            ring.term((-1).into(), [(y, 1)]),
        ]);
        let b = ring.from_terms(vec![
            ring.term(4.into(), [(x, 1)]),
            ring.term(1.into(), [(y, 1)]),
            ring.term((-8).into(), [(y, 7)]),
        ]);

        let c = &a + &b;
        assert_eq!(c.nterms(), 3);
        assert!(c.is_canonical());
        assert_eq!(c.coefficient(ring.pool.create([(y, 1)]).as_ref()), Rational::zero());
        assert_eq!(c.lcoeff(), Rational::from(-8));
        assert_eq!(c.lmonomial(), ring.pool.create([(y, 7)]).as_ref());

        assert!((&c - &c).is_zero());
        assert_eq!(&(&c - &b), &a);
        assert_eq!(-(-c.clone()), c);
    }

    #[test]
    fn from_terms_merges() {
        let [x] = vars();
        let ring = PolynomialRing::new(Z, MonomialPool::new());

        let p = ring.from_terms(vec![
            ring.term(Integer::new(2), [(x, 1)]),
            ring.term(Integer::new(3), []),
            ring.term(Integer::new(-2), [(x, 1)]),
            ring.term(Integer::new(5), [(x, 3)]),
            ring.term(Integer::new(0), [(x, 2)]),
        ]);

        assert_eq!(p.nterms(), 2);
        assert_eq!(p.constant_coefficient(), Integer::new(3));
        assert_eq!(p.degree(x), 3);
        assert_eq!(p.ldegree(x), 0);
        assert!(p.is_canonical());
        assert!(p.is_univariate());
    }

    #[test]
    fn multiplication() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Z, MonomialPool::new());

        let a = &ring.variable(x) + &ring.variable(y);
        let b = &ring.variable(x) - &ring.variable(y);
        let p = &a * &b;

        let expected = &ring.variable(x).pow(2) - &ring.variable(y).pow(2);
        assert_eq!(p, expected);
        assert!(p.is_canonical());
        assert_eq!(a.pow(3).nterms(), 4);
        assert_eq!(a.pow(0), ring.one());
        assert!((&a * &ring.zero()).is_zero());
    }

    #[test]
    fn division() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());

        let a = &ring.variable(x) + &ring.variable(y);
        let b = &(&ring.variable(x) - &ring.variable(y)) + &ring.one();
        let p = &a * &b;

        assert_eq!(p.divides(&a), Some(b.clone()));
        assert_eq!(p.divides(&b), Some(a.clone()));

        let (q, r) = (&p + &ring.variable(y)).quot_rem(&a);
        assert_eq!(q, b);
        assert_eq!(r, ring.variable(y));

        let m = ring.pool.create([(x, 1)]);
        assert_eq!(p.mul_monomial(m.as_ref()).div_monomial(m.as_ref()), Ok(p.clone()));
        assert_eq!(p.div_var(x), Err(DivisionError::NotDivisible));
        assert_eq!(p.div_coeff(&Rational::from(2)).unwrap().mul_coeff(&Rational::from(2)), p);
    }

    #[test]
    fn integer_content() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Z, MonomialPool::new());

        let p = ring.from_terms(vec![
            ring.term(Integer::new(-6), [(x, 2)]),
            ring.term(Integer::new(4), [(y, 1)]),
        ]);

        assert_eq!(p.content(), Integer::new(2));
        let pp = p.primitive_part();
        assert_eq!(pp.content(), Integer::new(1));
        assert_eq!(pp.lcoeff(), Integer::new(-3));
        assert_eq!(pp.normalize().lcoeff(), Integer::new(3));
        assert_eq!(p.div_coeff(&Integer::new(2)), Err(DivisionError::NonInvertibleCoefficient));
    }

    #[test]
    fn derivative_and_substitution() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());

        // 3x^2y + 2x + 5
        let p = ring.from_terms(vec![
            ring.term(3.into(), [(x, 2), (y, 1)]),
            ring.term(2.into(), [(x, 1)]),
            ring.term(5.into(), []),
        ]);

        let d = p.derivative(x);
        let expected = ring.from_terms(vec![
            ring.term(6.into(), [(x, 1), (y, 1)]),
            ring.term(2.into(), []),
        ]);
        assert_eq!(d, expected);
        assert!(p.derivative(State::fresh_variable(None, VariableDomain::Real)).is_zero());

        let mut values = HashMap::default();
        values.insert(x, Rational::from(2));
        values.insert(y, Rational::from(-1));
        assert_eq!(p.evaluate(&values), Some(Rational::from(-3)));

        values.remove(&y);
        assert_eq!(p.evaluate(&values), None);

        let mut polys = HashMap::default();
        polys.insert(x, &ring.variable(y) + &ring.one());
        let s = p.substitute_polynomials(&polys);
        assert_eq!(s.degree(y), 3);
        assert!(!s.has(x));
        values.clear();
        values.insert(y, Rational::from(1));
        assert_eq!(s.evaluate(&values), p.evaluate(&{
            let mut v = HashMap::default();
            v.insert(x, Rational::from(2));
            v.insert(y, Rational::from(1));
            v
        }));
    }

    #[test]
    fn univariate_coefficients() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Z, MonomialPool::new());

        let p = ring.from_terms(vec![
            ring.term(Integer::new(3), [(x, 2), (y, 1)]),
            ring.term(Integer::new(1), [(x, 2)]),
            ring.term(Integer::new(7), [(y, 2)]),
        ]);

        let c = p.to_univariate_coefficients(x);
        assert_eq!(c.len(), 3);
        assert!(c[1].is_zero());
        assert_eq!(c[2].nterms(), 2);
        assert_eq!(super::Polynomial::from_univariate_coefficients(&c, x, &ring), p);
    }

    #[test]
    fn reorder_and_monomial_content() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());

        let p = ring.from_terms(vec![
            ring.term(1.into(), [(x, 1)]),
            ring.term(1.into(), [(y, 3)]),
        ]);
        assert_eq!(p.lmonomial(), ring.pool.create([(y, 3)]).as_ref());

        let lex = p.reorder::<LexOrder>();
        assert_eq!(lex.lmonomial(), ring.pool.create([(x, 1)]).as_ref());
        assert!(lex.is_canonical());

        let q = p.mul_monomial(ring.pool.create([(x, 2), (y, 1)]).as_ref());
        assert_eq!(q.monomial_content(), ring.pool.create([(x, 2), (y, 1)]));
        assert_eq!(p.monomial_content(), None);
        assert_eq!((&p + &ring.one()).monomial_content(), None);
    }

    #[test]
    fn definiteness() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());

        let p = ring.from_terms(vec![
            ring.term(1.into(), [(x, 2)]),
            ring.term(3.into(), [(y, 4)]),
        ]);
        assert_eq!(p.definiteness(), Definiteness::PositiveSemi);
        assert_eq!((&p + &ring.one()).definiteness(), Definiteness::Positive);
        assert_eq!((-&p).definiteness(), Definiteness::NegativeSemi);
        assert_eq!((&p - &ring.one()).definiteness(), Definiteness::Indefinite);
        assert_eq!((&p + &ring.variable(x)).definiteness(), Definiteness::Indefinite);
    }

    #[test]
    fn finite_field() {
        let [x] = vars();
        let f = Zp::new(5);
        let ring = PolynomialRing::new(f, MonomialPool::new());

        let a = ring.from_terms(vec![
            ring.term(f.to_element(3), [(x, 1)]),
            ring.term(f.to_element(1), []),
        ]);
        let b = &a + &a.mul_coeff(&f.to_element(4));
        assert_eq!(b, ring.constant(f.to_element(0)));
        assert!(b.is_zero());
        assert_eq!(a.normalize().lcoeff(), f.to_element(1));
    }

    #[test]
    #[should_panic]
    fn mixed_pools() {
        let [x] = vars();
        let a = PolynomialRing::new(Q, MonomialPool::new()).variable(x);
        let b = PolynomialRing::new(Q, MonomialPool::new()).variable(x);
        let _ = &a + &b;
    }
}
