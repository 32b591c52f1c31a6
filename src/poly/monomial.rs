use std::cell::RefCell;
use std::cmp::Ordering;
use std::hash::{BuildHasher, Hash, Hasher};
use std::ops::Deref;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use ahash::{HashMap, HashMapExt, RandomState};
use once_cell::sync::Lazy;
use smallvec::SmallVec;
use tracing::debug;

use super::{cmp_lex, DivisionError, VarExp, INLINED_EXPONENTS};
use crate::state::Variable;

/// Fixed seeds, so that the structural hash of a monomial does not depend on the pool
/// or on the run.
static MONOMIAL_HASHER: Lazy<RandomState> = Lazy::new(|| {
    RandomState::with_seeds(
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    )
});

static POOL_COUNTER: AtomicUsize = AtomicUsize::new(0);

const DEFAULT_PRUNE_THRESHOLD: usize = 1024;

type Exponents = SmallVec<[VarExp; INLINED_EXPONENTS]>;

/// A product of variables raised to positive powers, stored as pairs sorted
/// by strictly increasing variable id.
///
/// Monomials are only created by a [MonomialPool], so that two monomials from
/// the same pool are structurally equal iff they are the same object.
#[derive(Debug)]
pub struct Monomial {
    pairs: Exponents,
    total_degree: u32,
    hash: u64,
    pool_id: usize,
}

impl Monomial {
    #[inline]
    pub fn pairs(&self) -> &[VarExp] {
        &self.pairs
    }

    #[inline]
    pub fn total_degree(&self) -> u32 {
        self.total_degree
    }

    /// The number of distinct variables.
    #[inline]
    pub fn nvars(&self) -> usize {
        self.pairs.len()
    }

    /// The exponent of `var`, which is zero when the variable does not occur.
    pub fn exponent(&self, var: Variable) -> u32 {
        match self.pairs.binary_search_by(|(v, _)| v.cmp(&var)) {
            Ok(i) => self.pairs[i].1,
            Err(_) => 0,
        }
    }

    #[inline]
    pub fn has(&self, var: Variable) -> bool {
        self.pairs.binary_search_by(|(v, _)| v.cmp(&var)).is_ok()
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.pairs.iter().map(|(v, _)| *v)
    }

    #[inline]
    pub fn is_linear(&self) -> bool {
        self.total_degree == 1
    }

    /// Check if all exponents are even.
    pub fn is_square(&self) -> bool {
        self.pairs.iter().all(|(_, e)| e % 2 == 0)
    }

    /// Get the only variable of the monomial.
    ///
    /// # Panics
    ///
    /// Panics when the monomial has more than one variable.
    pub fn single_variable(&self) -> Variable {
        if self.pairs.len() != 1 {
            panic!("Monomial has {} variables instead of 1", self.pairs.len());
        }
        self.pairs[0].0
    }

    /// Check if no variable other than `var` occurs.
    pub fn has_no_other_variable(&self, var: Variable) -> bool {
        self.pairs.len() == 1 && self.pairs[0].0 == var
    }

    /// Check if `self` divides `other`.
    pub fn divides(&self, other: &Monomial) -> bool {
        if self.pairs.len() > other.pairs.len() || self.total_degree > other.total_degree {
            return false;
        }

        let mut j = 0;
        for (v, e) in &self.pairs {
            while j < other.pairs.len() && other.pairs[j].0 < *v {
                j += 1;
            }
            if j == other.pairs.len() || other.pairs[j].0 != *v || other.pairs[j].1 < *e {
                return false;
            }
            j += 1;
        }
        true
    }

    /// Compare by total degree first and lexicographically afterwards.
    pub fn cmp_graded(&self, other: &Monomial) -> Ordering {
        match self.total_degree.cmp(&other.total_degree) {
            Ordering::Equal => cmp_lex(&self.pairs, &other.pairs),
            o => o,
        }
    }
}

/// A shared handle to an interned [Monomial].
///
/// Equality is identity, which coincides with structural equality for
/// monomials of the same pool. The hash is structural and stable.
#[derive(Clone, Debug)]
pub struct MonomialRef(Rc<Monomial>);

impl MonomialRef {
    /// The number of live handles to this monomial.
    pub fn handle_count(this: &MonomialRef) -> usize {
        Rc::strong_count(&this.0)
    }
}

impl Deref for MonomialRef {
    type Target = Monomial;

    #[inline]
    fn deref(&self) -> &Monomial {
        &self.0
    }
}

impl PartialEq for MonomialRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MonomialRef {}

impl Hash for MonomialRef {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

struct PoolInner {
    id: usize,
    map: HashMap<Exponents, Weak<Monomial>>,
    prune_threshold: usize,
    next_prune: usize,
}

impl PoolInner {
    fn prune(&mut self) -> usize {
        let before = self.map.len();
        self.map.retain(|_, m| m.strong_count() > 0);
        self.next_prune = self.prune_threshold.max(2 * self.map.len());
        before - self.map.len()
    }
}

/// An interning table for monomials.
///
/// The pool only holds weak references: a monomial lives as long as a term
/// refers to it, and dead entries are pruned when the table grows or when
/// [MonomialPool::prune] is called. Cloning a pool yields a handle to the same
/// table. A pool and its monomials must stay on one thread.
#[derive(Clone)]
pub struct MonomialPool {
    inner: Rc<RefCell<PoolInner>>,
}

impl Default for MonomialPool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MonomialPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MonomialPool")
            .field("id", &inner.id)
            .field("entries", &inner.map.len())
            .finish()
    }
}

impl MonomialPool {
    pub fn new() -> MonomialPool {
        Self::with_prune_threshold(DEFAULT_PRUNE_THRESHOLD)
    }

    /// Create a pool that prunes dead entries once the table holds `threshold` entries.
    pub fn with_prune_threshold(threshold: usize) -> MonomialPool {
        let threshold = threshold.max(1);
        MonomialPool {
            inner: Rc::new(RefCell::new(PoolInner {
                id: POOL_COUNTER.fetch_add(1, AtomicOrdering::Relaxed),
                map: HashMap::new(),
                prune_threshold: threshold,
                next_prune: threshold,
            })),
        }
    }

    /// Check if two handles refer to the same pool.
    #[inline]
    pub fn ptr_eq(&self, other: &MonomialPool) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Check if a monomial was created by this pool.
    #[inline]
    pub fn owns(&self, m: &Monomial) -> bool {
        m.pool_id == self.inner.borrow().id
    }

    #[inline]
    fn check_owned(&self, m: &Monomial) {
        if !self.owns(m) {
            panic!("Monomial belongs to a different pool");
        }
    }

    /// Get the canonical monomial for a normalized list of pairs.
    ///
    /// # Panics
    ///
    /// Panics when the list is empty, not sorted by strictly increasing variable, or
    /// contains a zero exponent.
    pub fn intern(&self, pairs: &[VarExp]) -> MonomialRef {
        if pairs.is_empty() {
            panic!("Cannot intern the empty monomial");
        }
        if pairs.iter().any(|(_, e)| *e == 0) {
            panic!("Cannot intern a monomial with a zero exponent");
        }
        if pairs.windows(2).any(|w| w[0].0 >= w[1].0) {
            panic!("Monomial variables are not strictly increasing");
        }

        self.intern_unchecked(pairs.into())
    }

    fn intern_unchecked(&self, pairs: Exponents) -> MonomialRef {
        let mut inner = self.inner.borrow_mut();

        if let Some(m) = inner.map.get(&pairs).and_then(|w| w.upgrade()) {
            return MonomialRef(m);
        }

        let total_degree = pairs.iter().map(|(_, e)| *e).sum();
        let mut hasher = MONOMIAL_HASHER.build_hasher();
        pairs.hash(&mut hasher);

        let m = Rc::new(Monomial {
            pairs: pairs.clone(),
            total_degree,
            hash: hasher.finish(),
            pool_id: inner.id,
        });
        inner.map.insert(pairs, Rc::downgrade(&m));

        if inner.map.len() >= inner.next_prune {
            let removed = inner.prune();
            debug!("Pruned {} dead monomials, {} remain", removed, inner.map.len());
        }

        MonomialRef(m)
    }

    /// Create a monomial from arbitrary pairs: the pairs are sorted, exponents
    /// of repeated variables are added and zero exponents are dropped.
    /// Returns `None` for the constant monomial.
    pub fn create<I: IntoIterator<Item = VarExp>>(&self, pairs: I) -> Option<MonomialRef> {
        let mut pairs: Exponents = pairs.into_iter().filter(|(_, e)| *e > 0).collect();
        pairs.sort_by_key(|(v, _)| *v);
        pairs.dedup_by(|b, a| {
            if a.0 == b.0 {
                a.1 += b.1;
                true
            } else {
                false
            }
        });

        if pairs.is_empty() {
            None
        } else {
            Some(self.intern_unchecked(pairs))
        }
    }

    /// Get `var^exp`, or `None` when `exp` is zero.
    pub fn variable(&self, var: Variable, exp: u32) -> Option<MonomialRef> {
        if exp == 0 {
            None
        } else {
            Some(self.intern_unchecked(SmallVec::from_slice(&[(var, exp)])))
        }
    }

    /// Remove `var` from the monomial.
    ///
    /// # Panics
    ///
    /// Panics when `var` does not occur in `m`.
    pub fn drop_variable(&self, m: &MonomialRef, var: Variable) -> Option<MonomialRef> {
        self.check_owned(m);
        if !m.has(var) {
            panic!("Variable {} does not occur in the monomial", var);
        }

        let pairs: Exponents = m.pairs.iter().filter(|(v, _)| *v != var).cloned().collect();
        if pairs.is_empty() {
            None
        } else {
            Some(self.intern_unchecked(pairs))
        }
    }

    /// Lower the exponent of `var` by one.
    ///
    /// # Panics
    ///
    /// Panics when `var` does not occur in `m`.
    pub fn decrement(&self, m: &MonomialRef, var: Variable) -> Option<MonomialRef> {
        self.check_owned(m);
        let pos = match m.pairs.binary_search_by(|(v, _)| v.cmp(&var)) {
            Ok(p) => p,
            Err(_) => panic!("Variable {} does not occur in the monomial", var),
        };

        let mut pairs = m.pairs.clone();
        if pairs[pos].1 == 1 {
            pairs.remove(pos);
        } else {
            pairs[pos].1 -= 1;
        }

        if pairs.is_empty() {
            None
        } else {
            Some(self.intern_unchecked(pairs))
        }
    }

    /// Multiply two monomials by merging their pairs.
    pub fn mul(&self, a: &MonomialRef, b: &MonomialRef) -> MonomialRef {
        self.check_owned(a);
        self.check_owned(b);

        let mut pairs = Exponents::with_capacity(a.pairs.len() + b.pairs.len());
        let (mut i, mut j) = (0, 0);
        while i < a.pairs.len() && j < b.pairs.len() {
            let (x, y) = (a.pairs[i], b.pairs[j]);
            match x.0.cmp(&y.0) {
                Ordering::Less => {
                    pairs.push(x);
                    i += 1;
                }
                Ordering::Greater => {
                    pairs.push(y);
                    j += 1;
                }
                Ordering::Equal => {
                    pairs.push((x.0, x.1 + y.1));
                    i += 1;
                    j += 1;
                }
            }
        }
        pairs.extend_from_slice(&a.pairs[i..]);
        pairs.extend_from_slice(&b.pairs[j..]);

        self.intern_unchecked(pairs)
    }

    /// Multiply two optional monomials, where `None` is the constant monomial.
    pub fn mul_opt(&self, a: Option<&MonomialRef>, b: Option<&MonomialRef>) -> Option<MonomialRef> {
        match (a, b) {
            (None, None) => None,
            (Some(m), None) | (None, Some(m)) => Some(m.clone()),
            (Some(a), Some(b)) => Some(self.mul(a, b)),
        }
    }

    /// Raise a monomial to the power `e`.
    pub fn pow(&self, m: &MonomialRef, e: u32) -> Option<MonomialRef> {
        self.check_owned(m);
        match e {
            0 => None,
            1 => Some(m.clone()),
            _ => Some(self.intern_unchecked(
                m.pairs.iter().map(|(v, x)| (*v, x * e)).collect(),
            )),
        }
    }

    /// Divide `a` by `b`. The result is `None` when the quotient is constant.
    pub fn div(&self, a: &MonomialRef, b: &MonomialRef) -> Result<Option<MonomialRef>, DivisionError> {
        self.check_owned(a);
        self.check_owned(b);

        if a == b {
            return Ok(None);
        }
        if !b.divides(a) {
            return Err(DivisionError::NotDivisible);
        }

        let mut pairs = Exponents::with_capacity(a.pairs.len());
        let mut j = 0;
        for (v, e) in &a.pairs {
            if j < b.pairs.len() && b.pairs[j].0 == *v {
                if *e > b.pairs[j].1 {
                    pairs.push((*v, e - b.pairs[j].1));
                }
                j += 1;
            } else {
                pairs.push((*v, *e));
            }
        }

        if pairs.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.intern_unchecked(pairs)))
        }
    }

    /// Divide two optional monomials, where `None` is the constant monomial.
    pub fn div_opt(
        &self,
        a: Option<&MonomialRef>,
        b: Option<&MonomialRef>,
    ) -> Result<Option<MonomialRef>, DivisionError> {
        match (a, b) {
            (a, None) => Ok(a.cloned()),
            (None, Some(_)) => Err(DivisionError::NotDivisible),
            (Some(a), Some(b)) => self.div(a, b),
        }
    }

    /// Compute the greatest common divisor, which is `None` when the monomials
    /// share no variable.
    pub fn gcd(&self, a: &MonomialRef, b: &MonomialRef) -> Option<MonomialRef> {
        self.check_owned(a);
        self.check_owned(b);

        if a == b {
            return Some(a.clone());
        }

        let mut pairs = Exponents::new();
        let (mut i, mut j) = (0, 0);
        while i < a.pairs.len() && j < b.pairs.len() {
            let (x, y) = (a.pairs[i], b.pairs[j]);
            match x.0.cmp(&y.0) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    pairs.push((x.0, x.1.min(y.1)));
                    i += 1;
                    j += 1;
                }
            }
        }

        if pairs.is_empty() {
            None
        } else {
            Some(self.intern_unchecked(pairs))
        }
    }

    /// Compute the least common multiple.
    pub fn lcm(&self, a: &MonomialRef, b: &MonomialRef) -> MonomialRef {
        self.check_owned(a);
        self.check_owned(b);

        if a == b {
            return a.clone();
        }

        let mut pairs = Exponents::with_capacity(a.pairs.len() + b.pairs.len());
        let (mut i, mut j) = (0, 0);
        while i < a.pairs.len() && j < b.pairs.len() {
            let (x, y) = (a.pairs[i], b.pairs[j]);
            match x.0.cmp(&y.0) {
                Ordering::Less => {
                    pairs.push(x);
                    i += 1;
                }
                Ordering::Greater => {
                    pairs.push(y);
                    j += 1;
                }
                Ordering::Equal => {
                    pairs.push((x.0, x.1.max(y.1)));
                    i += 1;
                    j += 1;
                }
            }
        }
        pairs.extend_from_slice(&a.pairs[i..]);
        pairs.extend_from_slice(&b.pairs[j..]);

        self.intern_unchecked(pairs)
    }

    /// Compute the derivative of `m` with respect to `var` as the pair of the
    /// integer factor and the remaining monomial. The factor is zero when
    /// `var` does not occur.
    pub fn derivative_factor(&self, m: &MonomialRef, var: Variable) -> (u32, Option<MonomialRef>) {
        let e = m.exponent(var);
        if e == 0 {
            (0, None)
        } else {
            (e, self.decrement(m, var))
        }
    }

    /// The number of live monomials in the pool.
    pub fn len(&self) -> usize {
        self.inner
            .borrow()
            .map
            .values()
            .filter(|m| m.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a live monomial with the given normalized pairs exists.
    pub fn contains(&self, pairs: &[VarExp]) -> bool {
        self.inner
            .borrow()
            .map
            .get(pairs)
            .map(|m| m.strong_count() > 0)
            .unwrap_or(false)
    }

    /// Remove the entries of monomials that are no longer referenced,
    /// returning the number of removed entries.
    pub fn prune(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        let removed = inner.prune();
        debug!("Pruned {} dead monomials, {} remain", removed, inner.map.len());
        removed
    }
}
