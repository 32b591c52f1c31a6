//! A cache of partially factored polynomials.
//!
//! Polynomials are stored as nodes in a [FactorizationCache]. A node is either
//! a leaf that holds a normalized polynomial, or a product of other nodes.
//! Extracting common divisors with [FactorizationCache::common_divisor] refines
//! leaves into products of shared sub-nodes, so that repeated gcd computations
//! between related polynomials converge on a small set of shared factors.
//!
//! Handles to nodes are [FactorizedPolynomial]s, which keep the node alive.
//! A node is evicted as soon as its last handle and its last parent are gone.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;

use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace};

use super::polynomial::{Polynomial, PolynomialRing};
use super::{GradedLexOrder, MonomialOrder};
use crate::domains::EuclideanDomain;

/// The index of a node in a [FactorizationCache].
pub type NodeId = usize;

/// A multiset of factors, sorted by node id.
type Factors = SmallVec<[(NodeId, u32); 4]>;

/// An error raised by a gcd computation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcdError {
    #[error("the gcd with a zero operand is undefined")]
    ZeroOperand,
}

/// The refinement state of a cached node. States only move forward:
/// `Unexpanded` and `Expanded` nodes may become `Factored`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// A product of factors whose expansion has not been computed.
    Unexpanded,
    /// A polynomial without known factors.
    Expanded,
    /// A polynomial with known nontrivial factors.
    Factored,
}

impl Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Unexpanded => f.write_str("unexpanded"),
            NodeState::Expanded => f.write_str("expanded"),
            NodeState::Factored => f.write_str("factored"),
        }
    }
}

struct Node<R: EuclideanDomain, O: MonomialOrder> {
    polynomial: Option<Polynomial<R, O>>,
    factors: Factors,
    state: NodeState,
    ref_count: usize,
}

/// A snapshot of a live cache node.
#[derive(Clone, Debug)]
pub struct CacheEntry<R: EuclideanDomain, O: MonomialOrder> {
    pub id: NodeId,
    pub state: NodeState,
    pub ref_count: usize,
    pub polynomial: Option<Polynomial<R, O>>,
    pub factors: Vec<(NodeId, u32)>,
}

struct CacheInner<R: EuclideanDomain, O: MonomialOrder> {
    ring: PolynomialRing<R, O>,
    nodes: Vec<Option<Node<R, O>>>,
    free: Vec<NodeId>,
    by_polynomial: HashMap<Polynomial<R, O>, NodeId>,
    by_factors: HashMap<Factors, NodeId>,
}

impl<R: EuclideanDomain, O: MonomialOrder> CacheInner<R, O> {
    fn node(&self, id: NodeId) -> &Node<R, O> {
        match self.nodes.get(id) {
            Some(Some(n)) => n,
            _ => panic!("Node #{} is not in the cache", id),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<R, O> {
        match self.nodes.get_mut(id) {
            Some(Some(n)) => n,
            _ => panic!("Node #{} is not in the cache", id),
        }
    }

    fn insert(&mut self, node: Node<R, O>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn retain(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.ref_count += 1;
        trace!("Retain #{}: {} references", id, node.ref_count);
    }

    /// Drop a reference and evict the nodes that are no longer referenced.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = self.node_mut(id);
            node.ref_count -= 1;
            trace!("Release #{}: {} references", id, node.ref_count);
            if node.ref_count > 0 {
                continue;
            }

            let Some(node) = self.nodes[id].take() else {
                unreachable!()
            };
            if let Some(p) = &node.polynomial {
                if self.by_polynomial.get(p) == Some(&id) {
                    self.by_polynomial.remove(p);
                }
            }
            if !node.factors.is_empty() && self.by_factors.get(&node.factors) == Some(&id) {
                self.by_factors.remove(&node.factors);
            }
            self.free.push(id);
            trace!("Evict #{}", id);

            stack.extend(node.factors.iter().map(|(f, _)| *f));
        }
    }

    /// Get the node of a normalized polynomial, creating a leaf if there is none.
    /// The reference count is not changed.
    fn intern_polynomial(&mut self, p: Polynomial<R, O>) -> NodeId {
        if let Some(id) = self.by_polynomial.get(&p) {
            return *id;
        }

        let id = self.insert(Node {
            polynomial: Some(p.clone()),
            factors: Factors::new(),
            state: NodeState::Expanded,
            ref_count: 0,
        });
        self.by_polynomial.insert(p, id);
        trace!("Create leaf #{}", id);
        id
    }

    /// Get the node of a product of factors. The reference count is not changed.
    fn product_node(&mut self, factors: &BTreeMap<NodeId, u32>) -> Option<NodeId> {
        if factors.is_empty() {
            return None;
        }
        if factors.len() == 1 {
            if let Some((&id, &1)) = factors.iter().next() {
                return Some(id);
            }
        }

        let factors: Factors = factors.iter().map(|(f, e)| (*f, *e)).collect();
        if let Some(id) = self.by_factors.get(&factors) {
            return Some(*id);
        }

        for (f, _) in &factors {
            self.retain(*f);
        }
        let id = self.insert(Node {
            polynomial: None,
            factors: factors.clone(),
            state: NodeState::Unexpanded,
            ref_count: 0,
        });
        self.by_factors.insert(factors, id);
        trace!("Create product #{}", id);
        Some(id)
    }

    /// Get the factorization of a node into leaves.
    fn flatten(&self, id: NodeId, exp: u32, out: &mut BTreeMap<NodeId, u32>) {
        let node = self.node(id);
        if node.factors.is_empty() {
            *out.entry(id).or_insert(0) += exp;
        } else {
            for (f, e) in &node.factors {
                self.flatten(*f, e * exp, out);
            }
        }
    }

    fn leaves(&self, id: Option<NodeId>) -> BTreeMap<NodeId, u32> {
        let mut out = BTreeMap::new();
        if let Some(id) = id {
            self.flatten(id, 1, &mut out);
        }
        out
    }

    /// Compute the expanded polynomial of a node, memoizing it.
    fn expand(&mut self, id: NodeId) -> Polynomial<R, O> {
        let node = self.node(id);
        if let Some(p) = &node.polynomial {
            return p.clone();
        }

        let factors = node.factors.clone();
        let mut res = self.ring.one();
        for (f, e) in factors {
            let p = self.expand(f);
            res = &res * &p.pow(e);
        }

        let node = self.node_mut(id);
        node.polynomial = Some(res.clone());
        node.state = NodeState::Factored;
        let factors = node.factors.clone();

        // a leaf with the same polynomial learns the factors of the product
        match self.by_polynomial.get(&res).copied() {
            None => {
                self.by_polynomial.insert(res.clone(), id);
            }
            Some(leaf) if leaf != id && self.node(leaf).factors.is_empty() => {
                for (f, _) in &factors {
                    self.retain(*f);
                }
                let node = self.node_mut(leaf);
                node.factors = factors.clone();
                node.state = NodeState::Factored;
                self.by_factors.insert(factors, leaf);
                debug!("Merged product #{} into leaf #{}", id, leaf);
            }
            Some(_) => {}
        }
        res
    }

    fn leaf_polynomial(&self, id: NodeId) -> &Polynomial<R, O> {
        match &self.node(id).polynomial {
            Some(p) => p,
            None => unreachable!("Leaf #{} has no polynomial", id),
        }
    }

    /// Find a pair of leaves with a nontrivial gcd. Pairs that are found to be
    /// coprime are recorded in `coprime` and skipped afterwards.
    fn find_refinable(
        &self,
        a: &BTreeMap<NodeId, u32>,
        b: &BTreeMap<NodeId, u32>,
        coprime: &mut HashSet<(NodeId, NodeId)>,
    ) -> Option<(NodeId, NodeId, Polynomial<R, O>)> {
        for ia in a.keys() {
            let pa = self.leaf_polynomial(*ia);
            for ib in b.keys() {
                let key = (*ia.min(ib), *ia.max(ib));
                if coprime.contains(&key) {
                    continue;
                }

                let g = pa.gcd(self.leaf_polynomial(*ib));
                if !g.is_one() {
                    return Some((*ia, *ib, g));
                }
                coprime.insert(key);
            }
        }
        None
    }

    /// Write the leaf `id` as `g` times a cofactor and return its new leaves.
    fn refine(&mut self, id: NodeId, g: &Polynomial<R, O>) -> BTreeMap<NodeId, u32> {
        let p = self.leaf_polynomial(id);
        if p == g {
            return BTreeMap::from([(id, 1)]);
        }

        let cofactor = p.exact_div(g);
        let gid = self.intern_polynomial(g.clone());
        let cid = self.intern_polynomial(cofactor);

        let factors: Factors = if gid == cid {
            SmallVec::from_slice(&[(gid, 2)])
        } else if gid < cid {
            SmallVec::from_slice(&[(gid, 1), (cid, 1)])
        } else {
            SmallVec::from_slice(&[(cid, 1), (gid, 1)])
        };

        for (f, _) in &factors {
            self.retain(*f);
        }
        self.by_factors.entry(factors.clone()).or_insert(id);

        let node = self.node_mut(id);
        node.factors = factors;
        node.state = NodeState::Factored;
        debug!("Refined #{} into #{} and #{}", id, gid, cid);

        self.leaves(Some(id))
    }

    /// Split the factorizations `a` and `b` into a common part and the rests.
    fn common_divisor(
        &mut self,
        a: Option<NodeId>,
        b: Option<NodeId>,
    ) -> (
        BTreeMap<NodeId, u32>,
        BTreeMap<NodeId, u32>,
        BTreeMap<NodeId, u32>,
    ) {
        let mut ra = self.leaves(a);
        let mut rb = self.leaves(b);
        let mut g = BTreeMap::new();

        split_common(&mut ra, &mut rb, &mut g);

        let mut coprime = HashSet::new();
        while let Some((ia, ib, gcd)) = self.find_refinable(&ra, &rb, &mut coprime) {
            debug!("Common factor of #{} and #{}: {}", ia, ib, gcd);
            let fa = self.refine(ia, &gcd);
            let fb = self.refine(ib, &gcd);
            replace_factor(&mut ra, ia, &fa);
            replace_factor(&mut rb, ib, &fb);
            split_common(&mut ra, &mut rb, &mut g);
        }

        (g, ra, rb)
    }
}

/// Move the factors that occur in both `a` and `b` to `common`.
fn split_common(
    a: &mut BTreeMap<NodeId, u32>,
    b: &mut BTreeMap<NodeId, u32>,
    common: &mut BTreeMap<NodeId, u32>,
) {
    let shared: Vec<_> = a.keys().filter(|k| b.contains_key(k)).cloned().collect();
    for id in shared {
        let e = a[&id].min(b[&id]);
        *common.entry(id).or_insert(0) += e;
        remove_factor(a, id, e);
        remove_factor(b, id, e);
    }
}

fn remove_factor(factors: &mut BTreeMap<NodeId, u32>, id: NodeId, e: u32) {
    if let Some(x) = factors.get_mut(&id) {
        *x -= e;
        if *x == 0 {
            factors.remove(&id);
        }
    }
}

fn replace_factor(
    factors: &mut BTreeMap<NodeId, u32>,
    id: NodeId,
    replacement: &BTreeMap<NodeId, u32>,
) {
    if let Some(e) = factors.remove(&id) {
        for (f, k) in replacement {
            *factors.entry(*f).or_insert(0) += k * e;
        }
    }
}

/// A reference-counted store of polynomials and their known factorizations.
///
/// The cache is a cheap-to-clone handle and must stay on one thread.
pub struct FactorizationCache<R: EuclideanDomain, O: MonomialOrder = GradedLexOrder> {
    inner: Rc<RefCell<CacheInner<R, O>>>,
}

impl<R: EuclideanDomain, O: MonomialOrder> Clone for FactorizationCache<R, O> {
    fn clone(&self) -> Self {
        FactorizationCache {
            inner: self.inner.clone(),
        }
    }
}

impl<R: EuclideanDomain, O: MonomialOrder> FactorizationCache<R, O> {
    pub fn new(ring: &PolynomialRing<R, O>) -> Self {
        FactorizationCache {
            inner: Rc::new(RefCell::new(CacheInner {
                ring: ring.clone(),
                nodes: vec![],
                free: vec![],
                by_polynomial: HashMap::new(),
                by_factors: HashMap::new(),
            })),
        }
    }

    pub fn ring(&self) -> PolynomialRing<R, O> {
        self.inner.borrow().ring.clone()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn handle(&self, coefficient: R::Element, node: Option<NodeId>) -> FactorizedPolynomial<R, O> {
        let node = if R::is_zero(&coefficient) { None } else { node };
        if let Some(id) = node {
            self.inner.borrow_mut().retain(id);
        }
        FactorizedPolynomial {
            coefficient,
            node,
            cache: self.clone(),
        }
    }

    /// Get a handle to the cached form of `p`, creating an entry if needed.
    /// The content and the normalization unit of `p` are kept in the handle,
    /// so that polynomials that only differ by a constant share their entry.
    ///
    /// # Panics
    ///
    /// Panics when `p` belongs to a different polynomial ring.
    pub fn acquire(&self, p: &Polynomial<R, O>) -> FactorizedPolynomial<R, O> {
        let mut inner = self.inner.borrow_mut();
        if p.ring != inner.ring {
            panic!("Polynomial does not belong to the ring of the cache");
        }

        let ring = &inner.ring.ring;
        if p.is_zero() {
            let zero = ring.zero();
            drop(inner);
            return self.handle(zero, None);
        }

        // split off the content and the normalization unit
        let content = p.content();
        let primitive = p.div_coeff_exact(&content);
        let factor = ring.normalization_factor(&primitive.lcoeff());
        let unit = match ring.try_inv(&factor) {
            Some(u) => u,
            None => unreachable!("normalization factor {} is not a unit", factor),
        };
        let coefficient = ring.mul(&content, &unit);
        let normalized = primitive.mul_coeff(&factor);

        let node = if normalized.is_one() {
            None
        } else {
            Some(inner.intern_polynomial(normalized))
        };
        drop(inner);

        trace!("Acquire {:?}", node);
        self.handle(coefficient, node)
    }

    /// Create a constant handle.
    pub fn constant(&self, c: R::Element) -> FactorizedPolynomial<R, O> {
        self.handle(c, None)
    }

    /// Compute a common divisor `g` of `a` and `b` with the cofactors `a/g` and `b/g`.
    ///
    /// Shared factors are matched by identity first. Afterwards, leaf factors
    /// of `a` and `b` that have a nontrivial gcd are refined in the cache into
    /// products of the gcd and their cofactors, until the cofactors have no
    /// common leaf and no pair of leaves with a nontrivial gcd remains.
    ///
    /// # Panics
    ///
    /// Panics when `a` or `b` belongs to a different cache.
    pub fn common_divisor(
        &self,
        a: &FactorizedPolynomial<R, O>,
        b: &FactorizedPolynomial<R, O>,
    ) -> Result<
        (
            FactorizedPolynomial<R, O>,
            FactorizedPolynomial<R, O>,
            FactorizedPolynomial<R, O>,
        ),
        GcdError,
    > {
        if !self.ptr_eq(&a.cache) || !self.ptr_eq(&b.cache) {
            panic!("Factorized polynomials belong to a different cache");
        }
        if a.is_zero() || b.is_zero() {
            return Err(GcdError::ZeroOperand);
        }

        let (coeffs, nodes) = {
            let mut inner = self.inner.borrow_mut();
            let ring = inner.ring.ring.clone();

            let cg = ring.gcd(&a.coefficient, &b.coefficient);
            let ca = ring.quot_rem(&a.coefficient, &cg).0;
            let cb = ring.quot_rem(&b.coefficient, &cg).0;

            let (g, ra, rb) = inner.common_divisor(a.node, b.node);
            let nodes = (
                inner.product_node(&g),
                inner.product_node(&ra),
                inner.product_node(&rb),
            );
            ((cg, ca, cb), nodes)
        };

        Ok((
            self.handle(coeffs.0, nodes.0),
            self.handle(coeffs.1, nodes.1),
            self.handle(coeffs.2, nodes.2),
        ))
    }

    /// The number of live entries.
    pub fn len(&self) -> usize {
        self.inner.borrow().nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the reference count of the entry of the normalized form of `p`,
    /// which is zero when there is no such entry.
    pub fn ref_count(&self, p: &Polynomial<R, O>) -> usize {
        let inner = self.inner.borrow();
        match inner.by_polynomial.get(&p.primitive_part().normalize()) {
            Some(id) => inner.node(*id).ref_count,
            None => 0,
        }
    }

    /// Check if the normalized form of `p` has an entry.
    pub fn contains(&self, p: &Polynomial<R, O>) -> bool {
        self.inner
            .borrow()
            .by_polynomial
            .contains_key(&p.primitive_part().normalize())
    }

    /// Get a snapshot of all live entries, ordered by id.
    pub fn entries(&self) -> Vec<CacheEntry<R, O>> {
        let inner = self.inner.borrow();
        inner
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(id, n)| {
                n.as_ref().map(|n| CacheEntry {
                    id,
                    state: n.state,
                    ref_count: n.ref_count,
                    polynomial: n.polynomial.clone(),
                    factors: n.factors.to_vec(),
                })
            })
            .collect()
    }
}

impl<R: EuclideanDomain, O: MonomialOrder> Display for FactorizationCache<R, O> {
    /// Print every live entry with its state and reference count.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in self.entries() {
            write!(f, "#{} [{}, refs={}]: ", e.id, e.state, e.ref_count)?;
            if e.factors.is_empty() {
                if let Some(p) = &e.polynomial {
                    write!(f, "{}", p)?;
                }
            } else {
                for (i, (id, exp)) in e.factors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("*")?;
                    }
                    if *exp == 1 {
                        write!(f, "#{}", id)?;
                    } else {
                        write!(f, "#{}^{}", id, exp)?;
                    }
                }
                if let Some(p) = &e.polynomial {
                    write!(f, " = {}", p)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A handle to a polynomial in a [FactorizationCache]: a coefficient times the
/// normalized polynomial of a node. Cloning retains the node and dropping
/// releases it.
pub struct FactorizedPolynomial<R: EuclideanDomain, O: MonomialOrder = GradedLexOrder> {
    coefficient: R::Element,
    node: Option<NodeId>,
    cache: FactorizationCache<R, O>,
}

impl<R: EuclideanDomain, O: MonomialOrder> Clone for FactorizedPolynomial<R, O> {
    fn clone(&self) -> Self {
        self.cache.handle(self.coefficient.clone(), self.node)
    }
}

impl<R: EuclideanDomain, O: MonomialOrder> Drop for FactorizedPolynomial<R, O> {
    fn drop(&mut self) {
        if let Some(id) = self.node {
            trace!("Drop handle to #{}", id);
            self.cache.inner.borrow_mut().release(id);
        }
    }
}

impl<R: EuclideanDomain, O: MonomialOrder> FactorizedPolynomial<R, O> {
    #[inline]
    pub fn coefficient(&self) -> &R::Element {
        &self.coefficient
    }

    #[inline]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    #[inline]
    pub fn cache(&self) -> &FactorizationCache<R, O> {
        &self.cache
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        R::is_zero(&self.coefficient)
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.node.is_none()
    }

    pub fn is_one(&self) -> bool {
        self.node.is_none() && self.cache.inner.borrow().ring.ring.is_one(&self.coefficient)
    }

    /// The state of the node, or `None` for constants.
    pub fn node_state(&self) -> Option<NodeState> {
        self.node.map(|id| self.cache.inner.borrow().node(id).state)
    }

    /// The reference count of the node, or zero for constants.
    pub fn ref_count(&self) -> usize {
        self.node
            .map(|id| self.cache.inner.borrow().node(id).ref_count)
            .unwrap_or(0)
    }

    /// Compute the expanded polynomial.
    pub fn polynomial(&self) -> Polynomial<R, O> {
        let mut inner = self.cache.inner.borrow_mut();
        let p = match self.node {
            Some(id) => inner.expand(id),
            None => inner.ring.one(),
        };
        p.mul_coeff(&self.coefficient)
    }

    /// Get the known factorization into normalized leaf polynomials.
    pub fn factors(&self) -> Vec<(Polynomial<R, O>, u32)> {
        let inner = self.cache.inner.borrow();
        inner
            .leaves(self.node)
            .into_iter()
            .map(|(id, e)| (inner.leaf_polynomial(id).clone(), e))
            .collect()
    }

    /// See [FactorizationCache::common_divisor].
    pub fn common_divisor(&self, other: &Self) -> Result<(Self, Self, Self), GcdError> {
        self.cache.common_divisor(self, other)
    }

    /// Compute a common divisor with `other`.
    pub fn gcd(&self, other: &Self) -> Result<Self, GcdError> {
        Ok(self.common_divisor(other)?.0)
    }

    fn check_cache(&self, other: &Self) {
        if !self.cache.ptr_eq(&other.cache) {
            panic!("Factorized polynomials belong to a different cache");
        }
    }

    pub fn pow(&self, e: u32) -> Self {
        let ring = self.cache.ring();
        if e == 0 {
            return self.cache.constant(ring.ring.one());
        }

        let coefficient = ring.ring.pow(&self.coefficient, e as u64);
        let node = {
            let mut inner = self.cache.inner.borrow_mut();
            let mut leaves = inner.leaves(self.node);
            for x in leaves.values_mut() {
                *x *= e;
            }
            inner.product_node(&leaves)
        };
        self.cache.handle(coefficient, node)
    }

    fn add_impl(&self, other: &Self, negate: bool) -> Self {
        self.check_cache(other);
        let ring = self.cache.ring();

        if other.is_zero() {
            return self.clone();
        }
        if self.is_zero() {
            return if negate { -other } else { other.clone() };
        }

        let (g, ra, rb) = match self.common_divisor(other) {
            Ok(r) => r,
            Err(_) => unreachable!("operands are nonzero"),
        };

        let (pa, pb) = (ra.polynomial(), rb.polynomial());
        let sum = if negate { &pa - &pb } else { &pa + &pb };
        if sum.is_zero() {
            return self.cache.constant(ring.ring.zero());
        }

        &g * &self.cache.acquire(&sum)
    }
}

impl<R: EuclideanDomain, O: MonomialOrder> PartialEq for FactorizedPolynomial<R, O> {
    fn eq(&self, other: &Self) -> bool {
        if !self.cache.ptr_eq(&other.cache) || self.coefficient != other.coefficient {
            return false;
        }
        match (self.node, other.node) {
            (None, None) => true,
            (Some(a), Some(b)) if a == b => true,
            (Some(_), Some(_)) => self.polynomial() == other.polynomial(),
            _ => false,
        }
    }
}

impl<R: EuclideanDomain, O: MonomialOrder> Eq for FactorizedPolynomial<R, O> {}

impl<R: EuclideanDomain, O: MonomialOrder> fmt::Debug for FactorizedPolynomial<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactorizedPolynomial")
            .field("coefficient", &self.coefficient)
            .field("node", &self.node)
            .finish()
    }
}

impl<'a, 'b, R: EuclideanDomain, O: MonomialOrder> Mul<&'a FactorizedPolynomial<R, O>>
    for &'b FactorizedPolynomial<R, O>
{
    type Output = FactorizedPolynomial<R, O>;

    fn mul(self, other: &'a FactorizedPolynomial<R, O>) -> Self::Output {
        self.check_cache(other);
        let ring = self.cache.ring();

        let coefficient = ring.ring.mul(&self.coefficient, &other.coefficient);
        if R::is_zero(&coefficient) {
            return self.cache.constant(coefficient);
        }

        let node = {
            let mut inner = self.cache.inner.borrow_mut();
            let mut leaves = inner.leaves(self.node);
            for (id, e) in inner.leaves(other.node) {
                *leaves.entry(id).or_insert(0) += e;
            }
            inner.product_node(&leaves)
        };
        self.cache.handle(coefficient, node)
    }
}

impl<'a, 'b, R: EuclideanDomain, O: MonomialOrder> Add<&'a FactorizedPolynomial<R, O>>
    for &'b FactorizedPolynomial<R, O>
{
    type Output = FactorizedPolynomial<R, O>;

    fn add(self, other: &'a FactorizedPolynomial<R, O>) -> Self::Output {
        self.add_impl(other, false)
    }
}

impl<'a, 'b, R: EuclideanDomain, O: MonomialOrder> Sub<&'a FactorizedPolynomial<R, O>>
    for &'b FactorizedPolynomial<R, O>
{
    type Output = FactorizedPolynomial<R, O>;

    fn sub(self, other: &'a FactorizedPolynomial<R, O>) -> Self::Output {
        self.add_impl(other, true)
    }
}

impl<'a, R: EuclideanDomain, O: MonomialOrder> Neg for &'a FactorizedPolynomial<R, O> {
    type Output = FactorizedPolynomial<R, O>;

    fn neg(self) -> Self::Output {
        let c = self.cache.ring().ring.neg(&self.coefficient);
        self.cache.handle(c, self.node)
    }
}

#[cfg(test)]
mod test {
    use super::{FactorizationCache, GcdError, NodeState};
    use crate::domains::integer::{Integer, Z};
    use crate::domains::rational::{Rational, Q};
    use crate::poly::monomial::MonomialPool;
    use crate::poly::polynomial::PolynomialRing;
    use crate::state::{State, Variable, VariableDomain};

    fn vars<const N: usize>() -> [Variable; N] {
        [(); N].map(|_| State::fresh_variable(None, VariableDomain::Real))
    }

    #[test]
    fn content_is_shared() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());
        let cache = FactorizationCache::new(&ring);

        let xy = ring.from_term(ring.term(1.into(), [(x, 1), (y, 1)]));
        let a = cache.acquire(&xy);
        let b = cache.acquire(&xy.mul_coeff(&Rational::from(-2)));

        assert_eq!(a.node(), b.node());
        assert_eq!(b.coefficient(), &Rational::from(-2));
        assert_eq!(a.ref_count(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(b.polynomial(), xy.mul_coeff(&Rational::from(-2)));
        assert_eq!(a.node_state(), Some(NodeState::Expanded));

        let c = cache.acquire(&ring.constant(Rational::from(3)));
        assert!(c.is_constant());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn eviction() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Z, MonomialPool::new());
        let cache = FactorizationCache::new(&ring);

        let p = &ring.variable(x) + &ring.variable(y);
        let handles: Vec<_> = (0..5).map(|_| cache.acquire(&p)).collect();
        assert_eq!(cache.ref_count(&p), 5);

        let extra = handles[0].clone();
        assert_eq!(cache.ref_count(&p), 6);
        drop(extra);
        drop(handles);

        assert_eq!(cache.ref_count(&p), 0);
        assert!(cache.is_empty());
        assert!(!cache.contains(&p));

        let again = cache.acquire(&p);
        assert_eq!(again.ref_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn common_divisor() {
        let [x, y, z] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());
        let cache = FactorizationCache::new(&ring);

        let xy = ring.from_term(ring.term(1.into(), [(x, 1), (y, 1)]));
        let xyz = ring.from_term(ring.term(1.into(), [(x, 1), (y, 1), (z, 1)]));

        let a = cache.acquire(&xy);
        let b = cache.acquire(&xyz);
        let (g, ra, rb) = cache.common_divisor(&a, &b).unwrap();

        assert_eq!(g.polynomial(), xy);
        assert!(ra.is_one());
        assert_eq!(rb.polynomial(), ring.variable(z));

        // the divisor shares the entry of a
        assert_eq!(g.node(), a.node());
        assert_eq!(b.node_state(), Some(NodeState::Factored));
        assert_eq!(b.polynomial(), xyz);

        assert_eq!(&g * &ra, a);
        assert_eq!(&g * &rb, b);
    }

    #[test]
    fn refinement_is_shared() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Z, MonomialPool::new());
        let cache = FactorizationCache::new(&ring);

        let f = &ring.variable(x) + &ring.variable(y);
        let g = &ring.variable(x) - &ring.one();
        let h = &ring.variable(y) + &ring.constant(Integer::new(2));

        let a = cache.acquire(&(&f * &g).mul_coeff(&Integer::new(6)));
        let b = cache.acquire(&(&f * &h).mul_coeff(&Integer::new(4)));
        let c = cache.acquire(&(&f * &(&g * &h)));

        let (d, ra, rb) = a.common_divisor(&b).unwrap();
        assert_eq!(d.polynomial(), f.mul_coeff(&Integer::new(2)));
        assert_eq!(ra.polynomial(), g.mul_coeff(&Integer::new(3)));
        assert_eq!(rb.polynomial(), h.mul_coeff(&Integer::new(2)));
        assert_eq!(a.node_state(), Some(NodeState::Factored));

        // the factor f is now shared between a, b and the divisor
        let (d2, _, _) = a.common_divisor(&c).unwrap();
        assert_eq!(d2.polynomial(), (&f * &g));
        assert_eq!(a.factors().len(), 2);
        assert_eq!(c.factors().len(), 3);
        assert_eq!(cache.ref_count(&f), 4);

        assert_eq!(&d * &ra, a);
        assert_eq!(&d * &rb, b);
    }

    #[test]
    fn product_merges_into_leaf() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());
        let cache = FactorizationCache::new(&ring);

        let f = &ring.variable(x) + &ring.variable(y);
        let g = &ring.variable(x) - &ring.variable(y);
        let fa = cache.acquire(&f);
        let fb = cache.acquire(&g);
        let l = cache.acquire(&(&f * &g));
        assert_eq!(l.node_state(), Some(NodeState::Expanded));

        let p = &fa * &fb;
        assert_eq!(p.polynomial(), &f * &g);
        let len = cache.len();

        let again = cache.acquire(&(&f * &g));
        assert_eq!(again.node(), l.node());
        assert_eq!(again.node_state(), Some(NodeState::Factored));
        assert_eq!(cache.len(), len);
        assert_eq!(l.factors(), vec![(f.clone(), 1), (g.clone(), 1)]);
        assert_eq!(cache.ref_count(&f), 3);

        // new products of the same factors reuse the leaf
        let q = &fa * &fb;
        assert_eq!(q.node(), l.node());

        drop((fa, fb, l, p, q, again));
        assert!(cache.is_empty());
    }

    #[test]
    fn repeated_refinement() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());
        let cache = FactorizationCache::new(&ring);
        let c = |n: i64| ring.constant(Rational::from(n));

        let f = &ring.variable(x) + &ring.variable(y);
        let g = &ring.variable(x) - &ring.variable(y);
        let h = &ring.variable(x) + &c(2);
        let k = &ring.variable(y) + &c(1);
        let m = &ring.variable(x) + &c(3);

        let a = &cache.acquire(&h) * &cache.acquire(&(&f * &g));
        let b = &cache.acquire(&(&f * &k)) * &cache.acquire(&(&g * &m));

        let (d, ra, rb) = a.common_divisor(&b).unwrap();
        assert_eq!(d.polynomial(), &f * &g);
        assert_eq!(d.factors().len(), 2);
        assert_eq!(ra.polynomial(), h);
        assert_eq!(rb.polynomial(), &k * &m);
        assert_eq!(&d * &ra, a);
        assert_eq!(&d * &rb, b);
    }

    #[test]
    fn zero_operand() {
        let [x] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());
        let cache = FactorizationCache::new(&ring);

        let a = cache.acquire(&ring.variable(x));
        let zero = cache.acquire(&ring.zero());
        assert!(zero.is_zero());
        assert_eq!(a.common_divisor(&zero).unwrap_err(), GcdError::ZeroOperand);
        assert_eq!(zero.gcd(&a).unwrap_err(), GcdError::ZeroOperand);
    }

    #[test]
    fn arithmetic() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());
        let cache = FactorizationCache::new(&ring);

        let f = &ring.variable(x) + &ring.variable(y);
        let g = &ring.variable(x) - &ring.variable(y);
        let a = cache.acquire(&f);
        let b = cache.acquire(&g);

        let p = &a * &b;
        assert_eq!(p.node_state(), Some(NodeState::Unexpanded));
        assert_eq!(p.polynomial(), &f * &g);
        assert_eq!(p.node_state(), Some(NodeState::Factored));

        let q = &p + &a.pow(2);
        assert_eq!(q.polynomial(), &(&f * &g) + &f.pow(2));
        assert_eq!(q.factors().len(), 2);

        let zero = &p - &p;
        assert!(zero.is_zero());
        assert_eq!((-&a).polynomial(), -f.clone());
        assert_eq!(a.pow(0).polynomial(), ring.one());

        drop((p, q, a, b, zero));
        assert!(cache.is_empty());
    }

    #[test]
    fn print() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());
        let cache = FactorizationCache::new(&ring);

        let a = cache.acquire(&ring.variable(x));
        let b = cache.acquire(&ring.variable(y));
        let p = &a * &b;

        let dump = format!("{}", cache);
        assert_eq!(dump.lines().count(), 3);
        assert!(dump.contains("[unexpanded, refs=1]"));
        assert!(dump.contains("[expanded, refs=2]"));
        drop(p);
        assert_eq!(format!("{}", cache).lines().count(), 2);
    }
}
