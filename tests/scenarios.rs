use polycache::domains::integer::{Integer, Z};
use polycache::domains::rational::{Rational, Q};
use polycache::poly::factorized::{FactorizationCache, GcdError, NodeState};
use polycache::poly::monomial::{MonomialPool, MonomialRef};
use polycache::poly::polynomial::PolynomialRing;
use polycache::poly::DivisionError;
use polycache::state::State;

#[test]
fn monomial_interning() {
    let x = State::get_variable("x");
    let y = State::get_variable("y");
    let pool = MonomialPool::new();

    let a = pool.intern(&[(x, 1), (y, 1)]);
    let b = pool.intern(&vec![(x, 1), (y, 1)]);
    assert_eq!(a, b);
    assert_eq!(MonomialRef::handle_count(&a), 2);
    assert_eq!(pool.len(), 1);

    // the same monomial in another pool is a different value
    let other = MonomialPool::new();
    let c = other.intern(&[(x, 1), (y, 1)]);
    assert!(other.owns(&c));
    assert!(!pool.owns(&c));
    assert_ne!(a, c);
}

#[test]
fn polynomial_sum_cancels() {
    let x = State::get_variable("x");
    let y = State::get_variable("y");
    let ring = PolynomialRing::new(Z, MonomialPool::new());

    let a = ring.from_terms(vec![
        ring.term(Integer::new(1), [(x, 2)]),
        ring.term(Integer::new(-1), [(y, 1)]),
    ]);
    let b = ring.from_terms(vec![
        ring.term(Integer::new(4), [(x, 1)]),
        ring.term(Integer::new(1), [(y, 1)]),
        ring.term(Integer::new(-8), [(y, 7)]),
    ]);

    let sum = &a + &b;
    let expected = ring.from_terms(vec![
        ring.term(Integer::new(1), [(x, 2)]),
        ring.term(Integer::new(4), [(x, 1)]),
        ring.term(Integer::new(-8), [(y, 7)]),
    ]);
    assert_eq!(sum, expected);
    assert_eq!(sum.nterms(), 3);
    assert_eq!(sum.degree(y), 7);
    assert!(sum.is_canonical());
}

#[test]
fn common_divisor_of_monomials() {
    let x = State::get_variable("x");
    let y = State::get_variable("y");
    let z = State::get_variable("z");
    let ring = PolynomialRing::new(Q, MonomialPool::new());
    let cache = FactorizationCache::new(&ring);

    let xy = ring.from_term(ring.term(Rational::from(1), [(x, 1), (y, 1)]));
    let xyz = ring.from_term(ring.term(Rational::from(1), [(x, 1), (y, 1), (z, 1)]));

    let a = cache.acquire(&xy);
    let b = cache.acquire(&xyz);
    let (g, ra, rb) = cache.common_divisor(&a, &b).unwrap();

    assert_eq!(g.polynomial(), xy);
    assert_eq!(ra.polynomial(), ring.one());
    assert_eq!(rb.polynomial(), ring.variable(z));

    let zero = cache.acquire(&ring.zero());
    assert_eq!(
        cache.common_divisor(&a, &zero).unwrap_err(),
        GcdError::ZeroOperand
    );
}

#[test]
fn cache_reference_counting() {
    let x = State::get_variable("x");
    let y = State::get_variable("y");
    let ring = PolynomialRing::new(Q, MonomialPool::new());
    let cache = FactorizationCache::new(&ring);

    let build = || {
        ring.from_terms(vec![
            ring.term(Rational::from(3), [(x, 2)]),
            ring.term(Rational::from(-1), [(y, 1)]),
        ])
    };

    let n = 6;
    let mut handles: Vec<_> = (0..n).map(|_| cache.acquire(&build())).collect();
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.ref_count(&build()), n);

    handles.truncate(1);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.ref_count(&build()), 1);
    assert_eq!(handles[0].node_state(), Some(NodeState::Expanded));

    handles.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.ref_count(&build()), 0);
}

#[test]
fn cache_dump() {
    let x = State::get_variable("x");
    let y = State::get_variable("y");
    let ring = PolynomialRing::new(Z, MonomialPool::new());
    let cache = FactorizationCache::new(&ring);

    // (x + y)(x - y) and (x + y)^2 share the factor x + y after extraction
    let f = &ring.variable(x) + &ring.variable(y);
    let g = &ring.variable(x) - &ring.variable(y);
    let a = cache.acquire(&(&f * &g));
    let b = cache.acquire(&f.pow(2));

    let (d, ra, rb) = a.common_divisor(&b).unwrap();
    assert_eq!(d.polynomial(), f);
    assert_eq!(ra.polynomial(), g);
    assert_eq!(rb.polynomial(), f);
    assert_eq!(a.node_state(), Some(NodeState::Factored));
    assert_eq!(b.node_state(), Some(NodeState::Factored));
    assert_eq!(b.factors(), vec![(f.clone(), 2)]);

    let entries = cache.entries();
    assert_eq!(entries.len(), 4);
    let dump = cache.to_string();
    assert_eq!(dump.lines().count(), 4);
    assert!(dump.contains("factored"));

    drop((a, b, d, ra, rb));
    assert!(cache.is_empty());
    assert_eq!(cache.to_string(), "");
}

#[test]
fn term_division() {
    let x = State::get_variable("x");
    let y = State::get_variable("y");
    let ring = PolynomialRing::new(Z, MonomialPool::new());

    let t = ring.term(Integer::new(6), [(x, 2), (y, 1)]);
    let d = ring.term(Integer::new(3), [(x, 1)]);
    let q = t.div_term(&d, &ring).unwrap();
    assert_eq!(q.mul(&d, &ring), t);

    let bad = ring.term(Integer::new(1), [(y, 2)]);
    assert_eq!(t.div_term(&bad, &ring), Err(DivisionError::NotDivisible));
}
