use proptest::prelude::*;

use polycache::domains::integer::{Integer, Z};
use polycache::domains::rational::{Rational, Q};
use polycache::domains::Ring;
use polycache::poly::factorized::FactorizationCache;
use polycache::poly::monomial::MonomialPool;
use polycache::poly::polynomial::{Polynomial, PolynomialRing};
use polycache::poly::DivisionError;
use polycache::state::{State, Variable};

type RawTerm = (i64, u32, u32, u32);
type Exponents = (u32, u32, u32);

fn vars() -> [Variable; 3] {
    [
        State::get_variable("prop_a"),
        State::get_variable("prop_b"),
        State::get_variable("prop_c"),
    ]
}

fn raw_poly(max_terms: usize) -> impl Strategy<Value = Vec<RawTerm>> {
    prop::collection::vec((-6i64..7, 0u32..3, 0u32..3, 0u32..3), 0..max_terms)
}

fn build<R: Ring>(
    ring: &PolynomialRing<R>,
    raw: &[RawTerm],
    coeff: impl Fn(i64) -> R::Element,
) -> Polynomial<R> {
    let [a, b, c] = vars();
    ring.from_terms(
        raw.iter()
            .map(|(k, ea, eb, ec)| ring.term(coeff(*k), [(a, *ea), (b, *eb), (c, *ec)]))
            .collect(),
    )
}

proptest! {
    #[test]
    fn ring_laws(ra in raw_poly(5), rb in raw_poly(5), rc in raw_poly(4)) {
        let ring = PolynomialRing::new(Z, MonomialPool::new());
        let a = build(&ring, &ra, Integer::new);
        let b = build(&ring, &rb, Integer::new);
        let c = build(&ring, &rc, Integer::new);

        prop_assert_eq!(&a + &b, &b + &a);
        prop_assert_eq!(&(&a + &b) + &c, &a + &(&b + &c));
        prop_assert_eq!(&a * &(&b + &c), &(&a * &b) + &(&a * &c));
        prop_assert_eq!(&a * &b, &b * &a);
        prop_assert_eq!(&a + &ring.zero(), a.clone());
        prop_assert_eq!(&a * &ring.one(), a.clone());
        prop_assert!((&a - &a).is_zero());
        prop_assert!((&a * &b).is_canonical());
    }

    #[test]
    fn canonical_form_is_stable(ra in raw_poly(8)) {
        let ring = PolynomialRing::new(Z, MonomialPool::new());
        let a = build(&ring, &ra, Integer::new);

        prop_assert!(a.is_canonical());
        let mut shuffled = a.terms().to_vec();
        shuffled.reverse();
        prop_assert_eq!(ring.from_terms(shuffled), a);
    }

    #[test]
    fn derivative_is_linear(ra in raw_poly(6), rb in raw_poly(6)) {
        let ring = PolynomialRing::new(Z, MonomialPool::new());
        let a = build(&ring, &ra, Integer::new);
        let b = build(&ring, &rb, Integer::new);

        for v in vars() {
            prop_assert_eq!(
                (&a + &b).derivative(v),
                &a.derivative(v) + &b.derivative(v)
            );
        }
        prop_assert!(ring.constant(Integer::new(5)).derivative(vars()[0]).is_zero());
    }

    #[test]
    fn gcd_reconstructs(ra in raw_poly(4), rb in raw_poly(4), rc in raw_poly(3)) {
        let ring = PolynomialRing::new(Q, MonomialPool::new());
        let common = build(&ring, &rc, Rational::from);
        let a = &build(&ring, &ra, Rational::from) * &common;
        let b = &build(&ring, &rb, Rational::from) * &common;
        prop_assume!(!a.is_zero() && !b.is_zero());

        let g = a.gcd(&b);
        prop_assert!(a.divides(&g).is_some());
        prop_assert!(b.divides(&g).is_some());
        prop_assert!(g.divides(&common).is_some());

        let cache = FactorizationCache::new(&ring);
        let fa = cache.acquire(&a);
        let fb = cache.acquire(&b);
        let (d, qa, qb) = fa.common_divisor(&fb).unwrap();
        prop_assert_eq!((&d * &qa).polynomial(), a.clone());
        prop_assert_eq!((&d * &qb).polynomial(), b.clone());
        prop_assert_eq!(fa.polynomial(), a);
        prop_assert_eq!(fb.polynomial(), b);

        drop((fa, fb, d, qa, qb));
        prop_assert!(cache.is_empty());
    }

    #[test]
    fn term_division_is_exact(
        (kq, eq) in ((-9i64..10).prop_filter("nonzero", |k| *k != 0), (0u32..4, 0u32..4, 0u32..4)),
        (kd, ed) in ((-5i64..6).prop_filter("nonzero", |k| *k != 0), (0u32..4, 0u32..4, 0u32..4)),
        bump in 0usize..3,
    ) {
        let ring = PolynomialRing::new(Z, MonomialPool::new());
        let [a, b, c] = vars();
        let term = |k: i64, (ea, eb, ec): Exponents| {
            ring.term(Integer::new(k), [(a, ea), (b, eb), (c, ec)])
        };

        let q = term(kq, eq);
        let d = term(kd, ed);
        let t = q.mul(&d, &ring);
        let quotient = t.div_term(&d, &ring).unwrap();
        prop_assert_eq!(&quotient, &q);
        prop_assert_eq!(quotient.mul(&d, &ring), t.clone());

        // a divisor with a larger exponent in one variable
        let mut larger = [eq.0 + ed.0, eq.1 + ed.1, eq.2 + ed.2];
        larger[bump] += 1;
        let bad = term(1, (larger[0], larger[1], larger[2]));
        prop_assert_eq!(t.div_term(&bad, &ring), Err(DivisionError::NotDivisible));
    }
}
