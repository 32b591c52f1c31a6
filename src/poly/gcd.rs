use tracing::{debug, instrument};

use super::polynomial::Polynomial;
use super::MonomialOrder;
use crate::domains::EuclideanDomain;
use crate::state::Variable;

impl<R: EuclideanDomain, O: MonomialOrder> Polynomial<R, O> {
    /// Compute the greatest common divisor, normalized such that the leading
    /// coefficient is one over a field and positive over the integers.
    /// The gcd of zero and `b` is `b`, normalized.
    pub fn gcd(&self, b: &Self) -> Self {
        if self.ring != b.ring {
            panic!("Polynomials do not share the same ring and monomial pool");
        }

        if self.is_zero() {
            return b.normalize();
        }
        if b.is_zero() || self == b {
            return self.normalize();
        }

        debug!("gcd of {} and {}", self, b);

        // split off the monomial contents, which only share their gcd
        let pool = &self.ring.pool;
        let (ma, mb) = (self.monomial_content(), b.monomial_content());
        let shared = match (&ma, &mb) {
            (Some(ma), Some(mb)) => pool.gcd(ma, mb),
            _ => None,
        };

        let a = match &ma {
            Some(m) => self.div_monomial(Some(m)).unwrap_or_else(|_| self.clone()),
            None => self.clone(),
        };
        let bb = match &mb {
            Some(m) => b.div_monomial(Some(m)).unwrap_or_else(|_| b.clone()),
            None => b.clone(),
        };

        let g = a.gcd_no_monomial_content(&bb);
        let g = g.mul_monomial(shared.as_ref()).normalize();
        debug!("gcd = {}", g);
        g
    }

    /// Compute the least common multiple.
    pub fn lcm(&self, b: &Self) -> Self {
        if self.is_zero() || b.is_zero() {
            return self.zero();
        }

        let g = self.gcd(b);
        (&self.exact_div(&g) * b).normalize()
    }

    /// Compute the gcd and the cofactors `self / g` and `b / g`.
    pub fn cofactors(&self, b: &Self) -> (Self, Self, Self) {
        let g = self.gcd(b);
        if g.is_zero() {
            return (g, self.zero(), self.zero());
        }
        let ca = self.exact_div(&g);
        let cb = b.exact_div(&g);
        (g, ca, cb)
    }

    /// Divide by a known divisor.
    pub(crate) fn exact_div(&self, div: &Self) -> Self {
        let (q, r) = self.quot_rem(div);
        debug_assert!(r.is_zero(), "{} does not divide {}", div, self);
        q
    }

    /// Compute the gcd of nonzero polynomials that are not divisible by any variable.
    #[instrument(level = "trace", skip_all)]
    fn gcd_no_monomial_content(&self, b: &Self) -> Self {
        let ring = &self.ring.ring;

        if self.is_constant() || b.is_constant() {
            return self.constant(ring.gcd(&self.content(), &b.content()));
        }

        // the main variable is the smallest one that occurs
        let va = self.variables();
        let vb = b.variables();
        let x = match (va.first(), vb.first()) {
            (Some(x), Some(y)) => *x.min(y),
            _ => unreachable!("non-constant polynomials have a variable"),
        };

        if !self.has(x) {
            return self.gcd(&b.content_in(x));
        }
        if !b.has(x) {
            return b.gcd(&self.content_in(x));
        }

        let ua = self.to_univariate_coefficients(x);
        let ub = b.to_univariate_coefficients(x);

        let ca = univariate_content(&ua);
        let cb = univariate_content(&ub);
        let c = ca.gcd(&cb);

        let pa: Vec<_> = ua.iter().map(|p| p.exact_div(&ca)).collect();
        let pb: Vec<_> = ub.iter().map(|p| p.exact_div(&cb)).collect();

        let g = primitive_prs(pa, pb);
        debug!(
            "Univariate gcd in {} has degree {}",
            x,
            g.len().saturating_sub(1)
        );

        &Self::from_univariate_coefficients(&g, x, &self.ring) * &c
    }

    /// Compute the gcd of the coefficients with respect to `var`.
    pub fn content_in(&self, var: Variable) -> Self {
        univariate_content(&self.to_univariate_coefficients(var))
    }
}

fn univariate_content<R: EuclideanDomain, O: MonomialOrder>(
    coeffs: &[Polynomial<R, O>],
) -> Polynomial<R, O> {
    let mut iter = coeffs.iter().filter(|c| !c.is_zero());
    let Some(first) = iter.next() else {
        return coeffs[0].zero();
    };

    let mut c = first.normalize();
    for p in iter {
        if c.is_one() {
            break;
        }
        c = c.gcd(p);
    }
    c
}

/// Divide out the polynomial content and the coefficient content.
fn primitive_part<R: EuclideanDomain, O: MonomialOrder>(
    coeffs: Vec<Polynomial<R, O>>,
) -> Vec<Polynomial<R, O>> {
    let c = univariate_content(&coeffs);
    let coeffs: Vec<_> = coeffs.iter().map(|p| p.exact_div(&c)).collect();

    let ring = &coeffs[0].ring.ring;
    let mut content = ring.zero();
    for p in &coeffs {
        content = ring.gcd(&content, &p.content());
    }

    if ring.is_one(&content) {
        coeffs
    } else {
        coeffs.iter().map(|p| p.div_coeff_exact(&content)).collect()
    }
}

/// Compute the pseudo-remainder of `a` by `b`, where both are dense lists of
/// coefficients with a nonzero last entry.
fn pseudo_rem<R: EuclideanDomain, O: MonomialOrder>(
    a: &[Polynomial<R, O>],
    b: &[Polynomial<R, O>],
) -> Vec<Polynomial<R, O>> {
    let mut r = a.to_vec();
    let lb = &b[b.len() - 1];

    while r.len() >= b.len() {
        let lr = r[r.len() - 1].clone();
        let shift = r.len() - b.len();

        for c in r.iter_mut() {
            *c = &*c * lb;
        }
        for (i, bc) in b.iter().enumerate() {
            r[i + shift] = &r[i + shift] - &(&lr * bc);
        }

        while r.last().map(|c| c.is_zero()).unwrap_or(false) {
            r.pop();
        }
    }

    r
}

/// Compute the gcd of two primitive univariate polynomials using a primitive
/// pseudo-remainder sequence.
fn primitive_prs<R: EuclideanDomain, O: MonomialOrder>(
    a: Vec<Polynomial<R, O>>,
    b: Vec<Polynomial<R, O>>,
) -> Vec<Polynomial<R, O>> {
    let (mut a, mut b) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    while !b.is_empty() {
        let r = pseudo_rem(&a, &b);
        a = b;
        b = if r.is_empty() { r } else { primitive_part(r) };
    }

    a
}

#[cfg(test)]
mod test {
    use crate::domains::finite_field::Zp;
    use crate::domains::integer::{Integer, Z};
    use crate::domains::rational::{Rational, Q};
    use crate::poly::monomial::MonomialPool;
    use crate::poly::polynomial::PolynomialRing;
    use crate::state::{State, Variable, VariableDomain};

    fn vars<const N: usize>() -> [Variable; N] {
        [(); N].map(|_| State::fresh_variable(None, VariableDomain::Real))
    }

    #[test]
    fn monomial_gcd() {
        let [x, y, z] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());

        let xy = ring.from_term(ring.term(Rational::from(2), [(x, 1), (y, 1)]));
        let xyz = ring.from_term(ring.term(Rational::from(3), [(x, 1), (y, 1), (z, 1)]));

        let g = xy.gcd(&xyz);
        assert_eq!(g, ring.from_term(ring.term(1.into(), [(x, 1), (y, 1)])));

        let (g, ca, cb) = xy.cofactors(&xyz);
        assert_eq!(&g * &ca, xy);
        assert_eq!(&g * &cb, xyz);
    }

    #[test]
    fn rational_gcd() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Q, MonomialPool::new());

        let f = &ring.variable(x) + &ring.variable(y);
        let g = &ring.variable(x) - &ring.one();
        let h = &ring.variable(y).pow(2) + &ring.variable(x);

        let a = (&f * &g).mul_coeff(&Rational::from(3));
        let b = (&f * &h).mul_coeff(&Rational::from((1, 2)));

        let d = a.gcd(&b);
        assert_eq!(d, f.normalize());
        assert_eq!(d.lcoeff(), Rational::one());

        assert_eq!(a.gcd(&ring.zero()), a.normalize());
        assert_eq!(ring.zero().gcd(&b), b.normalize());
        assert!(g.gcd(&h).is_one());
    }

    #[test]
    fn integer_gcd() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Z, MonomialPool::new());

        // 6(x - y)(x + 2) and -4(x - y)^2
        let f = &ring.variable(x) - &ring.variable(y);
        let a = (&f * &(&ring.variable(x) + &ring.constant(Integer::new(2)))).mul_coeff(&Integer::new(6));
        let b = f.pow(2).mul_coeff(&Integer::new(-4));

        let d = a.gcd(&b);
        assert_eq!(d, f.mul_coeff(&Integer::new(2)).normalize());
        assert!(!d.lcoeff().is_negative());

        let l = a.lcm(&b);
        assert!(l.divides(&a).is_some());
        assert!(l.divides(&b).is_some());
        assert_eq!(l.total_degree(), 3);
    }

    #[test]
    fn one_sided_variable() {
        let [x, y] = vars();
        let ring = PolynomialRing::new(Z, MonomialPool::new());

        // (y + 1) x + (y + 1) and y^2 - 1
        let y1 = &ring.variable(y) + &ring.one();
        let a = &y1.mul_var(x, 1) + &y1;
        let b = &ring.variable(y).pow(2) - &ring.one();

        assert_eq!(a.gcd(&b), y1);
    }

    #[test]
    fn finite_field_gcd() {
        let [x] = vars();
        let field = Zp::new(7);
        let ring = PolynomialRing::new(field, MonomialPool::new());

        // (x + 3)(x + 1) and (x + 3)(x + 5)
        let f = &ring.variable(x) + &ring.constant(field.to_element(3));
        let a = &f * &(&ring.variable(x) + &ring.one());
        let b = (&f * &(&ring.variable(x) + &ring.constant(field.to_element(5))))
            .mul_coeff(&field.to_element(2));

        assert_eq!(a.gcd(&b), f);
    }
}
