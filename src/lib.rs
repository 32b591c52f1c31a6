//! Polycache provides canonical multivariate polynomials over exact coefficient domains.
//!
//! Monomials are interned in a [MonomialPool](poly::monomial::MonomialPool), so that
//! equal monomials share storage and compare by identity. Polynomials are kept as
//! sorted lists of terms with distinct monomials and nonzero coefficients.
//! A [FactorizationCache](poly::factorized::FactorizationCache) stores polynomials
//! together with the factors that were discovered by extracting common divisors,
//! so that related gcd computations reuse each other's work.
//!
//! For example:
//!
//! ```
//! use polycache::domains::rational::Q;
//! use polycache::poly::factorized::FactorizationCache;
//! use polycache::poly::monomial::MonomialPool;
//! use polycache::poly::polynomial::PolynomialRing;
//! use polycache::state::State;
//!
//! let x = State::get_variable("x");
//! let y = State::get_variable("y");
//! let ring = PolynomialRing::new(Q, MonomialPool::new());
//!
//! let a = &ring.variable(x) * &ring.variable(y);
//! let b = &a * &(&ring.variable(x) + &ring.one());
//! assert_eq!(a.gcd(&b), a);
//!
//! let cache = FactorizationCache::new(&ring);
//! let (fa, fb) = (cache.acquire(&a), cache.acquire(&b));
//! let (g, _, rest) = fa.common_divisor(&fb).unwrap();
//! assert_eq!(g.polynomial(), a);
//! println!("rest = {}", rest);
//! ```

pub mod domains;
pub mod poly;
pub mod printer;
pub mod state;
pub mod utils;
