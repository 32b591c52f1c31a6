use std::fmt::{self, Write};

use crate::domains::{EuclideanDomain, Ring};
use crate::poly::factorized::FactorizedPolynomial;
use crate::poly::monomial::{Monomial, MonomialRef};
use crate::poly::polynomial::Polynomial;
use crate::poly::term::Term;
use crate::poly::MonomialOrder;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrintMode {
    /// `2*x^2*y+3*z`
    Infix,
    /// `(+ (* 2 (^ x 2) y) (* 3 z))`
    Prefix,
}

/// Options that control the textual rendering of monomials, terms and polynomials.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    pub mode: PrintMode,
    /// Print the registered names of variables instead of `x_<id>`.
    pub friendly_names: bool,
    pub multiplication_operator: &'static str,
    pub power_operator: &'static str,
    pub addition_operator: &'static str,
}

impl PrintOptions {
    pub const fn new() -> PrintOptions {
        PrintOptions {
            mode: PrintMode::Infix,
            friendly_names: true,
            multiplication_operator: "*",
            power_operator: "^",
            addition_operator: "+",
        }
    }

    pub const fn prefix() -> PrintOptions {
        PrintOptions {
            mode: PrintMode::Prefix,
            ..Self::new()
        }
    }

    /// Options for output that is read back by other programs.
    pub const fn file() -> PrintOptions {
        PrintOptions {
            mode: PrintMode::Infix,
            friendly_names: false,
            multiplication_operator: "*",
            power_operator: "**",
            addition_operator: "+",
        }
    }
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self::new()
    }
}

fn fmt_monomial(m: &Monomial, f: &mut fmt::Formatter, opts: &PrintOptions) -> fmt::Result {
    match opts.mode {
        PrintMode::Infix => {
            for (i, (v, e)) in m.pairs().iter().enumerate() {
                if i > 0 {
                    f.write_str(opts.multiplication_operator)?;
                }
                f.write_str(&v.get_name(opts.friendly_names))?;
                if *e != 1 {
                    write!(f, "{}{}", opts.power_operator, e)?;
                }
            }
            Ok(())
        }
        PrintMode::Prefix => {
            if m.nvars() > 1 {
                f.write_str("(* ")?;
            }
            for (i, (v, e)) in m.pairs().iter().enumerate() {
                if i > 0 {
                    f.write_char(' ')?;
                }
                if *e == 1 {
                    f.write_str(&v.get_name(opts.friendly_names))?;
                } else {
                    write!(f, "(^ {} {})", v.get_name(opts.friendly_names), e)?;
                }
            }
            if m.nvars() > 1 {
                f.write_char(')')?;
            }
            Ok(())
        }
    }
}

/// Write a term. In infix mode a unit coefficient is omitted and a coefficient
/// of minus one becomes a sign.
fn fmt_term<R: Ring>(
    t: &Term<R>,
    f: &mut fmt::Formatter,
    opts: &PrintOptions,
    ring: &R,
) -> fmt::Result {
    let Some(m) = &t.monomial else {
        return write!(f, "{}", t.coefficient);
    };

    match opts.mode {
        PrintMode::Infix => {
            if !ring.is_one(&t.coefficient) {
                if ring.is_one(&ring.neg(&t.coefficient)) {
                    f.write_char('-')?;
                } else {
                    write!(f, "{}{}", t.coefficient, opts.multiplication_operator)?;
                }
            }
            fmt_monomial(m, f, opts)
        }
        PrintMode::Prefix => {
            if ring.is_one(&t.coefficient) {
                fmt_monomial(m, f, opts)
            } else {
                write!(f, "(* {} ", t.coefficient)?;
                fmt_monomial(m, f, opts)?;
                f.write_char(')')
            }
        }
    }
}

/// Write a polynomial with its leading term first.
fn fmt_polynomial<R: Ring, O: MonomialOrder>(
    p: &Polynomial<R, O>,
    f: &mut fmt::Formatter,
    opts: &PrintOptions,
) -> fmt::Result {
    let ring = &p.ring.ring;
    if p.is_zero() {
        return write!(f, "{}", ring.zero());
    }

    match opts.mode {
        PrintMode::Infix => {
            for (i, t) in p.terms().iter().rev().enumerate() {
                if i > 0 {
                    // fold the sign of a negative term into the operator
                    let mut s = String::new();
                    write_term(&mut s, t, opts, ring)?;
                    match s.strip_prefix('-') {
                        Some(rest) if opts.addition_operator.contains('+') => {
                            f.write_str(&opts.addition_operator.replace('+', "-"))?;
                            f.write_str(rest)?;
                        }
                        _ => {
                            f.write_str(opts.addition_operator)?;
                            f.write_str(&s)?;
                        }
                    }
                } else {
                    fmt_term(t, f, opts, ring)?;
                }
            }
            Ok(())
        }
        PrintMode::Prefix => {
            if p.nterms() > 1 {
                f.write_str("(+")?;
                for t in p.terms().iter().rev() {
                    f.write_char(' ')?;
                    fmt_term(t, f, opts, ring)?;
                }
                f.write_char(')')
            } else {
                fmt_term(&p.terms()[0], f, opts, ring)
            }
        }
    }
}

fn write_term<R: Ring>(
    out: &mut String,
    t: &Term<R>,
    opts: &PrintOptions,
    ring: &R,
) -> fmt::Result {
    write!(
        out,
        "{}",
        TermPrinter {
            term: t,
            opts: *opts,
            ring,
        }
    )
}

pub struct MonomialPrinter<'a> {
    pub monomial: &'a Monomial,
    pub opts: PrintOptions,
}

impl<'a> fmt::Display for MonomialPrinter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_monomial(self.monomial, f, &self.opts)
    }
}

impl Monomial {
    pub fn printer(&self, opts: PrintOptions) -> MonomialPrinter<'_> {
        MonomialPrinter {
            monomial: self,
            opts,
        }
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_monomial(self, f, &PrintOptions::new())
    }
}

impl fmt::Display for MonomialRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_monomial(self, f, &PrintOptions::new())
    }
}

pub struct TermPrinter<'a, R: Ring> {
    pub term: &'a Term<R>,
    pub opts: PrintOptions,
    pub ring: &'a R,
}

impl<'a, R: Ring> fmt::Display for TermPrinter<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_term(self.term, f, &self.opts, self.ring)
    }
}

impl<R: Ring> Term<R> {
    /// Get a printer for the term. The ring decides how the coefficient is abbreviated.
    pub fn printer<'a>(&'a self, ring: &'a R, opts: PrintOptions) -> TermPrinter<'a, R> {
        TermPrinter {
            term: self,
            opts,
            ring,
        }
    }
}

impl<R: Ring> fmt::Display for Term<R> {
    /// Write the term in infix form. Without a ring, unit coefficients are
    /// recognized by their rendering.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Some(m) = &self.monomial else {
            return write!(f, "{}", self.coefficient);
        };

        match self.coefficient.to_string().as_str() {
            "1" => {}
            "-1" => f.write_char('-')?,
            c => write!(f, "{}*", c)?,
        }
        fmt_monomial(m, f, &PrintOptions::new())
    }
}

pub struct PolynomialPrinter<'a, R: Ring, O: MonomialOrder> {
    pub poly: &'a Polynomial<R, O>,
    pub opts: PrintOptions,
}

impl<'a, R: Ring, O: MonomialOrder> fmt::Display for PolynomialPrinter<'a, R, O> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_polynomial(self.poly, f, &self.opts)
    }
}

impl<R: Ring, O: MonomialOrder> Polynomial<R, O> {
    pub fn printer(&self, opts: PrintOptions) -> PolynomialPrinter<'_, R, O> {
        PolynomialPrinter { poly: self, opts }
    }
}

impl<R: Ring, O: MonomialOrder> fmt::Display for Polynomial<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_polynomial(self, f, &PrintOptions::new())
    }
}

pub struct FactorizedPolynomialPrinter<'a, R: EuclideanDomain, O: MonomialOrder> {
    pub poly: &'a FactorizedPolynomial<R, O>,
    pub opts: PrintOptions,
}

impl<'a, R: EuclideanDomain, O: MonomialOrder> fmt::Display
    for FactorizedPolynomialPrinter<'a, R, O>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let opts = &self.opts;
        let ring = self.poly.cache().ring().ring;
        let coeff = self.poly.coefficient();
        let factors = self.poly.factors();

        if factors.is_empty() {
            return write!(f, "{}", coeff);
        }

        match opts.mode {
            PrintMode::Infix => {
                if !ring.is_one(coeff) {
                    if ring.is_one(&ring.neg(coeff)) {
                        f.write_char('-')?;
                    } else {
                        write!(f, "{}{}", coeff, opts.multiplication_operator)?;
                    }
                }

                for (i, (p, e)) in factors.iter().enumerate() {
                    if i > 0 {
                        f.write_str(opts.multiplication_operator)?;
                    }
                    let parens = p.nterms() > 1 || (*e > 1 && p.total_degree() > 1);
                    if parens {
                        f.write_char('(')?;
                    }
                    fmt_polynomial(p, f, opts)?;
                    if parens {
                        f.write_char(')')?;
                    }
                    if *e > 1 {
                        write!(f, "{}{}", opts.power_operator, e)?;
                    }
                }
                Ok(())
            }
            PrintMode::Prefix => {
                let single = factors.len() == 1 && ring.is_one(coeff);
                if !single {
                    f.write_str("(*")?;
                    if !ring.is_one(coeff) {
                        write!(f, " {}", coeff)?;
                    }
                }
                for (p, e) in &factors {
                    if !single {
                        f.write_char(' ')?;
                    }
                    if *e > 1 {
                        f.write_str("(^ ")?;
                        fmt_polynomial(p, f, opts)?;
                        write!(f, " {})", e)?;
                    } else {
                        fmt_polynomial(p, f, opts)?;
                    }
                }
                if !single {
                    f.write_char(')')?;
                }
                Ok(())
            }
        }
    }
}

impl<R: EuclideanDomain, O: MonomialOrder> FactorizedPolynomial<R, O> {
    pub fn printer(&self, opts: PrintOptions) -> FactorizedPolynomialPrinter<'_, R, O> {
        FactorizedPolynomialPrinter { poly: self, opts }
    }
}

impl<R: EuclideanDomain, O: MonomialOrder> fmt::Display for FactorizedPolynomial<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.printer(PrintOptions::new()), f)
    }
}
