//! Canonical multivariate integer polynomials.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;

use super::{Indeterminate, Monomial, Signature, Symbol, SymbolicBinOp, SymbolicOp};

/// A sum of monomials with pairwise-distinct signatures and no zero
/// coefficients. The empty sum is the canonical zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Polynomial {
    terms: BTreeMap<Signature, i64>,
}

impl Polynomial {
    /// The zero polynomial.
    pub fn zero() -> Self {
        Polynomial::default()
    }

    /// A constant polynomial.
    pub fn constant(value: i64) -> Self {
        let mut p = Polynomial::zero();
        p.accumulate(Signature::constant(), value);
        p
    }

    /// A single symbol to the first power.
    pub fn symbol(symbol: Symbol) -> Self {
        let mut p = Polynomial::zero();
        p.accumulate(Signature::symbol(symbol), 1);
        p
    }

    /// A single indeterminate to the first power.
    pub fn indeterminate(indeterminate: &Indeterminate) -> Self {
        Polynomial::symbol(Symbol::Named(indeterminate.clone()))
    }

    /// An opaque call to an integer function.
    pub fn call(function: impl AsRef<str>, args: Vec<Polynomial>) -> Self {
        Polynomial::symbol(Symbol::Operation(Rc::new(SymbolicOp::Call {
            function: Rc::from(function.as_ref()),
            args,
        })))
    }

    /// Build a polynomial from monomials, combining like terms.
    pub fn from_monomials(monomials: impl IntoIterator<Item = Monomial>) -> Self {
        let mut p = Polynomial::zero();
        for m in monomials {
            p.accumulate(m.signature().clone(), m.coefficient());
        }
        p
    }

    fn accumulate(&mut self, signature: Signature, coefficient: i64) {
        if coefficient == 0 {
            return;
        }
        let entry = self.terms.entry(signature).or_insert(0);
        *entry = entry.wrapping_add(coefficient);
        if *entry == 0 {
            self.terms.retain(|_, c| *c != 0);
        }
    }

    /// Whether this is the canonical zero.
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether this polynomial has no symbolic terms.
    pub fn is_constant(&self) -> bool {
        self.constant_value().is_some()
    }

    /// The value of a constant polynomial.
    pub fn constant_value(&self) -> Option<i64> {
        match self.terms.len() {
            0 => Some(0),
            1 => self
                .terms
                .get(&Signature::constant())
                .copied(),
            _ => None,
        }
    }

    /// The constant term (zero if absent).
    pub fn constant_term(&self) -> i64 {
        self.terms.get(&Signature::constant()).copied().unwrap_or(0)
    }

    /// Number of monomials.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Iterate over `(signature, coefficient)` pairs in canonical order.
    pub fn terms(&self) -> impl Iterator<Item = (&Signature, i64)> {
        self.terms.iter().map(|(s, c)| (s, *c))
    }

    /// `(symbol, coefficient)` when the polynomial is exactly `c * symbol`.
    pub fn single_symbol(&self) -> Option<(&Symbol, i64)> {
        if self.terms.len() != 1 {
            return None;
        }
        let (signature, coefficient) = self.terms.iter().next()?;
        signature.as_linear_symbol().map(|s| (s, *coefficient))
    }

    /// Multiply every coefficient by `factor`.
    pub fn scale(&self, factor: i64) -> Polynomial {
        let mut p = Polynomial::zero();
        for (signature, coefficient) in &self.terms {
            p.accumulate(signature.clone(), coefficient.wrapping_mul(factor));
        }
        p
    }

    /// Raise to a non-negative power by repeated squaring.
    pub fn pow(&self, mut exponent: u32) -> Polynomial {
        let mut result = Polynomial::constant(1);
        let mut base = self.clone();
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = &result * &base;
            }
            exponent >>= 1;
            if exponent > 0 {
                base = &base * &base;
            }
        }
        result
    }

    /// Greatest common divisor of all coefficients; zero for the zero
    /// polynomial.
    pub fn coefficient_gcd(&self) -> u64 {
        self.terms
            .values()
            .fold(0_u64, |acc, c| gcd(acc, c.unsigned_abs()))
    }

    /// Exact division by a constant.
    ///
    /// Returns `None` unless `divisor` is nonzero and divides every
    /// coefficient.
    pub fn checked_div_const(&self, divisor: i64) -> Option<Polynomial> {
        if divisor == 0 || self.coefficient_gcd() % divisor.unsigned_abs() != 0 {
            return None;
        }
        let mut p = Polynomial::zero();
        for (signature, coefficient) in &self.terms {
            p.accumulate(signature.clone(), coefficient.wrapping_div(divisor));
        }
        Some(p)
    }

    /// Division: exact when possible, otherwise a symbolic node.
    pub fn div(&self, divisor: &Polynomial) -> Polynomial {
        SymbolicBinOp::Div.apply(self, divisor)
    }

    /// Remainder: folded for non-negative constants, otherwise symbolic.
    pub fn rem(&self, divisor: &Polynomial) -> Polynomial {
        SymbolicBinOp::Mod.apply(self, divisor)
    }

    /// Apply any symbolic binary operation.
    pub fn binary(&self, op: SymbolicBinOp, rhs: &Polynomial) -> Polynomial {
        op.apply(self, rhs)
    }

    /// Whether `indeterminate` occurs anywhere in the polynomial.
    pub fn contains(&self, indeterminate: &Indeterminate) -> bool {
        self.terms
            .keys()
            .any(|s| s.factors().any(|(symbol, _)| symbol.contains(indeterminate)))
    }

    /// Replace `indeterminate` by `value` everywhere.
    pub fn substitute(&self, indeterminate: &Indeterminate, value: &Polynomial) -> Polynomial {
        let mut result = Polynomial::zero();
        for (signature, coefficient) in &self.terms {
            let mut term = Polynomial::constant(*coefficient);
            for (symbol, exponent) in signature.factors() {
                term = &term * &symbol.substitute(indeterminate, value).pow(exponent);
            }
            result = &result + &term;
        }
        result
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl From<i64> for Polynomial {
    fn from(value: i64) -> Self {
        Polynomial::constant(value)
    }
}

impl Add<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Polynomial {
        let mut p = self.clone();
        for (signature, coefficient) in &rhs.terms {
            p.accumulate(signature.clone(), *coefficient);
        }
        p
    }
}

impl Sub<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &Polynomial) -> Polynomial {
        let mut p = self.clone();
        for (signature, coefficient) in &rhs.terms {
            p.accumulate(signature.clone(), coefficient.wrapping_neg());
        }
        p
    }
}

impl Mul<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let mut p = Polynomial::zero();
        for (ls, lc) in &self.terms {
            for (rs, rc) in &rhs.terms {
                p.accumulate(ls.product(rs), lc.wrapping_mul(*rc));
            }
        }
        p
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        self.scale(-1)
    }
}

macro_rules! forward_owned_binop {
    ($($trait:ident::$method:ident),*) => {
        $(
            impl $trait for Polynomial {
                type Output = Polynomial;

                fn $method(self, rhs: Polynomial) -> Polynomial {
                    (&self).$method(&rhs)
                }
            }
        )*
    };
}

forward_owned_binop!(Add::add, Sub::sub, Mul::mul);

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        -&self
    }
}

impl PartialEq<i64> for Polynomial {
    fn eq(&self, other: &i64) -> bool {
        self.constant_value() == Some(*other)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        // Highest signatures first so the constant term ends the sum.
        for (i, (signature, coefficient)) in self.terms.iter().rev().enumerate() {
            let magnitude = coefficient.unsigned_abs();
            match (i, *coefficient < 0) {
                (0, true) => f.write_str("-")?,
                (0, false) => {}
                (_, true) => f.write_str(" - ")?,
                (_, false) => f.write_str(" + ")?,
            }
            if signature.is_constant() {
                write!(f, "{magnitude}")?;
            } else if magnitude == 1 {
                write!(f, "{signature}")?;
            } else {
                write!(f, "{magnitude}*{signature}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Polynomial {
        Polynomial::indeterminate(&Indeterminate::new(name))
    }

    #[test]
    fn test_like_terms_combine() {
        let n = var("n");
        let p = &(&n + &n) + &Polynomial::constant(3);
        assert_eq!(p.term_count(), 2);
        assert_eq!(p.to_string(), "2*n + 3");
    }

    #[test]
    fn test_self_subtraction_is_zero() {
        let n = var("n");
        let p = &(&n * &n) + &n;
        let zero = &p - &p;
        assert!(zero.is_zero());
        assert_eq!(zero, 0);
        assert_eq!(zero, Polynomial::zero());
    }

    #[test]
    fn test_distribution() {
        let n = var("n");
        let m = var("m");
        let one = Polynomial::constant(1);
        let p = &(&n + &one) * &(&m - &one);
        // n*m - n + m - 1
        assert_eq!(p.term_count(), 4);
        assert_eq!(p.constant_term(), -1);
    }

    #[test]
    fn test_pow_by_squaring() {
        let n = var("n");
        let one = Polynomial::constant(1);
        let sq = (&n + &one).pow(2);
        assert_eq!(sq, &(&(&n * &n) + &n.scale(2)) + &one);
        assert_eq!(Polynomial::constant(3).pow(5), 243);
        assert_eq!(n.pow(0), 1);
    }

    #[test]
    fn test_exact_division() {
        let n = var("n");
        let p = &n.scale(4) + &Polynomial::constant(6);
        assert_eq!(p.coefficient_gcd(), 2);
        assert_eq!(p.checked_div_const(2), Some(&n.scale(2) + &Polynomial::constant(3)));
        assert_eq!(p.checked_div_const(4), None);
        assert_eq!(p.checked_div_const(0), None);
    }

    #[test]
    fn test_inexact_division_is_symbolic() {
        let n = var("n");
        let q = n.div(&Polynomial::constant(2));
        assert!(!q.is_constant());
        assert!(q.contains(&Indeterminate::new("n")));
        assert_eq!(q, n.div(&Polynomial::constant(2)));
        assert_eq!(q.to_string(), "(n / 2)");
    }

    #[test]
    fn test_substitute() {
        let n = Indeterminate::new("n");
        let p = &var("n").pow(2) + &Polynomial::constant(1);
        assert_eq!(p.substitute(&n, &Polynomial::constant(3)), 10);
        let m = var("m");
        assert_eq!(var("n").substitute(&n, &m), m);
    }

    #[test]
    fn test_display_negative_terms() {
        let n = var("n");
        assert_eq!((&n - &Polynomial::constant(1)).to_string(), "n - 1");
        assert_eq!((-&n).to_string(), "-n");
        assert_eq!(Polynomial::zero().to_string(), "0");
    }

    #[test]
    fn test_call_nodes() {
        let a = Polynomial::call("log2", vec![var("n")]);
        let b = Polynomial::call("log2", vec![var("n")]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "log2(n)");
    }
}
