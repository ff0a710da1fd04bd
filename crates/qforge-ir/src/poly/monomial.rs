//! Monomials and their term signatures.

use std::collections::BTreeMap;
use std::fmt;

use super::Symbol;

/// The product of symbols raised to positive powers, without coefficient.
///
/// Two monomials are like terms exactly when their signatures are equal.
/// The empty signature is the constant term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(BTreeMap<Symbol, u32>);

impl Signature {
    /// The signature of a constant term.
    pub fn constant() -> Self {
        Signature(BTreeMap::new())
    }

    /// A single symbol to the first power.
    pub fn symbol(symbol: Symbol) -> Self {
        Signature(BTreeMap::from([(symbol, 1)]))
    }

    /// Whether this is the constant term.
    pub fn is_constant(&self) -> bool {
        self.0.is_empty()
    }

    /// Total degree of the term.
    pub fn degree(&self) -> u32 {
        self.0.values().sum()
    }

    /// Iterate over `(symbol, exponent)` factors.
    pub fn factors(&self) -> impl Iterator<Item = (&Symbol, u32)> {
        self.0.iter().map(|(s, e)| (s, *e))
    }

    /// Product of two signatures: exponents of shared symbols add up.
    pub fn product(&self, other: &Signature) -> Signature {
        let mut factors = self.0.clone();
        for (symbol, exponent) in &other.0 {
            *factors.entry(symbol.clone()).or_insert(0) += exponent;
        }
        Signature(factors)
    }

    /// The lone symbol if this signature is `symbol^1`.
    pub fn as_linear_symbol(&self) -> Option<&Symbol> {
        match self.0.iter().next() {
            Some((symbol, 1)) if self.0.len() == 1 => Some(symbol),
            _ => None,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (symbol, exponent)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("*")?;
            }
            match exponent {
                1 => write!(f, "{symbol}")?,
                _ => write!(f, "{symbol}^{exponent}")?,
            }
        }
        Ok(())
    }
}

/// A signed coefficient times a term signature.
///
/// A zero coefficient always carries the constant signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Monomial {
    coefficient: i64,
    signature: Signature,
}

impl Monomial {
    /// Create a monomial, collapsing zero coefficients to the constant term.
    pub fn new(coefficient: i64, signature: Signature) -> Self {
        if coefficient == 0 {
            Monomial {
                coefficient,
                signature: Signature::constant(),
            }
        } else {
            Monomial {
                coefficient,
                signature,
            }
        }
    }

    /// The coefficient.
    pub fn coefficient(&self) -> i64 {
        self.coefficient
    }

    /// The term signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Product of two monomials.
    pub fn product(&self, other: &Monomial) -> Monomial {
        Monomial::new(
            self.coefficient.wrapping_mul(other.coefficient),
            self.signature.product(&other.signature),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::Indeterminate;

    fn sym(name: &str) -> Symbol {
        Indeterminate::new(name).into()
    }

    #[test]
    fn test_zero_coefficient_drops_terms() {
        let m = Monomial::new(0, Signature::symbol(sym("n")));
        assert!(m.signature().is_constant());
    }

    #[test]
    fn test_product_adds_exponents() {
        let n = Monomial::new(2, Signature::symbol(sym("n")));
        let nm = Monomial::new(3, Signature::symbol(sym("n")).product(&Signature::symbol(sym("m"))));
        let p = n.product(&nm);
        assert_eq!(p.coefficient(), 6);
        assert_eq!(p.signature().degree(), 3);
        assert_eq!(p.signature().to_string(), "m*n^2");
    }

    #[test]
    fn test_linear_symbol() {
        let n = Signature::symbol(sym("n"));
        assert!(n.as_linear_symbol().is_some());
        assert!(n.product(&n).as_linear_symbol().is_none());
        assert!(Signature::constant().as_linear_symbol().is_none());
    }
}
