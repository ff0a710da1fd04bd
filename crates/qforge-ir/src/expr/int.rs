//! Located symbolic integer expressions.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Rem, Shl, Shr, Sub};

use crate::error::SolveError;
use crate::location::Location;
use crate::poly::{Indeterminate, Polynomial, Symbol, SymbolicBinOp};

/// A compile-time integer: a canonical polynomial plus the source location
/// it came from.
///
/// The location never takes part in equality or hashing.
#[derive(Debug, Clone, Default)]
pub struct IntExpr {
    poly: Polynomial,
    location: Option<Location>,
}

impl IntExpr {
    /// Wrap a polynomial.
    pub fn new(poly: Polynomial) -> Self {
        IntExpr {
            poly,
            location: None,
        }
    }

    /// A constant.
    pub fn constant(value: i64) -> Self {
        IntExpr::new(Polynomial::constant(value))
    }

    /// A named unknown.
    pub fn variable(indeterminate: &Indeterminate) -> Self {
        IntExpr::new(Polynomial::indeterminate(indeterminate))
    }

    /// A named unknown, by name.
    pub fn named(name: impl AsRef<str>) -> Self {
        IntExpr::variable(&Indeterminate::new(name))
    }

    /// An opaque call to an integer function.
    pub fn call(function: impl AsRef<str>, args: &[IntExpr]) -> Self {
        IntExpr::new(Polynomial::call(
            function,
            args.iter().map(|a| a.poly.clone()).collect(),
        ))
    }

    /// Attach a source location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// The source location, if any.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// The underlying polynomial.
    pub fn poly(&self) -> &Polynomial {
        &self.poly
    }

    /// The value of a constant expression.
    pub fn constant_value(&self) -> Option<i64> {
        self.poly.constant_value()
    }

    /// Whether the expression has no unknowns.
    pub fn is_constant(&self) -> bool {
        self.poly.is_constant()
    }

    /// Whether `indeterminate` occurs anywhere in the expression.
    pub fn contains(&self, indeterminate: &Indeterminate) -> bool {
        self.poly.contains(indeterminate)
    }

    /// Replace an unknown by an expression.
    pub fn substitute(&self, indeterminate: &Indeterminate, value: &IntExpr) -> IntExpr {
        IntExpr {
            poly: self.poly.substitute(indeterminate, &value.poly),
            location: self.location.clone(),
        }
    }

    /// Whether two expressions are known to differ for every assignment of
    /// their unknowns, i.e. their difference is a nonzero constant.
    pub fn provably_differs(&self, other: &IntExpr) -> bool {
        matches!((&self.poly - &other.poly).constant_value(), Some(d) if d != 0)
    }

    /// Raise to a constant power.
    pub fn pow(&self, exponent: u32) -> IntExpr {
        IntExpr {
            poly: self.poly.pow(exponent),
            location: self.location.clone(),
        }
    }

    /// Raise to a symbolic power.
    pub fn pow_expr(&self, exponent: &IntExpr) -> IntExpr {
        self.binary(SymbolicBinOp::Pow, exponent)
    }

    /// Logical (unsigned) shift right.
    pub fn lshr(&self, amount: &IntExpr) -> IntExpr {
        self.binary(SymbolicBinOp::LShr, amount)
    }

    /// Exact division, or `None` when the divisor is not a constant that
    /// divides every coefficient.
    pub fn checked_div(&self, divisor: &IntExpr) -> Option<IntExpr> {
        let quotient = self.poly.checked_div_const(divisor.constant_value()?)?;
        Some(IntExpr {
            poly: quotient,
            location: merge_location(self, divisor),
        })
    }

    fn binary(&self, op: SymbolicBinOp, rhs: &IntExpr) -> IntExpr {
        IntExpr {
            poly: op.apply(&self.poly, &rhs.poly),
            location: merge_location(self, rhs),
        }
    }

    /// Solve `self == rhs` for `variable`.
    ///
    /// Only expressions of the form `c + k * variable` are accepted.
    pub fn solve(&self, rhs: &IntExpr, variable: &Indeterminate) -> Result<IntExpr, SolveError> {
        let not_solvable = || SolveError::NotSolvable {
            expression: self.to_string(),
            variable: variable.to_string(),
        };
        if self.poly.term_count() > 2 {
            return Err(not_solvable());
        }
        let mut constant = 0;
        let mut coefficient = None;
        for (signature, c) in self.poly.terms() {
            if signature.is_constant() {
                constant = c;
            } else {
                match signature.as_linear_symbol() {
                    Some(Symbol::Named(name)) if name == variable => coefficient = Some(c),
                    _ => return Err(not_solvable()),
                }
            }
        }
        let coefficient = coefficient.ok_or_else(not_solvable)?;
        let remainder = rhs - constant;
        if let Some(value) = remainder.constant_value() {
            if value.wrapping_rem(coefficient) != 0 {
                return Err(not_solvable());
            }
        }
        Ok(remainder / IntExpr::constant(coefficient))
    }
}

fn merge_location(lhs: &IntExpr, rhs: &IntExpr) -> Option<Location> {
    lhs.location.clone().or_else(|| rhs.location.clone())
}

impl PartialEq for IntExpr {
    fn eq(&self, other: &Self) -> bool {
        self.poly == other.poly
    }
}

impl Eq for IntExpr {}

impl Hash for IntExpr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.poly.hash(state);
    }
}

impl PartialEq<i64> for IntExpr {
    fn eq(&self, other: &i64) -> bool {
        self.poly == *other
    }
}

impl From<i64> for IntExpr {
    fn from(value: i64) -> Self {
        IntExpr::constant(value)
    }
}

impl From<Polynomial> for IntExpr {
    fn from(poly: Polynomial) -> Self {
        IntExpr::new(poly)
    }
}

impl From<&Indeterminate> for IntExpr {
    fn from(indeterminate: &Indeterminate) -> Self {
        IntExpr::variable(indeterminate)
    }
}

impl fmt::Display for IntExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.poly)
    }
}

macro_rules! impl_int_op {
    ($trait:ident, $method:ident, |$l:ident, $r:ident| $body:expr) => {
        impl $trait<&IntExpr> for &IntExpr {
            type Output = IntExpr;

            fn $method(self, rhs: &IntExpr) -> IntExpr {
                let ($l, $r) = (&self.poly, &rhs.poly);
                IntExpr {
                    poly: $body,
                    location: merge_location(self, rhs),
                }
            }
        }

        impl $trait for IntExpr {
            type Output = IntExpr;

            fn $method(self, rhs: IntExpr) -> IntExpr {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&IntExpr> for IntExpr {
            type Output = IntExpr;

            fn $method(self, rhs: &IntExpr) -> IntExpr {
                (&self).$method(rhs)
            }
        }

        impl $trait<i64> for &IntExpr {
            type Output = IntExpr;

            fn $method(self, rhs: i64) -> IntExpr {
                self.$method(&IntExpr::constant(rhs))
            }
        }

        impl $trait<i64> for IntExpr {
            type Output = IntExpr;

            fn $method(self, rhs: i64) -> IntExpr {
                (&self).$method(&IntExpr::constant(rhs))
            }
        }
    };
}

impl_int_op!(Add, add, |l, r| l + r);
impl_int_op!(Sub, sub, |l, r| l - r);
impl_int_op!(Mul, mul, |l, r| l * r);
impl_int_op!(Div, div, |l, r| SymbolicBinOp::Div.apply(l, r));
impl_int_op!(Rem, rem, |l, r| SymbolicBinOp::Mod.apply(l, r));
impl_int_op!(BitAnd, bitand, |l, r| SymbolicBinOp::And.apply(l, r));
impl_int_op!(BitOr, bitor, |l, r| SymbolicBinOp::Or.apply(l, r));
impl_int_op!(BitXor, bitxor, |l, r| SymbolicBinOp::Xor.apply(l, r));
impl_int_op!(Shl, shl, |l, r| SymbolicBinOp::Shl.apply(l, r));
impl_int_op!(Shr, shr, |l, r| SymbolicBinOp::Shr.apply(l, r));

impl Neg for &IntExpr {
    type Output = IntExpr;

    fn neg(self) -> IntExpr {
        IntExpr {
            poly: -&self.poly,
            location: self.location.clone(),
        }
    }
}

impl Neg for IntExpr {
    type Output = IntExpr;

    fn neg(self) -> IntExpr {
        -&self
    }
}
