//! Indeterminates and indeterminate-like symbolic nodes.

use std::fmt;
use std::rc::Rc;

use super::Polynomial;

/// A named compile-time integer unknown.
///
/// Two indeterminates are the same unknown exactly when their names match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Indeterminate(Rc<str>);

impl Indeterminate {
    /// Create an indeterminate with the given name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Indeterminate(Rc::from(name.as_ref()))
    }

    /// The name of this unknown.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Indeterminate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Binary integer operations that have no closed polynomial form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolicBinOp {
    /// Truncating division.
    Div,
    /// Remainder.
    Mod,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Shift left.
    Shl,
    /// Arithmetic shift right.
    Shr,
    /// Logical shift right.
    LShr,
    /// Exponentiation with a non-constant exponent.
    Pow,
}

impl SymbolicBinOp {
    /// Operator token used when rendering the node.
    pub fn token(self) -> &'static str {
        match self {
            SymbolicBinOp::Div => "/",
            SymbolicBinOp::Mod => "%",
            SymbolicBinOp::And => "&",
            SymbolicBinOp::Or => "|",
            SymbolicBinOp::Xor => "^",
            SymbolicBinOp::Shl => "<<",
            SymbolicBinOp::Shr => ">>",
            SymbolicBinOp::LShr => ">>>",
            SymbolicBinOp::Pow => "**",
        }
    }

    /// Fold two constant operands, when the result is well defined
    /// independently of the target integer width.
    fn fold(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            // Division only folds through exact polynomial division.
            SymbolicBinOp::Div => None,
            SymbolicBinOp::Mod if lhs >= 0 && rhs > 0 => Some(lhs % rhs),
            SymbolicBinOp::Mod => None,
            SymbolicBinOp::And => Some(lhs & rhs),
            SymbolicBinOp::Or => Some(lhs | rhs),
            SymbolicBinOp::Xor => Some(lhs ^ rhs),
            SymbolicBinOp::Shl => u32::try_from(rhs)
                .ok()
                .filter(|amount| *amount < 63)
                .and_then(|amount| lhs.checked_mul(1_i64 << amount)),
            SymbolicBinOp::Shr => u32::try_from(rhs)
                .ok()
                .filter(|amount| *amount < 64)
                .map(|amount| lhs >> amount),
            SymbolicBinOp::LShr if lhs >= 0 => u32::try_from(rhs)
                .ok()
                .filter(|amount| *amount < 64)
                .map(|amount| lhs >> amount),
            SymbolicBinOp::LShr => None,
            SymbolicBinOp::Pow => None,
        }
    }

    /// Apply the operation to two polynomials.
    ///
    /// Exact constant division and constant operands fold to a plain
    /// polynomial; everything else becomes a symbolic node.
    pub fn apply(self, lhs: &Polynomial, rhs: &Polynomial) -> Polynomial {
        match self {
            SymbolicBinOp::Div => {
                if let Some(quotient) = rhs
                    .constant_value()
                    .and_then(|divisor| lhs.checked_div_const(divisor))
                {
                    return quotient;
                }
            }
            SymbolicBinOp::Pow => {
                if let Some(exponent) = rhs.constant_value().and_then(|e| u32::try_from(e).ok()) {
                    return lhs.pow(exponent);
                }
            }
            _ => {
                if let (Some(a), Some(b)) = (lhs.constant_value(), rhs.constant_value()) {
                    if let Some(value) = self.fold(a, b) {
                        return Polynomial::constant(value);
                    }
                }
            }
        }
        Polynomial::symbol(Symbol::Operation(Rc::new(SymbolicOp::Binary {
            op: self,
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        })))
    }
}

/// An operation captured as an opaque, structurally compared unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolicOp {
    /// A binary operation over two polynomials.
    Binary {
        /// The operation.
        op: SymbolicBinOp,
        /// Left operand.
        lhs: Polynomial,
        /// Right operand.
        rhs: Polynomial,
    },
    /// A call to an external integer function.
    Call {
        /// Function identifier.
        function: Rc<str>,
        /// Integer arguments.
        args: Vec<Polynomial>,
    },
}

/// Anything that can appear as a base in a monomial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// A named unknown.
    Named(Indeterminate),
    /// A symbolic operation node.
    Operation(Rc<SymbolicOp>),
}

impl Symbol {
    /// Whether `indeterminate` occurs in this symbol, including inside
    /// the operands of symbolic nodes.
    pub fn contains(&self, indeterminate: &Indeterminate) -> bool {
        match self {
            Symbol::Named(name) => name == indeterminate,
            Symbol::Operation(op) => match op.as_ref() {
                SymbolicOp::Binary { lhs, rhs, .. } => {
                    lhs.contains(indeterminate) || rhs.contains(indeterminate)
                }
                SymbolicOp::Call { args, .. } => args.iter().any(|a| a.contains(indeterminate)),
            },
        }
    }

    /// Replace `indeterminate` by `value`, re-evaluating symbolic nodes.
    pub fn substitute(&self, indeterminate: &Indeterminate, value: &Polynomial) -> Polynomial {
        match self {
            Symbol::Named(name) if name == indeterminate => value.clone(),
            Symbol::Named(_) => Polynomial::symbol(self.clone()),
            Symbol::Operation(op) => match op.as_ref() {
                SymbolicOp::Binary { op, lhs, rhs } => op.apply(
                    &lhs.substitute(indeterminate, value),
                    &rhs.substitute(indeterminate, value),
                ),
                SymbolicOp::Call { function, args } => {
                    Polynomial::symbol(Symbol::Operation(Rc::new(SymbolicOp::Call {
                        function: Rc::clone(function),
                        args: args
                            .iter()
                            .map(|a| a.substitute(indeterminate, value))
                            .collect(),
                    })))
                }
            },
        }
    }
}

impl From<Indeterminate> for Symbol {
    fn from(indeterminate: Indeterminate) -> Self {
        Symbol::Named(indeterminate)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Named(name) => write!(f, "{name}"),
            Symbol::Operation(op) => match op.as_ref() {
                SymbolicOp::Binary { op, lhs, rhs } => {
                    write!(f, "({lhs} {} {rhs})", op.token())
                }
                SymbolicOp::Call { function, args } => {
                    write!(f, "{function}(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(")")
                }
            },
        }
    }
}
