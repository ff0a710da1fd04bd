//! Boolean expressions for classical conditions.

use std::fmt;
use std::rc::Rc;

use super::IntExpr;

/// Integer comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    fn token(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn eval(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
        }
    }
}

/// A classical boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum BoolExpr {
    /// A literal.
    Constant(bool),
    /// A classical variable of bool type.
    Variable(Rc<str>),
    /// Negation.
    Not(Box<BoolExpr>),
    /// Conjunction.
    And(Box<BoolExpr>, Box<BoolExpr>),
    /// Disjunction.
    Or(Box<BoolExpr>, Box<BoolExpr>),
    /// Integer comparison.
    Compare {
        /// Operator.
        op: CompareOp,
        /// Left operand.
        lhs: IntExpr,
        /// Right operand.
        rhs: IntExpr,
    },
}

impl BoolExpr {
    /// Reference a bool variable.
    pub fn variable(name: impl AsRef<str>) -> Self {
        BoolExpr::Variable(Rc::from(name.as_ref()))
    }

    /// Compare two integers.
    pub fn compare(op: CompareOp, lhs: IntExpr, rhs: IntExpr) -> Self {
        BoolExpr::Compare { op, lhs, rhs }
    }

    /// Logical negation.
    #[must_use]
    pub fn negate(self) -> Self {
        BoolExpr::Not(Box::new(self))
    }

    /// Logical conjunction.
    #[must_use]
    pub fn and(self, rhs: BoolExpr) -> Self {
        BoolExpr::And(Box::new(self), Box::new(rhs))
    }

    /// Logical disjunction.
    #[must_use]
    pub fn or(self, rhs: BoolExpr) -> Self {
        BoolExpr::Or(Box::new(self), Box::new(rhs))
    }

    /// Evaluate when everything involved is known at compile time.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            BoolExpr::Constant(b) => Some(*b),
            BoolExpr::Variable(_) => None,
            BoolExpr::Not(e) => e.as_bool().map(|b| !b),
            BoolExpr::And(a, b) => match (a.as_bool(), b.as_bool()) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            BoolExpr::Or(a, b) => match (a.as_bool(), b.as_bool()) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            BoolExpr::Compare { op, lhs, rhs } => {
                Some(op.eval((lhs - rhs).constant_value()?, 0))
            }
        }
    }
}

impl From<bool> for BoolExpr {
    fn from(value: bool) -> Self {
        BoolExpr::Constant(value)
    }
}

impl fmt::Display for BoolExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolExpr::Constant(b) => write!(f, "{b}"),
            BoolExpr::Variable(name) => write!(f, "{name}"),
            BoolExpr::Not(e) => write!(f, "!({e})"),
            BoolExpr::And(a, b) => write!(f, "({a} && {b})"),
            BoolExpr::Or(a, b) => write!(f, "({a} || {b})"),
            BoolExpr::Compare { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.token()),
        }
    }
}
