//! Floating point expressions used for gate angles.

use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

use super::IntExpr;

/// A symbolic or concrete real-valued expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FloatExpr {
    /// A constant numeric value.
    Constant(f64),
    /// A classical variable of float type.
    Variable(Rc<str>),
    /// The constant π.
    Pi,
    /// An integer expression converted to float.
    FromInt(IntExpr),
    /// Negation.
    Neg(Box<FloatExpr>),
    /// Addition.
    Add(Box<FloatExpr>, Box<FloatExpr>),
    /// Subtraction.
    Sub(Box<FloatExpr>, Box<FloatExpr>),
    /// Multiplication.
    Mul(Box<FloatExpr>, Box<FloatExpr>),
    /// Division.
    Div(Box<FloatExpr>, Box<FloatExpr>),
}

impl FloatExpr {
    /// Create a constant.
    pub fn constant(value: f64) -> Self {
        FloatExpr::Constant(value)
    }

    /// Reference a float variable.
    pub fn variable(name: impl AsRef<str>) -> Self {
        FloatExpr::Variable(Rc::from(name.as_ref()))
    }

    /// The constant π.
    pub fn pi() -> Self {
        FloatExpr::Pi
    }

    /// Whether the expression depends on anything unknown at compile time.
    pub fn is_symbolic(&self) -> bool {
        match self {
            FloatExpr::Variable(_) => true,
            FloatExpr::Constant(_) | FloatExpr::Pi => false,
            FloatExpr::FromInt(i) => !i.is_constant(),
            FloatExpr::Neg(e) => e.is_symbolic(),
            FloatExpr::Add(a, b)
            | FloatExpr::Sub(a, b)
            | FloatExpr::Mul(a, b)
            | FloatExpr::Div(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Evaluate to a concrete value if possible.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FloatExpr::Constant(v) => Some(*v),
            FloatExpr::Variable(_) => None,
            FloatExpr::Pi => Some(PI),
            FloatExpr::FromInt(i) => i.constant_value().map(|v| v as f64),
            FloatExpr::Neg(e) => e.as_f64().map(|v| -v),
            FloatExpr::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            FloatExpr::Sub(a, b) => Some(a.as_f64()? - b.as_f64()?),
            FloatExpr::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            FloatExpr::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
        }
    }
}

impl fmt::Display for FloatExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatExpr::Constant(v) => write!(f, "{v}"),
            FloatExpr::Variable(name) => write!(f, "{name}"),
            FloatExpr::Pi => write!(f, "pi"),
            FloatExpr::FromInt(i) => write!(f, "float({i})"),
            FloatExpr::Neg(e) => write!(f, "-({e})"),
            FloatExpr::Add(a, b) => write!(f, "({a} + {b})"),
            FloatExpr::Sub(a, b) => write!(f, "({a} - {b})"),
            FloatExpr::Mul(a, b) => write!(f, "({a} * {b})"),
            FloatExpr::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

impl From<f64> for FloatExpr {
    fn from(value: f64) -> Self {
        FloatExpr::Constant(value)
    }
}

impl From<IntExpr> for FloatExpr {
    fn from(value: IntExpr) -> Self {
        FloatExpr::FromInt(value)
    }
}

impl Add for FloatExpr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        FloatExpr::Add(Box::new(self), Box::new(rhs))
    }
}

impl Sub for FloatExpr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        FloatExpr::Sub(Box::new(self), Box::new(rhs))
    }
}

impl Mul for FloatExpr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        FloatExpr::Mul(Box::new(self), Box::new(rhs))
    }
}

impl Div for FloatExpr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        FloatExpr::Div(Box::new(self), Box::new(rhs))
    }
}

impl Neg for FloatExpr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        FloatExpr::Neg(Box::new(self))
    }
}
