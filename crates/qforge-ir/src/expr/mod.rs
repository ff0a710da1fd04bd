//! Classical expressions.

mod boolean;
mod complex;
mod float;
mod int;

pub use boolean::{BoolExpr, CompareOp};
pub use complex::ComplexExpr;
pub use float::FloatExpr;
pub use int::IntExpr;

use std::fmt;

use crate::variable::ClassicalType;

/// A classical value of any supported type.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassicalExpr {
    /// Integer.
    Int(IntExpr),
    /// Float.
    Float(FloatExpr),
    /// Boolean.
    Bool(BoolExpr),
    /// Complex.
    Complex(ComplexExpr),
}

impl ClassicalExpr {
    /// The type of the value.
    pub fn ty(&self) -> ClassicalType {
        match self {
            ClassicalExpr::Int(_) => ClassicalType::Int,
            ClassicalExpr::Float(_) => ClassicalType::Float,
            ClassicalExpr::Bool(_) => ClassicalType::Bool,
            ClassicalExpr::Complex(_) => ClassicalType::Complex,
        }
    }

    /// The integer payload, if this is an integer.
    pub fn as_int(&self) -> Option<&IntExpr> {
        match self {
            ClassicalExpr::Int(i) => Some(i),
            _ => None,
        }
    }
}

impl From<IntExpr> for ClassicalExpr {
    fn from(value: IntExpr) -> Self {
        ClassicalExpr::Int(value)
    }
}

impl From<FloatExpr> for ClassicalExpr {
    fn from(value: FloatExpr) -> Self {
        ClassicalExpr::Float(value)
    }
}

impl From<BoolExpr> for ClassicalExpr {
    fn from(value: BoolExpr) -> Self {
        ClassicalExpr::Bool(value)
    }
}

impl From<ComplexExpr> for ClassicalExpr {
    fn from(value: ComplexExpr) -> Self {
        ClassicalExpr::Complex(value)
    }
}

impl fmt::Display for ClassicalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassicalExpr::Int(e) => write!(f, "{e}"),
            ClassicalExpr::Float(e) => write!(f, "{e}"),
            ClassicalExpr::Bool(e) => write!(f, "{e}"),
            ClassicalExpr::Complex(e) => write!(f, "{e}"),
        }
    }
}

/// An integer range used by for loops.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntRange {
    /// First value.
    pub start: IntExpr,
    /// Bound.
    pub end: IntExpr,
    /// Increment.
    pub step: IntExpr,
    /// Whether `end` itself is part of the range.
    pub inclusive: bool,
}

impl IntRange {
    /// `[start, end)` with step 1.
    pub fn exclusive(start: IntExpr, end: IntExpr) -> Self {
        IntRange {
            start,
            end,
            step: IntExpr::constant(1),
            inclusive: false,
        }
    }

    /// `[start, end]` with step 1.
    pub fn inclusive(start: IntExpr, end: IntExpr) -> Self {
        IntRange {
            start,
            end,
            step: IntExpr::constant(1),
            inclusive: true,
        }
    }

    /// Use a different step.
    #[must_use]
    pub fn step_by(mut self, step: IntExpr) -> Self {
        self.step = step;
        self
    }

    /// The exclusive upper bound.
    pub fn exclusive_end(&self) -> IntExpr {
        if self.inclusive {
            &self.end + 1
        } else {
            self.end.clone()
        }
    }

    /// Number of iterations, for positive steps.
    pub fn trip_count(&self) -> IntExpr {
        let span = &self.exclusive_end() - &self.start;
        if self.step == 1 {
            return span;
        }
        (span + &self.step - 1) / &self.step
    }
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let close = if self.inclusive { ']' } else { ')' };
        write!(f, "[{}, {}{close}", self.start, self.end)?;
        if self.step != 1 {
            write!(f, " step {}", self.step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_display() {
        let r = IntRange::exclusive(IntExpr::constant(0), IntExpr::constant(3));
        assert_eq!(r.to_string(), "[0, 3)");
        let r = IntRange::inclusive(IntExpr::constant(0), IntExpr::named("n")).step_by(IntExpr::constant(2));
        assert_eq!(r.to_string(), "[0, n] step 2");
    }

    #[test]
    fn test_trip_count() {
        let r = IntRange::exclusive(IntExpr::constant(0), IntExpr::named("n"));
        assert_eq!(r.trip_count(), IntExpr::named("n"));
        let r = IntRange::inclusive(IntExpr::constant(0), IntExpr::constant(9)).step_by(IntExpr::constant(3));
        assert_eq!(r.trip_count(), 4);
    }

    #[test]
    fn test_classical_type() {
        assert_eq!(ClassicalExpr::from(IntExpr::constant(1)).ty(), ClassicalType::Int);
        assert_eq!(ClassicalExpr::from(BoolExpr::from(true)).ty(), ClassicalType::Bool);
    }
}
