//! Complex expressions used as operation coefficients.

use num_complex::Complex64;
use std::fmt;

use super::FloatExpr;

/// A complex scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum ComplexExpr {
    /// A known complex number.
    Constant(Complex64),
    /// `magnitude * e^(i * phase)`.
    Polar {
        /// Modulus.
        magnitude: FloatExpr,
        /// Argument in radians.
        phase: FloatExpr,
    },
}

impl ComplexExpr {
    /// A global phase `e^(i * phase)`.
    pub fn phase(phase: FloatExpr) -> Self {
        ComplexExpr::Polar {
            magnitude: FloatExpr::constant(1.0),
            phase,
        }
    }

    /// Evaluate when both parts are known.
    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            ComplexExpr::Constant(c) => Some(*c),
            ComplexExpr::Polar { magnitude, phase } => {
                Some(Complex64::from_polar(magnitude.as_f64()?, phase.as_f64()?))
            }
        }
    }
}

impl From<Complex64> for ComplexExpr {
    fn from(value: Complex64) -> Self {
        ComplexExpr::Constant(value)
    }
}

impl fmt::Display for ComplexExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexExpr::Constant(c) => write!(f, "({c})"),
            ComplexExpr::Polar { magnitude, phase } => write!(f, "({magnitude}*e^(i*{phase}))"),
        }
    }
}
