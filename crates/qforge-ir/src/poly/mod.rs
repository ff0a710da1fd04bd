//! Symbolic integer arithmetic.
//!
//! Register sizes, indices and loop bounds are tracked at compile time as
//! canonical multivariate polynomials over named [`Indeterminate`]s. Integer
//! operations without a polynomial form (inexact division, modulo, bitwise
//! operators, shifts, symbolic powers and external function calls) are kept
//! as structurally compared [`SymbolicOp`] nodes that behave like fresh
//! indeterminates.

mod monomial;
mod polynomial;
mod symbol;

pub use monomial::{Monomial, Signature};
pub use polynomial::Polynomial;
pub use symbol::{Indeterminate, Symbol, SymbolicBinOp, SymbolicOp};
