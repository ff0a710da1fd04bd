//! qforge intermediate representation
//!
//! This crate provides the value types the qforge compiler's middle tier
//! works on: symbolic integers for register sizes, classical expressions,
//! qubit accessors and operation expressions. Everything here is an
//! immutable value; lowering to instructions lives in `qforge-compile`.
//!
//! # Core Components
//!
//! - **Symbolic integers**: [`Polynomial`] and [`IntExpr`] track sizes and
//!   indices that are only known at run time, e.g. `2*n + 1`
//! - **Qubit accessors**: [`QubitAccessor`] for registers, allocations,
//!   slices, single qubits and concatenations
//! - **Operations**: [`OperationExpr`] composes [`StandardGate`]s and
//!   user-defined operations by sequence, tensor product, tensor power,
//!   dagger, coefficient and quantum if
//!
//! # Example: Sizes Follow the Algebra
//!
//! ```rust
//! use qforge_ir::{IntExpr, OperationExpr, QubitAccessor, QuantumVariable, StandardGate};
//!
//! let n = IntExpr::named("n");
//! let q = QubitAccessor::variable(QuantumVariable::qvar("q", n.clone() * 2));
//!
//! // H applied to every qubit of the first half.
//! let op = OperationExpr::extended(OperationExpr::standard(StandardGate::H), n.clone());
//! let half = q.slice(IntExpr::constant(0), n.clone()).unwrap();
//!
//! assert_eq!(op.size(), half.size());
//! assert!(op.check_target(&half, None).is_ok());
//! ```

pub mod error;
pub mod expr;
pub mod gate;
pub mod location;
pub mod operation;
pub mod poly;
pub mod qubit;
pub mod variable;

pub use error::{IrError, IrResult, SolveError};
pub use expr::{BoolExpr, ClassicalExpr, CompareOp, ComplexExpr, FloatExpr, IntExpr, IntRange};
pub use gate::StandardGate;
pub use location::Location;
pub use operation::{ElementaryOperation, OperationExpr, OperationKind};
pub use poly::{Indeterminate, Polynomial, SymbolicBinOp};
pub use qubit::{AccessorKind, QubitAccessor};
pub use variable::{
    ClassicalType, ClassicalVariable, OperationDef, QuantumParameter, QuantumVariable,
    QuantumVariableKind,
};
