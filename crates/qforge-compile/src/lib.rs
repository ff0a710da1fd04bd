//! qforge Lowering Framework
//!
//! This crate turns structured quantum code into a flat instruction stream
//! for backend code generators. Operation calls on symbolic registers are
//! expanded by shape, quantum controls over several blocks are linearized,
//! and every derived register is declared exactly once before it is used.
//!
//! # Architecture
//!
//! ```text
//! IntermediateModule
//!       │
//!       ▼
//! BasicBlock ── OperationCall / ForLoop / ClassicalIf / Dagger / With / Mux
//!       │
//!       ▼
//! ┌─────────┐
//! │ Lowerer │ ◄── DeclarationScopes (per-block "already declared" sets)
//! └─────────┘
//!       │
//!       ▼
//! DecomposedBasicBlock ── emit ──► CodeGenerator (e.g. ListingGenerator)
//! ```
//!
//! # Example: Lowering a Tensor Power
//!
//! ```rust
//! use qforge_compile::{BasicBlock, CodeGenerator, ListingGenerator};
//! use qforge_ir::{IntExpr, OperationExpr, QubitAccessor, QuantumVariable, StandardGate};
//!
//! let q = QubitAccessor::variable(QuantumVariable::qvar("q", IntExpr::constant(3)));
//! let wall = OperationExpr::extended(OperationExpr::standard(StandardGate::H), IntExpr::constant(3));
//!
//! let mut block = BasicBlock::new();
//! block.apply(wall, q, None).unwrap();
//!
//! let lowered = block.decompose().unwrap();
//! assert_eq!(lowered.len(), 1); // one for loop
//!
//! let mut listing = ListingGenerator::default();
//! lowered.emit(&mut listing);
//! assert!(listing.finish().contains("h qubitIndexing_"));
//! ```

pub mod block;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod instruction;
pub mod listing;
pub mod lower;
pub mod module;
pub mod mux;
pub mod scope;

pub use block::{BasicBlock, BlockInstruction, OperationCall, QuantumMux};
pub use codegen::CodeGenerator;
pub use config::{CompileConfig, TargetLanguage};
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use error::{CompileError, CompileResult};
pub use instruction::{DecomposedBasicBlock, Instruction, InstructionKind};
pub use listing::ListingGenerator;
pub use lower::Lowerer;
pub use module::{ConstantDef, FunctionKind, IntermediateFunction, IntermediateModule, LoweredModule};
pub use scope::DeclarationScopes;
