//! The interface between lowered modules and backend emitters.

use qforge_ir::{
    BoolExpr, ClassicalExpr, ClassicalVariable, IntExpr, IntRange, OperationDef, QuantumVariable,
    QubitAccessor, StandardGate,
};

use crate::instruction::DecomposedBasicBlock;
use crate::module::ConstantDef;

/// A backend sink receiving one call per primitive instruction.
///
/// Lowering guarantees that every declarable accessor is declared before
/// it is referenced, so implementations never track declarations
/// themselves. Accessors are referred to by [`QubitAccessor::ident`].
pub trait CodeGenerator {
    /// Start of the output file.
    fn begin_file(&mut self);

    /// End of the output file.
    fn end_file(&mut self);

    /// A module-level constant.
    fn def_constant(&mut self, constant: &ConstantDef);

    /// Start an operation definition; its body follows.
    fn begin_operation(
        &mut self,
        ident: &str,
        export: bool,
        classical_params: &[ClassicalVariable],
        quantum_params: &[QuantumVariable],
    );

    /// End the current operation definition.
    fn end_operation(&mut self);

    /// An operation implemented elsewhere.
    fn extern_operation(
        &mut self,
        ident: &str,
        export: bool,
        classical_params: &[ClassicalVariable],
        quantum_params: &[QuantumVariable],
    );

    /// Start a program definition; its body follows.
    fn begin_program(&mut self, ident: &str, params: &[ClassicalVariable], shots: &IntExpr);

    /// End the current program definition.
    fn end_program(&mut self);

    /// A program implemented elsewhere.
    fn extern_program(&mut self, ident: &str, params: &[ClassicalVariable]);

    /// Declare `size` fresh qubits.
    fn declare_alloc(&mut self, accessor: &QubitAccessor, size: &IntExpr);

    /// Declare the concatenation of `parts`.
    fn declare_concat(&mut self, accessor: &QubitAccessor, parts: &[QubitAccessor]);

    /// Declare a strided slice of `subject`.
    fn declare_slice(
        &mut self,
        accessor: &QubitAccessor,
        subject: &QubitAccessor,
        start: &IntExpr,
        end: &IntExpr,
        step: &IntExpr,
    );

    /// Declare a single qubit of `subject`.
    fn declare_index(&mut self, accessor: &QubitAccessor, subject: &QubitAccessor, index: &IntExpr);

    /// Encode an integer into qubits in basis states.
    fn encode(&mut self, target: &QubitAccessor, value: &IntExpr);

    /// Apply a built-in gate.
    fn push_standard(&mut self, gate: &StandardGate, target: &QubitAccessor);

    /// Call a user-defined operation with fully resolved classical arguments.
    fn push_custom(&mut self, definition: &OperationDef, args: &[ClassicalExpr], target: &QubitAccessor);

    /// Condition following operations on `control` being in `condition`.
    fn begin_control(&mut self, control: &QubitAccessor, condition: bool);

    /// Drop the condition on `control`.
    fn end_control(&mut self, control: &QubitAccessor);

    /// Following operations are applied as their conjugate transpose.
    fn begin_dagger(&mut self);

    /// End of the daggered region.
    fn end_dagger(&mut self);

    /// Measure qubits.
    fn measure(&mut self, target: &QubitAccessor);

    /// Initialize a classical variable.
    fn init_classical(&mut self, variable: &ClassicalVariable, value: &ClassicalExpr);

    /// Bind a quantum variable to an accessor.
    fn assign_quantum(&mut self, variable: &QuantumVariable, accessor: &QubitAccessor);

    /// Start a counted loop; the body follows.
    fn begin_for(&mut self, iterator: &ClassicalVariable, range: &IntRange);

    /// End the current loop.
    fn end_for(&mut self);

    /// Start a classical conditional; the if-branch follows.
    fn begin_if(&mut self, condition: &BoolExpr);

    /// Switch to the else-branch.
    fn begin_else(&mut self);

    /// End the current conditional.
    fn end_if(&mut self);

    /// Compute-uncompute: `compute`, then `body`, then the dagger of
    /// `compute`.
    fn with_statement(&mut self, compute: &DecomposedBasicBlock, body: &DecomposedBasicBlock) {
        compute.emit(self);
        body.emit(self);
        self.begin_dagger();
        compute.without_declarations().emit(self);
        self.end_dagger();
    }

    /// Take the generated text.
    fn finish(&mut self) -> String;
}
