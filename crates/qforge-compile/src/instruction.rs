//! Primitive instructions produced by lowering.

use std::fmt;

use qforge_ir::{
    AccessorKind, BoolExpr, ClassicalExpr, ClassicalVariable, ElementaryOperation, IntExpr,
    IntRange, Location, QuantumVariable, QubitAccessor,
};

use crate::codegen::CodeGenerator;

/// The kind of a primitive instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
    /// First use of a declarable accessor.
    QubitDeclaration(QubitAccessor),
    /// Write an integer into qubits.
    QubitEncoding {
        /// Encoded qubits.
        target: QubitAccessor,
        /// Value.
        value: IntExpr,
    },
    /// A gate or user operation applied to a target.
    ElementaryOperationCall {
        /// The operation; user operations carry resolved arguments.
        operation: ElementaryOperation,
        /// Target qubits.
        target: QubitAccessor,
    },
    /// Open a control on `control` being `condition`.
    BeginControl {
        /// Control qubits.
        control: QubitAccessor,
        /// Required state.
        condition: bool,
    },
    /// Close the control on `control`.
    EndControl {
        /// Control qubits.
        control: QubitAccessor,
    },
    /// Open a daggered region.
    BeginDagger,
    /// Close a daggered region.
    EndDagger,
    /// Measure qubits.
    Measurement {
        /// Measured qubits.
        target: QubitAccessor,
    },
    /// Initialize a classical variable.
    ClassicalVariableAssignment {
        /// Assigned variable.
        variable: ClassicalVariable,
        /// Value.
        value: ClassicalExpr,
    },
    /// Bind a quantum variable to an accessor.
    QuantumVariableAssignment {
        /// Bound variable.
        variable: QuantumVariable,
        /// Qubits it refers to.
        accessor: QubitAccessor,
    },
    /// Counted loop with a lowered body.
    ForLoop {
        /// Loop index.
        iterator: ClassicalVariable,
        /// Index range.
        range: IntRange,
        /// Lowered body.
        body: DecomposedBasicBlock,
    },
    /// Classical conditional with lowered branches.
    IfStatement {
        /// Condition.
        condition: BoolExpr,
        /// Taken when true.
        if_branch: DecomposedBasicBlock,
        /// Taken when false.
        else_branch: Option<DecomposedBasicBlock>,
    },
    /// Compute, body, uncompute.
    WithBlock {
        /// Computation undone after the body.
        compute: DecomposedBasicBlock,
        /// Body.
        body: DecomposedBasicBlock,
    },
}

/// A primitive instruction with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Source location.
    pub location: Option<Location>,
}

impl Instruction {
    fn new(kind: InstructionKind) -> Self {
        Self {
            kind,
            location: None,
        }
    }

    /// Declare an accessor, or `None` for named registers.
    pub fn declaration(accessor: &QubitAccessor) -> Option<Self> {
        accessor
            .is_declarable()
            .then(|| Self::new(InstructionKind::QubitDeclaration(accessor.clone())))
    }

    /// Encode `value` into `target`.
    pub fn encode(target: QubitAccessor, value: IntExpr) -> Self {
        Self::new(InstructionKind::QubitEncoding { target, value })
    }

    /// Apply an elementary operation.
    pub fn apply(operation: ElementaryOperation, target: QubitAccessor) -> Self {
        Self::new(InstructionKind::ElementaryOperationCall { operation, target })
    }

    /// Open a control.
    pub fn begin_control(control: QubitAccessor, condition: bool) -> Self {
        Self::new(InstructionKind::BeginControl { control, condition })
    }

    /// Close a control.
    pub fn end_control(control: QubitAccessor) -> Self {
        Self::new(InstructionKind::EndControl { control })
    }

    /// Open a daggered region.
    pub fn begin_dagger() -> Self {
        Self::new(InstructionKind::BeginDagger)
    }

    /// Close a daggered region.
    pub fn end_dagger() -> Self {
        Self::new(InstructionKind::EndDagger)
    }

    /// Measure `target`.
    pub fn measure(target: QubitAccessor) -> Self {
        Self::new(InstructionKind::Measurement { target })
    }

    /// Initialize a classical variable.
    pub fn assign_classical(variable: ClassicalVariable, value: impl Into<ClassicalExpr>) -> Self {
        Self::new(InstructionKind::ClassicalVariableAssignment {
            variable,
            value: value.into(),
        })
    }

    /// Bind a quantum variable.
    pub fn assign_quantum(variable: QuantumVariable, accessor: QubitAccessor) -> Self {
        Self::new(InstructionKind::QuantumVariableAssignment { variable, accessor })
    }

    /// A loop over an already lowered body.
    pub fn for_loop(iterator: ClassicalVariable, range: IntRange, body: DecomposedBasicBlock) -> Self {
        Self::new(InstructionKind::ForLoop {
            iterator,
            range,
            body,
        })
    }

    /// A conditional over already lowered branches.
    pub fn if_statement(
        condition: BoolExpr,
        if_branch: DecomposedBasicBlock,
        else_branch: Option<DecomposedBasicBlock>,
    ) -> Self {
        Self::new(InstructionKind::IfStatement {
            condition,
            if_branch,
            else_branch,
        })
    }

    /// A compute-uncompute block over already lowered parts.
    pub fn with_block(compute: DecomposedBasicBlock, body: DecomposedBasicBlock) -> Self {
        Self::new(InstructionKind::WithBlock { compute, body })
    }

    /// Attach a source location.
    #[must_use]
    pub fn at(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    /// Check if this is a declaration.
    pub fn is_declaration(&self) -> bool {
        matches!(self.kind, InstructionKind::QubitDeclaration(_))
    }

    /// Check if this opens or closes a control.
    pub fn is_control(&self) -> bool {
        matches!(
            self.kind,
            InstructionKind::BeginControl { .. } | InstructionKind::EndControl { .. }
        )
    }

    /// Accessors this instruction refers to directly. Nested bodies of
    /// structural instructions are not included.
    pub fn referenced_accessors(&self) -> Vec<&QubitAccessor> {
        match &self.kind {
            InstructionKind::QubitDeclaration(accessor) => vec![accessor],
            InstructionKind::QubitEncoding { target, .. }
            | InstructionKind::ElementaryOperationCall { target, .. }
            | InstructionKind::Measurement { target } => vec![target],
            InstructionKind::BeginControl { control, .. } | InstructionKind::EndControl { control } => {
                vec![control]
            }
            InstructionKind::QuantumVariableAssignment { accessor, .. } => vec![accessor],
            InstructionKind::BeginDagger
            | InstructionKind::EndDagger
            | InstructionKind::ClassicalVariableAssignment { .. }
            | InstructionKind::ForLoop { .. }
            | InstructionKind::IfStatement { .. }
            | InstructionKind::WithBlock { .. } => vec![],
        }
    }

    /// Send this instruction to a code generator.
    pub fn emit<G: CodeGenerator + ?Sized>(&self, codegen: &mut G) {
        match &self.kind {
            InstructionKind::QubitDeclaration(accessor) => match accessor.kind() {
                AccessorKind::Alloc { init, .. } => {
                    codegen.declare_alloc(accessor, accessor.size());
                    if let Some(value) = init {
                        codegen.encode(accessor, value);
                    }
                }
                AccessorKind::Concat(parts) => codegen.declare_concat(accessor, parts),
                AccessorKind::Slicing {
                    subject,
                    start,
                    end,
                    step,
                } => codegen.declare_slice(accessor, subject, start, end, step),
                AccessorKind::Indexing { subject, index } => {
                    codegen.declare_index(accessor, subject, index);
                }
                AccessorKind::Variable(_) => {}
            },
            InstructionKind::QubitEncoding { target, value } => codegen.encode(target, value),
            InstructionKind::ElementaryOperationCall { operation, target } => match operation {
                ElementaryOperation::Standard(gate) => {
                    if !gate.is_identity() {
                        codegen.push_standard(gate, target);
                    }
                }
                ElementaryOperation::UserDefined { definition, args } => {
                    codegen.push_custom(definition, args, target);
                }
            },
            InstructionKind::BeginControl { control, condition } => {
                codegen.begin_control(control, *condition);
            }
            InstructionKind::EndControl { control } => codegen.end_control(control),
            InstructionKind::BeginDagger => codegen.begin_dagger(),
            InstructionKind::EndDagger => codegen.end_dagger(),
            InstructionKind::Measurement { target } => codegen.measure(target),
            InstructionKind::ClassicalVariableAssignment { variable, value } => {
                codegen.init_classical(variable, value);
            }
            InstructionKind::QuantumVariableAssignment { variable, accessor } => {
                codegen.assign_quantum(variable, accessor);
            }
            InstructionKind::ForLoop {
                iterator,
                range,
                body,
            } => {
                codegen.begin_for(iterator, range);
                body.emit(codegen);
                codegen.end_for();
            }
            InstructionKind::IfStatement {
                condition,
                if_branch,
                else_branch,
            } => {
                codegen.begin_if(condition);
                if_branch.emit(codegen);
                if let Some(else_branch) = else_branch {
                    codegen.begin_else();
                    else_branch.emit(codegen);
                }
                codegen.end_if();
            }
            InstructionKind::WithBlock { compute, body } => codegen.with_statement(compute, body),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            InstructionKind::QubitDeclaration(accessor) => {
                write!(f, "declare {} = {accessor}", accessor.ident())
            }
            InstructionKind::QubitEncoding { target, value } => {
                write!(f, "encode {} <- {value}", target.ident())
            }
            InstructionKind::ElementaryOperationCall { operation, target } => match operation {
                ElementaryOperation::Standard(gate) => write!(f, "{gate} {}", target.ident()),
                ElementaryOperation::UserDefined { definition, args } => {
                    write!(f, "{}(", definition.ident)?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ") {}", target.ident())
                }
            },
            InstructionKind::BeginControl { control, condition } => {
                write!(f, "begin_ctrl {} {condition}", control.ident())
            }
            InstructionKind::EndControl { control } => write!(f, "end_ctrl {}", control.ident()),
            InstructionKind::BeginDagger => f.write_str("begin_dagger"),
            InstructionKind::EndDagger => f.write_str("end_dagger"),
            InstructionKind::Measurement { target } => write!(f, "measure {}", target.ident()),
            InstructionKind::ClassicalVariableAssignment { variable, value } => {
                write!(f, "let {} = {value}", variable.ident)
            }
            InstructionKind::QuantumVariableAssignment { variable, accessor } => {
                write!(f, "qref {} = {}", variable.ident, accessor.ident())
            }
            InstructionKind::ForLoop {
                iterator,
                range,
                body,
            } => write!(f, "for {} in {range} ({} instructions)", iterator.ident, body.len()),
            InstructionKind::IfStatement { condition, .. } => write!(f, "if {condition}"),
            InstructionKind::WithBlock { compute, body } => {
                write!(f, "with ({} compute, {} body)", compute.len(), body.len())
            }
        }
    }
}

/// A flat list of primitive instructions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecomposedBasicBlock {
    instructions: Vec<Instruction>,
}

impl DecomposedBasicBlock {
    /// Wrap instructions.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// The instructions, in order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Unwrap into the instruction list.
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Iterate over the instructions.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// Number of top-level instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if the block is empty.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Total instruction count including nested bodies.
    pub fn deep_len(&self) -> usize {
        self.instructions
            .iter()
            .map(|instruction| {
                1 + match &instruction.kind {
                    InstructionKind::ForLoop { body, .. } => body.deep_len(),
                    InstructionKind::IfStatement {
                        if_branch,
                        else_branch,
                        ..
                    } => if_branch.deep_len() + else_branch.as_ref().map_or(0, Self::deep_len),
                    InstructionKind::WithBlock { compute, body } => {
                        compute.deep_len() + body.deep_len()
                    }
                    _ => 0,
                }
            })
            .sum()
    }

    /// The same block without top-level declarations, for replaying code
    /// whose accessors are already declared.
    pub fn without_declarations(&self) -> DecomposedBasicBlock {
        Self::new(
            self.instructions
                .iter()
                .filter(|instruction| !instruction.is_declaration())
                .cloned()
                .collect(),
        )
    }

    /// Send every instruction to a code generator.
    pub fn emit<G: CodeGenerator + ?Sized>(&self, codegen: &mut G) {
        for instruction in &self.instructions {
            instruction.emit(codegen);
        }
    }
}

impl From<Vec<Instruction>> for DecomposedBasicBlock {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}

impl<'a> IntoIterator for &'a DecomposedBasicBlock {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qforge_ir::StandardGate;

    fn reg() -> QubitAccessor {
        QubitAccessor::variable(QuantumVariable::qvar("q", IntExpr::constant(4)))
    }

    #[test]
    fn test_named_registers_have_no_declaration() {
        assert!(Instruction::declaration(&reg()).is_none());
        let slice = reg().slice(IntExpr::constant(0), IntExpr::constant(2)).unwrap();
        assert!(Instruction::declaration(&slice).unwrap().is_declaration());
    }

    #[test]
    fn test_referenced_accessors() {
        let q = reg();
        let call = Instruction::apply(ElementaryOperation::Standard(StandardGate::H), q.clone());
        assert_eq!(call.referenced_accessors(), vec![&q]);
        assert!(Instruction::begin_dagger().referenced_accessors().is_empty());
    }

    #[test]
    fn test_without_declarations() {
        let q = reg();
        let slice = q.index(IntExpr::constant(1)).unwrap();
        let block = DecomposedBasicBlock::new(vec![
            Instruction::declaration(&slice).unwrap(),
            Instruction::apply(ElementaryOperation::Standard(StandardGate::X), slice),
        ]);
        let replay = block.without_declarations();
        assert_eq!(replay.len(), 1);
        assert!(!replay.instructions()[0].is_declaration());
    }

    #[test]
    fn test_deep_len_counts_nested_bodies() {
        let body = DecomposedBasicBlock::new(vec![Instruction::measure(reg())]);
        let iterator = ClassicalVariable::new("i", qforge_ir::ClassicalType::Int);
        let range = IntRange::exclusive(IntExpr::constant(0), IntExpr::constant(3));
        let block = DecomposedBasicBlock::new(vec![Instruction::for_loop(iterator, range, body)]);
        assert_eq!(block.len(), 1);
        assert_eq!(block.deep_len(), 2);
    }

    #[test]
    fn test_display() {
        let q = reg();
        let call = Instruction::apply(ElementaryOperation::Standard(StandardGate::H), q.clone());
        assert_eq!(call.to_string(), "h q");
        assert_eq!(Instruction::begin_control(q, false).to_string(), "begin_ctrl q false");
    }
}
