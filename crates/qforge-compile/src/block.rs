//! Basic blocks: instruction lists that may still need lowering.

use std::cell::OnceCell;

use qforge_ir::{
    BoolExpr, ClassicalVariable, IntRange, IrResult, Location, OperationExpr, QubitAccessor,
};

use crate::error::CompileResult;
use crate::instruction::{DecomposedBasicBlock, Instruction};
use crate::lower::Lowerer;
use crate::mux;

/// An operation applied to a target register.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationCall {
    operation: OperationExpr,
    target: QubitAccessor,
    location: Option<Location>,
}

impl OperationCall {
    /// Apply `operation` to `target`.
    ///
    /// Fails when both sizes are known and differ.
    pub fn new(
        operation: OperationExpr,
        target: QubitAccessor,
        location: Option<Location>,
    ) -> IrResult<Self> {
        operation.check_target(&target, location.as_ref())?;
        Ok(Self {
            operation,
            target,
            location,
        })
    }

    /// The applied operation.
    pub fn operation(&self) -> &OperationExpr {
        &self.operation
    }

    /// The target register.
    pub fn target(&self) -> &QubitAccessor {
        &self.target
    }

    /// Call site.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}

/// A choice between `2^k` blocks driven by `k` quantum controls.
#[derive(Debug, Clone)]
pub struct QuantumMux {
    controls: Vec<QubitAccessor>,
    blocks: Vec<BasicBlock>,
    location: Option<Location>,
}

impl QuantumMux {
    /// Create a mux. Block `i` runs when control `p` is in state bit `p`
    /// of `i`.
    pub fn new(
        controls: Vec<QubitAccessor>,
        blocks: Vec<BasicBlock>,
        location: Option<Location>,
    ) -> IrResult<Self> {
        mux::check_shape(controls.len(), blocks.len())?;
        Ok(Self {
            controls,
            blocks,
            location,
        })
    }

    /// Control accessors.
    pub fn controls(&self) -> &[QubitAccessor] {
        &self.controls
    }

    /// One block per control assignment.
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Source location.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}

/// An instruction inside a [`BasicBlock`].
#[derive(Debug, Clone)]
pub enum BlockInstruction {
    /// Already primitive.
    Primitive(Instruction),
    /// Operation application, lowered by shape.
    OperationCall(OperationCall),
    /// Counted loop.
    ForLoop {
        /// Loop index.
        iterator: ClassicalVariable,
        /// Index range.
        range: IntRange,
        /// Body.
        body: BasicBlock,
        /// Source location.
        location: Option<Location>,
    },
    /// Classical conditional.
    ClassicalIf {
        /// Condition.
        condition: BoolExpr,
        /// Taken when true.
        if_branch: BasicBlock,
        /// Taken when false.
        else_branch: Option<BasicBlock>,
        /// Source location.
        location: Option<Location>,
    },
    /// Body applied as its conjugate transpose.
    Dagger {
        /// Body.
        body: BasicBlock,
        /// Source location.
        location: Option<Location>,
    },
    /// Compute, body, uncompute.
    With {
        /// Computation undone after the body.
        compute: BasicBlock,
        /// Body.
        body: BasicBlock,
        /// Source location.
        location: Option<Location>,
    },
    /// Quantum multiplexor.
    Mux(QuantumMux),
}

impl From<Instruction> for BlockInstruction {
    fn from(instruction: Instruction) -> Self {
        BlockInstruction::Primitive(instruction)
    }
}

impl From<OperationCall> for BlockInstruction {
    fn from(call: OperationCall) -> Self {
        BlockInstruction::OperationCall(call)
    }
}

impl From<QuantumMux> for BlockInstruction {
    fn from(mux: QuantumMux) -> Self {
        BlockInstruction::Mux(mux)
    }
}

/// An ordered list of block instructions with a cached lowering.
#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    instructions: Vec<BlockInstruction>,
    decomposed: OnceCell<DecomposedBasicBlock>,
}

impl BasicBlock {
    /// An empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instruction.
    pub fn push(&mut self, instruction: impl Into<BlockInstruction>) {
        self.decomposed.take();
        self.instructions.push(instruction.into());
    }

    /// Append an operation call, checking sizes.
    pub fn apply(
        &mut self,
        operation: OperationExpr,
        target: QubitAccessor,
        location: Option<Location>,
    ) -> IrResult<()> {
        self.push(OperationCall::new(operation, target, location)?);
        Ok(())
    }

    /// Append the instructions of `other`.
    pub fn append(&mut self, other: BasicBlock) {
        self.decomposed.take();
        self.instructions.extend(other.instructions);
    }

    /// The instructions, in order.
    pub fn instructions(&self) -> &[BlockInstruction] {
        &self.instructions
    }

    /// Number of top-level instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if the block is empty.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Lower the block in a fresh scope. The result is computed once and
    /// cached until the block is modified.
    pub fn decompose(&self) -> CompileResult<&DecomposedBasicBlock> {
        if let Some(done) = self.decomposed.get() {
            return Ok(done);
        }
        let lowered = Lowerer::new().lower_block(self)?;
        Ok(self.decomposed.get_or_init(|| lowered))
    }
}

impl FromIterator<BlockInstruction> for BasicBlock {
    fn from_iter<I: IntoIterator<Item = BlockInstruction>>(iter: I) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
            decomposed: OnceCell::new(),
        }
    }
}

impl From<Vec<BlockInstruction>> for BasicBlock {
    fn from(instructions: Vec<BlockInstruction>) -> Self {
        instructions.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a BasicBlock {
    type Item = &'a BlockInstruction;
    type IntoIter = std::slice::Iter<'a, BlockInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qforge_ir::{IntExpr, IrError, QuantumVariable, StandardGate};

    fn reg(size: i64) -> QubitAccessor {
        QubitAccessor::variable(QuantumVariable::qvar("q", IntExpr::constant(size)))
    }

    #[test]
    fn test_operation_call_size_check() {
        let h = OperationExpr::standard(StandardGate::H);
        assert!(OperationCall::new(h.clone(), reg(1), None).is_ok());
        let err = OperationCall::new(h, reg(3), Some(Location::anonymous(2, 1))).unwrap_err();
        assert!(matches!(err, IrError::SizeMismatch { .. }));
        assert_eq!(err.location().map(|l| l.line), Some(2));
    }

    #[test]
    fn test_mux_shape() {
        let ctrl = reg(1);
        assert!(QuantumMux::new(vec![ctrl.clone()], vec![BasicBlock::new(); 2], None).is_ok());
        assert!(matches!(
            QuantumMux::new(vec![ctrl], vec![BasicBlock::new(); 3], None),
            Err(IrError::InvalidMux { .. })
        ));
    }

    #[test]
    fn test_decompose_is_cached_until_push() {
        let mut block = BasicBlock::new();
        block
            .apply(OperationExpr::standard(StandardGate::X), reg(1), None)
            .unwrap();
        let first = block.decompose().unwrap() as *const DecomposedBasicBlock;
        let second = block.decompose().unwrap() as *const DecomposedBasicBlock;
        assert_eq!(first, second);
        assert_eq!(block.decompose().unwrap().len(), 1);

        block.push(Instruction::measure(reg(1)));
        assert_eq!(block.decompose().unwrap().len(), 2);
    }
}
