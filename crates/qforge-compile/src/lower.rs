//! The decomposition engine.
//!
//! Lowering turns a [`BasicBlock`] into a flat [`DecomposedBasicBlock`].
//! Operation calls are expanded by the shape of their operation expression
//! until only elementary calls remain, and every accessor is declared
//! before its first reference through the [`DeclarationScopes`] stack.

use tracing::{debug, instrument, trace, warn};

use qforge_ir::{
    ClassicalExpr, ClassicalType, ClassicalVariable, ElementaryOperation, IntExpr, IntRange,
    IrError, Location, OperationDef, OperationExpr, OperationKind, QubitAccessor,
};

use crate::block::{BasicBlock, BlockInstruction, OperationCall};
use crate::error::{CompileError, CompileResult};
use crate::instruction::{DecomposedBasicBlock, Instruction, InstructionKind};
use crate::mux::multiplex;
use crate::scope::DeclarationScopes;

/// Lowers blocks while tracking which accessors are declared.
#[derive(Debug, Default)]
pub struct Lowerer {
    scopes: DeclarationScopes,
}

impl Lowerer {
    /// A lowerer with only the root scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current scope stack.
    pub fn scopes(&self) -> &DeclarationScopes {
        &self.scopes
    }

    /// Lower every instruction of `block` in the current scope.
    #[instrument(skip_all, fields(instructions = block.len()))]
    pub fn lower_block(&mut self, block: &BasicBlock) -> CompileResult<DecomposedBasicBlock> {
        let mut out = Vec::new();
        for instruction in block {
            self.lower_instruction(instruction, &mut out)?;
        }
        trace!("Lowered block into {} instructions", out.len());
        Ok(out.into())
    }

    /// Lower a single operation call in the current scope.
    pub fn decompose(&mut self, call: &OperationCall) -> CompileResult<DecomposedBasicBlock> {
        let mut out = Vec::new();
        self.lower_call(call.operation(), call.target(), call.location(), &mut out)?;
        Ok(out.into())
    }

    /// Run `f` in a fresh frame. The frame is popped on success and on error.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> CompileResult<T>) -> CompileResult<T> {
        self.scopes.enter();
        let result = f(self);
        self.scopes.exit();
        result
    }

    fn nested_block(&mut self, block: &BasicBlock) -> CompileResult<DecomposedBasicBlock> {
        self.nested(|lowerer| lowerer.lower_block(block))
    }

    fn use_accessor(&mut self, accessor: &QubitAccessor, out: &mut Vec<Instruction>) {
        self.scopes.use_accessor(accessor, out);
    }

    fn lower_instruction(
        &mut self,
        instruction: &BlockInstruction,
        out: &mut Vec<Instruction>,
    ) -> CompileResult<()> {
        match instruction {
            BlockInstruction::Primitive(primitive) => self.push_primitive(primitive, out),
            BlockInstruction::OperationCall(call) => {
                self.lower_call(call.operation(), call.target(), call.location(), out)?;
            }
            BlockInstruction::ForLoop {
                iterator,
                range,
                body,
                location,
            } => {
                let body = self.nested_block(body)?;
                out.push(
                    Instruction::for_loop(iterator.clone(), range.clone(), body).at(location.clone()),
                );
            }
            BlockInstruction::ClassicalIf {
                condition,
                if_branch,
                else_branch,
                location,
            } => {
                let if_branch = self.nested_block(if_branch)?;
                let else_branch = else_branch
                    .as_ref()
                    .map(|branch| self.nested_block(branch))
                    .transpose()?;
                out.push(
                    Instruction::if_statement(condition.clone(), if_branch, else_branch)
                        .at(location.clone()),
                );
            }
            BlockInstruction::Dagger { body, location } => {
                let body = self.nested_block(body)?;
                out.push(Instruction::begin_dagger().at(location.clone()));
                out.extend(body.into_instructions());
                out.push(Instruction::end_dagger().at(location.clone()));
            }
            BlockInstruction::With {
                compute,
                body,
                location,
            } => {
                // The body sees the declarations made by the computation.
                let (compute, body) = self.nested(|lowerer| {
                    let compute = lowerer.lower_block(compute)?;
                    let body = lowerer.lower_block(body)?;
                    Ok((compute, body))
                })?;
                out.push(Instruction::with_block(compute, body).at(location.clone()));
            }
            BlockInstruction::Mux(mux) => {
                for control in mux.controls() {
                    self.use_accessor(control, out);
                }
                // Control toggles open no scope; blocks share the enclosing frame.
                let blocks = mux
                    .blocks()
                    .iter()
                    .map(|block| self.lower_block(block).map(DecomposedBasicBlock::into_instructions))
                    .collect::<CompileResult<Vec<_>>>()?;
                out.extend(multiplex(mux.controls(), blocks, mux.location())?);
            }
        }
        Ok(())
    }

    fn push_primitive(&mut self, instruction: &Instruction, out: &mut Vec<Instruction>) {
        if let InstructionKind::QubitDeclaration(accessor) = &instruction.kind {
            self.use_accessor(accessor, out);
            return;
        }
        for accessor in instruction.referenced_accessors() {
            self.use_accessor(accessor, out);
        }
        out.push(instruction.clone());
    }

    fn lower_call(
        &mut self,
        operation: &OperationExpr,
        target: &QubitAccessor,
        location: Option<&Location>,
        out: &mut Vec<Instruction>,
    ) -> CompileResult<()> {
        let location = location.or(operation.location());
        trace!("Lowering {} on {}", operation, target);

        match operation.kind() {
            OperationKind::Elementary(ElementaryOperation::Standard(gate)) => {
                if gate.is_identity() {
                    return Ok(());
                }
                self.use_accessor(target, out);
                out.push(
                    Instruction::apply(ElementaryOperation::Standard(gate.clone()), target.clone())
                        .at(location.cloned()),
                );
            }
            OperationKind::Elementary(ElementaryOperation::UserDefined { definition, args }) => {
                let args = resolve_args(definition, args, target, location)?;
                self.use_accessor(target, out);
                out.push(
                    Instruction::apply(
                        ElementaryOperation::UserDefined {
                            definition: definition.clone(),
                            args,
                        },
                        target.clone(),
                    )
                    .at(location.cloned()),
                );
            }
            OperationKind::SequentialMatMul(operations) => {
                for element in operations {
                    check_element_size(element, target, location)?;
                    self.lower_call(element, target, location, out)?;
                }
            }
            OperationKind::Combined(operations) => {
                let sizes = split_sizes(operation, operations, target, location)?;
                let mut offset = IntExpr::constant(0);
                for (child, size) in operations.iter().zip(sizes) {
                    let end = &offset + &size;
                    let part = target.slice(offset, end.clone())?;
                    self.lower_call(child, &part, location, out)?;
                    offset = end;
                }
            }
            OperationKind::Extended {
                operation: inner,
                multiplier,
            } => {
                let inner_size = if inner.is_size_determined() {
                    inner.size().clone()
                } else {
                    split_evenly(operation, multiplier, target, location)?
                };
                let iterator = ClassicalVariable::new(
                    format!("ext_iter_{:x}", operation.fingerprint()),
                    ClassicalType::Int,
                );
                let index = iterator.int_expr();
                let range = IntRange::exclusive(IntExpr::constant(0), multiplier.clone());
                debug!("Extending {} over {} with step {}", inner, range, inner_size);

                self.use_accessor(target, out);
                let body = self.nested(|lowerer| {
                    let part = if inner_size == 1 {
                        target.index(index)?
                    } else {
                        let start = &inner_size * &index;
                        let end = &start + &inner_size;
                        target.slice(start, end)?
                    };
                    let mut body = Vec::new();
                    lowerer.lower_call(inner, &part, location, &mut body)?;
                    Ok(DecomposedBasicBlock::new(body))
                })?;
                out.push(Instruction::for_loop(iterator, range, body).at(location.cloned()));
            }
            OperationKind::Dagger(inner) => {
                self.use_accessor(target, out);
                let body = self.nested(|lowerer| {
                    let mut body = Vec::new();
                    lowerer.lower_call(inner, target, location, &mut body)?;
                    Ok(body)
                })?;
                out.push(Instruction::begin_dagger().at(location.cloned()));
                out.extend(body);
                out.push(Instruction::end_dagger().at(location.cloned()));
            }
            OperationKind::Coefficient {
                operation: inner,
                coefficient,
            } => {
                warn!("Dropping global phase {} of {}", coefficient, inner);
                self.lower_call(inner, target, location, out)?;
            }
            OperationKind::QifApply {
                control,
                if_branch,
                else_branch,
            } => {
                self.use_accessor(control, out);
                self.use_accessor(target, out);
                let mut branches = Vec::with_capacity(2);
                for branch in [else_branch, if_branch] {
                    let mut body = Vec::new();
                    self.lower_call(branch, target, location, &mut body)?;
                    branches.push(body);
                }
                out.extend(multiplex(std::slice::from_ref(control), branches, location)?);
            }
        }
        Ok(())
    }
}

/// Every element of a sequential product acts on the whole target, so a
/// determined element size must equal the target size exactly.
fn check_element_size(
    element: &OperationExpr,
    target: &QubitAccessor,
    location: Option<&Location>,
) -> CompileResult<()> {
    if element.is_size_determined() && element.size() != target.size() {
        return Err(IrError::SizeMismatch {
            operation: element.to_string(),
            target: target.to_string(),
            expected: element.size().to_string(),
            got: target.size().to_string(),
            location: location.cloned(),
        }
        .into());
    }
    Ok(())
}

/// Size of one part when `target` is shared by `multiplier` copies of an
/// operation of undetermined size.
fn split_evenly(
    extended: &OperationExpr,
    multiplier: &IntExpr,
    target: &QubitAccessor,
    location: Option<&Location>,
) -> CompileResult<IntExpr> {
    let size = target.size();
    if let Some(part) = size.checked_div(multiplier) {
        return Ok(part);
    }
    if size.is_constant() && multiplier.is_constant() {
        return Err(CompileError::UnevenExtension {
            operation: extended.to_string(),
            target_size: size.to_string(),
            multiplier: multiplier.to_string(),
            location: location.cloned(),
        });
    }
    Ok(size / multiplier)
}

/// Prepend the solved hidden size argument for operations with size
/// inference.
fn resolve_args(
    definition: &OperationDef,
    args: &[ClassicalExpr],
    target: &QubitAccessor,
    location: Option<&Location>,
) -> CompileResult<Vec<ClassicalExpr>> {
    let Some(hidden) = definition.size_inference() else {
        return Ok(args.to_vec());
    };
    let solved = definition
        .size()
        .solve(target.size(), hidden)
        .map_err(|_| CompileError::UnsolvableSizeInference {
            operation: definition.ident.to_string(),
            expression: definition.size().to_string(),
            target_size: target.size().to_string(),
            location: location.cloned(),
        })?;
    debug!("Inferred {} = {} for {}", hidden, solved, definition.ident);

    let mut resolved = Vec::with_capacity(args.len() + 1);
    resolved.push(ClassicalExpr::Int(solved));
    resolved.extend(args.iter().cloned());
    Ok(resolved)
}

/// Sizes of the operands of a tensor combination. At most one operand may
/// have an undetermined size; it receives what the others leave over.
fn split_sizes(
    combined: &OperationExpr,
    operations: &[OperationExpr],
    target: &QubitAccessor,
    location: Option<&Location>,
) -> CompileResult<Vec<IntExpr>> {
    let mut undetermined = operations
        .iter()
        .enumerate()
        .filter(|(_, op)| !op.is_size_determined())
        .map(|(i, _)| i);
    let open = match (undetermined.next(), undetermined.next()) {
        (None, _) => None,
        (Some(i), None) => Some(i),
        (Some(_), Some(_)) => {
            return Err(CompileError::AmbiguousCombinedSize {
                operation: combined.to_string(),
                location: location.cloned(),
            });
        }
    };

    let mut sizes: Vec<IntExpr> = operations.iter().map(|op| op.size().clone()).collect();
    if let Some(open) = open {
        let known = sizes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != open)
            .fold(IntExpr::constant(0), |acc, (_, size)| acc + size);
        sizes[open] = target.size() - &known;
    }
    Ok(sizes)
}
