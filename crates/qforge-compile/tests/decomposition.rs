//! Integration tests for lowering operation calls into primitive
//! instructions.
//!
//! Every test lowers against a named register `t`, so the only
//! declarations that appear are those of derived accessors.

use std::rc::Rc;

use qforge_compile::{
    BasicBlock, BlockInstruction, CodeGenerator, CompileError, DecomposedBasicBlock, Instruction,
    InstructionKind, IntermediateFunction, IntermediateModule, ListingGenerator, OperationCall,
};
use qforge_ir::{
    BoolExpr, ClassicalExpr, ClassicalType, ClassicalVariable, ElementaryOperation, Indeterminate,
    IntExpr, IntRange, IrError, Location, OperationDef, OperationExpr, QuantumParameter,
    QuantumVariable, QubitAccessor, StandardGate,
};

/// Helper: a named register of constant size.
fn register(name: &str, size: i64) -> QubitAccessor {
    QubitAccessor::variable(QuantumVariable::qvar(name, IntExpr::constant(size)))
}

fn gate(g: StandardGate) -> OperationExpr {
    OperationExpr::standard(g)
}

/// Helper: lower a single call in a fresh block.
fn lower(op: OperationExpr, target: &QubitAccessor) -> DecomposedBasicBlock {
    let mut block = BasicBlock::new();
    block.apply(op, target.clone(), None).unwrap();
    block.decompose().unwrap().clone()
}

fn apply(g: StandardGate, target: &QubitAccessor) -> Instruction {
    Instruction::apply(ElementaryOperation::Standard(g), target.clone())
}

fn declare(accessor: &QubitAccessor) -> Instruction {
    Instruction::declaration(accessor).unwrap()
}

/// Helper: a user operation whose register size is `size(n)` for a hidden `n`.
fn inferred_operation(name: &str, size: impl Fn(IntExpr) -> IntExpr) -> OperationExpr {
    let hidden = Indeterminate::new(format!("__size_{name}"));
    let param = QuantumParameter::inferred("q", size(IntExpr::variable(&hidden)), hidden);
    let def = OperationDef::new(name, vec![], vec![param]).unwrap();
    OperationExpr::user_defined(Rc::new(def), vec![]).unwrap()
}

fn user_call_args(block: &DecomposedBasicBlock) -> Vec<ClassicalExpr> {
    block
        .iter()
        .find_map(|instruction| match &instruction.kind {
            InstructionKind::ElementaryOperationCall {
                operation: ElementaryOperation::UserDefined { args, .. },
                ..
            } => Some(args.clone()),
            _ => None,
        })
        .unwrap()
}

// ============================================================================
// Operation shapes
// ============================================================================

#[test]
fn test_sequential_emits_in_listed_order() {
    let t = register("t", 1);
    let op = OperationExpr::sequential(vec![
        gate(StandardGate::H),
        gate(StandardGate::S),
        gate(StandardGate::T),
    ])
    .unwrap();

    let out = lower(op, &t);
    assert_eq!(
        out.instructions(),
        &[
            apply(StandardGate::H, &t),
            apply(StandardGate::S, &t),
            apply(StandardGate::T, &t),
        ]
    );
}

#[test]
fn test_combined_declares_and_applies_each_part() {
    let t = register("t", 3);
    let op = OperationExpr::combined(vec![
        gate(StandardGate::H),
        gate(StandardGate::X),
        gate(StandardGate::Z),
    ])
    .unwrap();

    let parts: Vec<QubitAccessor> = (0..3)
        .map(|i| t.slice(IntExpr::constant(i), IntExpr::constant(i + 1)).unwrap())
        .collect();

    let out = lower(op, &t);
    assert_eq!(
        out.instructions(),
        &[
            declare(&parts[0]),
            apply(StandardGate::H, &parts[0]),
            declare(&parts[1]),
            apply(StandardGate::X, &parts[1]),
            declare(&parts[2]),
            apply(StandardGate::Z, &parts[2]),
        ]
    );
}

#[test]
fn test_combined_uses_running_offset_for_wide_parts() {
    let t = register("t", 3);
    let op = OperationExpr::combined(vec![gate(StandardGate::Swap), gate(StandardGate::H)]).unwrap();

    let out = lower(op, &t);
    let pair = t.slice(IntExpr::constant(0), IntExpr::constant(2)).unwrap();
    let last = t.index(IntExpr::constant(2)).unwrap();
    assert_eq!(out.instructions()[0], declare(&pair));
    assert_eq!(out.instructions()[1], apply(StandardGate::Swap, &pair));
    assert_eq!(out.instructions()[2], declare(&last));
}

#[test]
fn test_extended_becomes_loop_over_single_qubits() {
    let t = register("t", 3);
    let op = OperationExpr::extended(gate(StandardGate::H), IntExpr::constant(3));

    let out = lower(op, &t);
    assert_eq!(out.len(), 1);
    let InstructionKind::ForLoop {
        iterator,
        range,
        body,
    } = &out.instructions()[0].kind
    else {
        panic!("expected a for loop, got {}", out.instructions()[0]);
    };

    assert_eq!(iterator.ty, ClassicalType::Int);
    assert_eq!(*range, IntRange::exclusive(IntExpr::constant(0), IntExpr::constant(3)));

    let element = t.index(iterator.int_expr()).unwrap();
    assert_eq!(
        body.instructions(),
        &[declare(&element), apply(StandardGate::H, &element)]
    );
}

#[test]
fn test_extended_wide_operation_uses_strided_slices() {
    let n = IntExpr::named("n");
    let t = QubitAccessor::variable(QuantumVariable::qvar("t", n.clone() * 2));
    let op = OperationExpr::extended(gate(StandardGate::Swap), n.clone());

    let out = lower(op, &t);
    let InstructionKind::ForLoop { iterator, range, body } = &out.instructions()[0].kind else {
        panic!("expected a for loop");
    };
    assert_eq!(range.end, n);

    let i = iterator.int_expr();
    let pair = t.slice(&i * 2, &i * 2 + 2).unwrap();
    assert_eq!(pair.size().constant_value(), Some(2));
    assert_eq!(body.instructions()[1], apply(StandardGate::Swap, &pair));
}

#[test]
fn test_dagger_wraps_sequence() {
    let t = register("t", 1);
    let op = OperationExpr::dagger(
        OperationExpr::sequential(vec![gate(StandardGate::H), gate(StandardGate::T)]).unwrap(),
    );

    let out = lower(op, &t);
    assert_eq!(
        out.instructions(),
        &[
            Instruction::begin_dagger(),
            apply(StandardGate::H, &t),
            apply(StandardGate::T, &t),
            Instruction::end_dagger(),
        ]
    );
}

#[test]
fn test_identity_gate_is_dropped() {
    let t = register("t", 2);
    let op = OperationExpr::combined(vec![gate(StandardGate::I), gate(StandardGate::X)]).unwrap();
    let out = lower(op, &t);
    let second = t.index(IntExpr::constant(1)).unwrap();
    assert_eq!(out.instructions(), &[declare(&second), apply(StandardGate::X, &second)]);
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_use_is_idempotent_within_a_block() {
    let t = register("t", 4);
    let q1 = t.index(IntExpr::constant(1)).unwrap();

    let mut block = BasicBlock::new();
    block.apply(gate(StandardGate::H), q1.clone(), None).unwrap();
    block.apply(gate(StandardGate::X), q1.clone(), None).unwrap();

    let out = block.decompose().unwrap();
    assert_eq!(out.iter().filter(|i| i.is_declaration()).count(), 1);
    assert_eq!(out.len(), 3);
}

#[test]
fn test_identical_slices_share_one_declaration() {
    let t = register("t", 4);
    let a = t.slice(IntExpr::constant(0), IntExpr::constant(2)).unwrap();
    let b = t.slice(IntExpr::constant(0), IntExpr::constant(2)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.ident(), b.ident());

    let mut block = BasicBlock::new();
    block.apply(gate(StandardGate::Swap), a, None).unwrap();
    block.apply(gate(StandardGate::ISwap), b, None).unwrap();

    let out = block.decompose().unwrap();
    assert_eq!(out.iter().filter(|i| i.is_declaration()).count(), 1);
}

#[test]
fn test_allocations_never_unify() {
    let a = QubitAccessor::alloc(IntExpr::constant(1));
    let b = QubitAccessor::alloc(IntExpr::constant(1));
    assert_ne!(a, b);

    let mut block = BasicBlock::new();
    block.apply(gate(StandardGate::H), a, None).unwrap();
    block.apply(gate(StandardGate::H), b, None).unwrap();
    let out = block.decompose().unwrap();
    assert_eq!(out.iter().filter(|i| i.is_declaration()).count(), 2);
}

#[test]
fn test_sibling_branches_declare_separately() {
    let t = register("t", 2);
    let q0 = t.index(IntExpr::constant(0)).unwrap();

    let mut then_block = BasicBlock::new();
    then_block.apply(gate(StandardGate::X), q0.clone(), None).unwrap();
    let mut else_block = BasicBlock::new();
    else_block.apply(gate(StandardGate::Z), q0.clone(), None).unwrap();

    let mut block = BasicBlock::new();
    block.push(BlockInstruction::ClassicalIf {
        condition: BoolExpr::variable("flag"),
        if_branch: then_block,
        else_branch: Some(else_block),
        location: None,
    });
    block.apply(gate(StandardGate::H), q0.clone(), None).unwrap();

    let out = block.decompose().unwrap();
    let InstructionKind::IfStatement {
        if_branch,
        else_branch: Some(else_branch),
        ..
    } = &out.instructions()[0].kind
    else {
        panic!("expected an if statement");
    };
    assert_eq!(if_branch.instructions()[0], declare(&q0));
    assert_eq!(else_branch.instructions()[0], declare(&q0));
    // Popped frames are forgotten, so the outer block declares again.
    assert_eq!(out.instructions()[1], declare(&q0));
}

#[test]
fn test_outer_declaration_visible_in_loop_body() {
    let t = register("t", 2);
    let q0 = t.index(IntExpr::constant(0)).unwrap();

    let mut body = BasicBlock::new();
    body.apply(gate(StandardGate::X), q0.clone(), None).unwrap();

    let mut block = BasicBlock::new();
    block.apply(gate(StandardGate::H), q0.clone(), None).unwrap();
    block.push(BlockInstruction::ForLoop {
        iterator: ClassicalVariable::new("k", ClassicalType::Int),
        range: IntRange::exclusive(IntExpr::constant(0), IntExpr::named("reps")),
        body,
        location: None,
    });

    let out = block.decompose().unwrap();
    let InstructionKind::ForLoop { body, .. } = &out.instructions()[2].kind else {
        panic!("expected a for loop");
    };
    assert_eq!(body.instructions(), &[apply(StandardGate::X, &q0)]);
}

#[test]
fn test_with_block_uncomputes_without_redeclaring() {
    let t = register("t", 2);
    let q1 = t.index(IntExpr::constant(1)).unwrap();

    let mut compute = BasicBlock::new();
    compute.apply(gate(StandardGate::H), q1.clone(), None).unwrap();
    let mut body = BasicBlock::new();
    body.apply(gate(StandardGate::Z), q1.clone(), None).unwrap();

    let mut block = BasicBlock::new();
    block.push(BlockInstruction::With {
        compute,
        body,
        location: None,
    });

    let out = block.decompose().unwrap();
    let InstructionKind::WithBlock { compute, body } = &out.instructions()[0].kind else {
        panic!("expected a with block");
    };
    assert_eq!(compute.instructions()[0], declare(&q1));
    assert_eq!(body.instructions(), &[apply(StandardGate::Z, &q1)]);

    let mut listing = ListingGenerator::default();
    out.emit(&mut listing);
    let text = listing.finish();
    assert_eq!(text.matches("qref ").count(), 1);
    assert_eq!(text.matches("h qubitIndexing_").count(), 2);
    assert!(text.contains("dagger {"));
}

#[test]
fn test_composite_accessor_declares_constituents_first() {
    let t = register("t", 4);
    let head = t.slice(IntExpr::constant(0), IntExpr::constant(2)).unwrap();
    let ancilla = QubitAccessor::alloc_with_init(IntExpr::constant(1), IntExpr::constant(1));
    let joined = QubitAccessor::concat(vec![head.clone(), ancilla.clone()]);

    let mut block = BasicBlock::new();
    block.push(Instruction::measure(joined.clone()));
    let out = block.decompose().unwrap();
    assert_eq!(
        out.instructions(),
        &[
            declare(&head),
            declare(&ancilla),
            declare(&joined),
            Instruction::measure(joined),
        ]
    );
}

// ============================================================================
// Size checks and inference
// ============================================================================

#[test]
fn test_construction_time_size_mismatch() {
    let t = register("t", 3);
    let err = OperationCall::new(gate(StandardGate::Swap), t, Some(Location::new("m.qf", 3, 1)))
        .unwrap_err();
    assert!(matches!(err, IrError::SizeMismatch { .. }));
    assert!(err.to_string().starts_with("m.qf:3:1: size mismatch"));

    let err = OperationExpr::sequential(vec![gate(StandardGate::H), gate(StandardGate::Swap)])
        .unwrap_err();
    assert!(matches!(err, IrError::SizeMismatch { .. }));
}

#[test]
fn test_symbolic_sizes_are_accepted_until_known_to_differ() {
    let n = IntExpr::named("n");
    let t = QubitAccessor::variable(QuantumVariable::qvar("t", n.clone()));
    let op = OperationExpr::extended(gate(StandardGate::H), n.clone());
    assert!(OperationCall::new(op, t.clone(), None).is_ok());

    let wrong = OperationExpr::extended(gate(StandardGate::H), n + 1);
    assert!(OperationCall::new(wrong, t, None).is_err());
}

#[test]
fn test_size_inference_prepends_hidden_argument() {
    let t = register("t", 5);
    let out = lower(inferred_operation("qft", |n| n), &t);
    assert_eq!(user_call_args(&out), vec![ClassicalExpr::Int(IntExpr::constant(5))]);

    let t = register("t", 7);
    let out = lower(inferred_operation("odd", |n| n * 2 + 1), &t);
    assert_eq!(user_call_args(&out), vec![ClassicalExpr::Int(IntExpr::constant(3))]);
}

#[test]
fn test_size_inference_against_symbolic_target() {
    let m = IntExpr::named("m");
    let t = QubitAccessor::variable(QuantumVariable::qvar("t", m.clone() * 4 + 2));
    let out = lower(inferred_operation("pairs", |n| n * 2 + 2), &t);
    assert_eq!(user_call_args(&out), vec![ClassicalExpr::Int(m * 2)]);
}

#[test]
fn test_unsolvable_inference_is_a_located_diagnostic() {
    let t = register("t", 3);
    let mut body = BasicBlock::new();
    body.apply(
        inferred_operation("even", |n| n * 2),
        t,
        Some(Location::new("main.qf", 7, 3)),
    )
    .unwrap();

    let mut module = IntermediateModule::new();
    module.add_function(IntermediateFunction::operation(
        "caller",
        false,
        vec![],
        vec![QuantumVariable::qvar("t", IntExpr::constant(3))],
        Some(body),
    ));

    let diagnostics = module.lower().unwrap_err();
    assert_eq!(diagnostics.len(), 1);
    let rendered = diagnostics.to_string();
    assert!(rendered.starts_with(
        "main.qf:7:3: error: Unable to solve quantum parameter size inference expression"
    ));
}

#[test]
fn test_unsolvable_inference_error_kind() {
    let t = register("t", 4);
    let mut block = BasicBlock::new();
    block
        .apply(inferred_operation("square", |n| &n * &n), t, None)
        .unwrap();
    assert!(matches!(
        block.decompose(),
        Err(CompileError::UnsolvableSizeInference { .. })
    ));
}

#[test]
fn test_inferred_extension_splits_target_evenly() {
    let t = register("t", 6);
    let op = OperationExpr::extended(inferred_operation("qft", |n| n), IntExpr::constant(2));
    let out = lower(op, &t);
    let InstructionKind::ForLoop { body, .. } = &out.instructions()[0].kind else {
        panic!("expected a for loop");
    };
    assert_eq!(user_call_args(body), vec![ClassicalExpr::Int(IntExpr::constant(3))]);
}

#[test]
fn test_inferred_extension_rejects_uneven_split() {
    let t = register("t", 5);
    let op = OperationExpr::extended(inferred_operation("qft", |n| n), IntExpr::constant(2));
    let mut block = BasicBlock::new();
    block
        .apply(op, t, Some(Location::new("main.qf", 4, 9)))
        .unwrap();

    let err = block.decompose().unwrap_err();
    assert!(matches!(err, CompileError::UnevenExtension { .. }));
    assert_eq!(err.location().map(|l| (l.line, l.column)), Some((4, 9)));
    assert!(err.to_string().contains("size 5 into 2 equal parts"));
}

#[test]
fn test_sequential_element_must_match_symbolic_target() {
    let t = QubitAccessor::variable(QuantumVariable::qvar("t", IntExpr::named("m")));
    let matching = OperationExpr::sequential(vec![OperationExpr::extended(
        gate(StandardGate::H),
        IntExpr::named("m"),
    )])
    .unwrap();
    assert_eq!(lower(matching, &t).len(), 1);

    let other = OperationExpr::sequential(vec![OperationExpr::extended(
        gate(StandardGate::H),
        IntExpr::named("n"),
    )])
    .unwrap();
    let mut block = BasicBlock::new();
    block.apply(other, t, None).unwrap();
    assert!(matches!(
        block.decompose(),
        Err(CompileError::Ir(IrError::SizeMismatch { .. }))
    ));
}

#[test]
fn test_inference_on_fixed_size_is_rejected_at_definition() {
    let hidden = Indeterminate::new("__size_fixed");
    let param = QuantumParameter::inferred("q", IntExpr::constant(2), hidden);
    assert!(matches!(
        OperationDef::new("fixed", vec![], vec![param]),
        Err(IrError::UnusedSizeInference { .. })
    ));
}

// ============================================================================
// Modules
// ============================================================================

#[test]
fn test_module_collects_one_diagnostic_per_failing_function() {
    let mut module = IntermediateModule::new();
    for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
        let t = register("t", 3);
        let mut body = BasicBlock::new();
        let op = if i == 1 {
            gate(StandardGate::H)
        } else {
            inferred_operation(name, |n| n * 2)
        };
        let target = if i == 1 { t.index(IntExpr::constant(0)).unwrap() } else { t };
        body.apply(op, target, None).unwrap();
        module.add_function(
            IntermediateFunction::operation(name, true, vec![], vec![], Some(body))
                .with_location(Location::new("lib.qf", u32::try_from(i).unwrap() + 1, 1)),
        );
    }

    let diagnostics = module.lower().unwrap_err();
    assert_eq!(diagnostics.len(), 2);
    let lines: Vec<u32> = diagnostics
        .iter()
        .filter_map(|d| d.location.as_ref().map(|l| l.line))
        .collect();
    assert_eq!(lines, vec![1, 3]);
}

#[test]
fn test_module_emits_constants_then_functions() {
    let q = QuantumVariable::qvar("q", IntExpr::constant(1));
    let mut body = BasicBlock::new();
    body.apply(gate(StandardGate::X), QubitAccessor::variable(q.clone()), None)
        .unwrap();

    let mut module = IntermediateModule::new();
    module.add_function(IntermediateFunction::operation("flip", true, vec![], vec![q], Some(body)));
    module.add_function(IntermediateFunction::operation("ext", false, vec![], vec![], None));
    module.add_constant(qforge_compile::ConstantDef::new(
        ClassicalVariable::new("SHOTS", ClassicalType::Int),
        IntExpr::constant(1024),
    ));

    let lowered = module.lower().unwrap();
    assert_eq!(lowered.functions().count(), 2);
    let mut listing = ListingGenerator::default();
    let text = lowered.dump_code(&mut listing);
    let const_at = text.find("const SHOTS").unwrap();
    let flip_at = text.find("operation flip").unwrap();
    let ext_at = text.find("extern operation ext").unwrap();
    assert!(const_at < flip_at && flip_at < ext_at);
    assert!(listing.finish().is_empty());
}
