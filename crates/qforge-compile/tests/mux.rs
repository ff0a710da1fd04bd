//! Integration tests for multiplexed control decomposition.

use proptest::prelude::*;

use qforge_compile::mux::multiplex;
use qforge_compile::{BasicBlock, CodeGenerator, Instruction, InstructionKind, ListingGenerator, QuantumMux};
use qforge_ir::{ElementaryOperation, IntExpr, OperationExpr, QuantumVariable, QubitAccessor, StandardGate};

fn qubit(name: &str) -> QubitAccessor {
    QubitAccessor::variable(QuantumVariable::qvar(name, IntExpr::constant(1)))
}

/// Helper: a block applying `g` to the target register.
fn block_with(g: StandardGate, target: &QubitAccessor) -> BasicBlock {
    let mut block = BasicBlock::new();
    block
        .apply(OperationExpr::standard(g), target.clone(), None)
        .unwrap();
    block
}

fn apply(g: StandardGate, target: &QubitAccessor) -> Instruction {
    Instruction::apply(ElementaryOperation::Standard(g), target.clone())
}

fn count_begin(instructions: &[Instruction]) -> usize {
    instructions
        .iter()
        .filter(|i| matches!(i.kind, InstructionKind::BeginControl { .. }))
        .count()
}

fn count_end(instructions: &[Instruction]) -> usize {
    instructions
        .iter()
        .filter(|i| matches!(i.kind, InstructionKind::EndControl { .. }))
        .count()
}

#[test]
fn test_two_controls_toggle_pattern() {
    let (c0, c1, t) = (qubit("c0"), qubit("c1"), qubit("t"));
    let gates = [StandardGate::H, StandardGate::X, StandardGate::Y, StandardGate::Z];
    let blocks = gates.iter().map(|g| block_with(g.clone(), &t)).collect();

    let mut block = BasicBlock::new();
    block.push(QuantumMux::new(vec![c0.clone(), c1.clone()], blocks, None).unwrap());
    let out = block.decompose().unwrap();

    assert_eq!(
        out.instructions(),
        &[
            Instruction::begin_control(c0.clone(), false),
            Instruction::begin_control(c1.clone(), false),
            apply(StandardGate::H, &t),
            // state 1: bit 0 flips
            Instruction::end_control(c0.clone()),
            Instruction::begin_control(c0.clone(), true),
            apply(StandardGate::X, &t),
            // state 2: bits 0 and 1 flip
            Instruction::end_control(c0.clone()),
            Instruction::begin_control(c0.clone(), false),
            Instruction::end_control(c1.clone()),
            Instruction::begin_control(c1.clone(), true),
            apply(StandardGate::Y, &t),
            // state 3: bit 0 flips
            Instruction::end_control(c0.clone()),
            Instruction::begin_control(c0.clone(), true),
            apply(StandardGate::Z, &t),
            Instruction::end_control(c0),
            Instruction::end_control(c1),
        ]
    );
    assert_eq!(count_begin(out.instructions()), 6);
    assert_eq!(count_end(out.instructions()), 6);
}

#[test]
fn test_empty_block_keeps_other_blocks() {
    let (c0, c1, t) = (qubit("c0"), qubit("c1"), qubit("t"));
    let blocks = vec![
        block_with(StandardGate::H, &t),
        block_with(StandardGate::X, &t),
        BasicBlock::new(),
        block_with(StandardGate::Z, &t),
    ];

    let mut block = BasicBlock::new();
    block.push(QuantumMux::new(vec![c0, c1], blocks, None).unwrap());
    let out = block.decompose().unwrap();

    let applied: Vec<&Instruction> = out
        .iter()
        .filter(|i| matches!(i.kind, InstructionKind::ElementaryOperationCall { .. }))
        .collect();
    assert_eq!(
        applied,
        vec![
            &apply(StandardGate::H, &t),
            &apply(StandardGate::X, &t),
            &apply(StandardGate::Z, &t),
        ]
    );
    assert_eq!(count_begin(out.instructions()), 6);
    assert_eq!(count_end(out.instructions()), 6);
}

#[test]
fn test_mux_blocks_share_the_enclosing_frame() {
    let c = qubit("c");
    let t = QubitAccessor::variable(QuantumVariable::qvar("t", IntExpr::constant(2)));
    let first = t.index(IntExpr::constant(0)).unwrap();
    let blocks = vec![block_with(StandardGate::X, &first), block_with(StandardGate::Z, &first)];

    let mut block = BasicBlock::new();
    block.push(QuantumMux::new(vec![c.clone()], blocks, None).unwrap());
    let out = block.decompose().unwrap();
    assert_eq!(out.iter().filter(|i| i.is_declaration()).count(), 1);
    assert_eq!(
        out.instructions(),
        &[
            Instruction::begin_control(c.clone(), false),
            Instruction::declaration(&first).unwrap(),
            apply(StandardGate::X, &first),
            Instruction::end_control(c.clone()),
            Instruction::begin_control(c.clone(), true),
            apply(StandardGate::Z, &first),
            Instruction::end_control(c),
        ]
    );
}

#[test]
fn test_qif_branches_declare_parts_once() {
    let c = qubit("c");
    let t = QubitAccessor::variable(QuantumVariable::qvar("t", IntExpr::constant(2)));
    let pair = |g: StandardGate| {
        OperationExpr::combined(vec![OperationExpr::standard(g.clone()), OperationExpr::standard(g)])
            .unwrap()
    };
    let op = OperationExpr::qif(c, pair(StandardGate::H), pair(StandardGate::X)).unwrap();

    let mut block = BasicBlock::new();
    block.apply(op, t, None).unwrap();
    let out = block.decompose().unwrap();
    assert_eq!(out.iter().filter(|i| i.is_declaration()).count(), 2);

    let mut listing = ListingGenerator::default();
    out.emit(&mut listing);
    let text = listing.finish();
    assert_eq!(text.matches(" = t[0];").count(), 1);
    assert_eq!(text.matches(" = t[1];").count(), 1);
    assert_eq!(text.matches("h qubitIndexing_").count(), 2);
    assert_eq!(text.matches("x qubitIndexing_").count(), 2);
}

#[test]
fn test_derived_controls_declared_before_mux() {
    let reg = QubitAccessor::variable(QuantumVariable::qvar("r", IntExpr::constant(3)));
    let control = reg.index(IntExpr::constant(2)).unwrap();
    let t = qubit("t");
    let blocks = vec![BasicBlock::new(), block_with(StandardGate::X, &t)];

    let mut block = BasicBlock::new();
    block.push(QuantumMux::new(vec![control.clone()], blocks, None).unwrap());
    let out = block.decompose().unwrap();
    assert_eq!(out.instructions()[0], Instruction::declaration(&control).unwrap());
    assert_eq!(out.instructions()[1], Instruction::begin_control(control, false));
}

#[test]
fn test_qif_lowers_to_single_control_mux() {
    let (c, t) = (qubit("c"), qubit("t"));
    let op = OperationExpr::qif(
        c.clone(),
        OperationExpr::standard(StandardGate::X),
        OperationExpr::standard(StandardGate::Z),
    )
    .unwrap();
    let out = block_with_op(op, &t);
    assert_eq!(
        out,
        vec![
            Instruction::begin_control(c.clone(), false),
            apply(StandardGate::Z, &t),
            Instruction::end_control(c.clone()),
            Instruction::begin_control(c.clone(), true),
            apply(StandardGate::X, &t),
            Instruction::end_control(c),
        ]
    );
}

fn block_with_op(op: OperationExpr, target: &QubitAccessor) -> Vec<Instruction> {
    let mut block = BasicBlock::new();
    block.apply(op, target.clone(), None).unwrap();
    block.decompose().unwrap().instructions().to_vec()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_controls_balanced_and_blocks_kept(
        k in 0usize..4,
        mask in any::<u16>(),
    ) {
        let controls: Vec<QubitAccessor> = (0..k).map(|p| qubit(&format!("c{p}"))).collect();
        let target = qubit("t");
        let blocks: Vec<Vec<Instruction>> = (0..1usize << k)
            .map(|state| {
                if mask & (1 << state) != 0 {
                    vec![Instruction::measure(target.clone())]
                } else {
                    vec![]
                }
            })
            .collect();
        let kept = blocks.iter().filter(|b| !b.is_empty()).count();

        let out = multiplex(&controls, blocks, None).unwrap();

        let begins = count_begin(&out);
        prop_assert_eq!(begins, count_end(&out));
        // Every state after the first toggles trailing_zeros + 1 controls.
        let toggles: usize = (1..1usize << k).map(|s| s.trailing_zeros() as usize + 1).sum();
        prop_assert_eq!(begins, k + toggles);

        let measured = out
            .iter()
            .filter(|i| matches!(i.kind, InstructionKind::Measurement { .. }))
            .count();
        prop_assert_eq!(measured, kept);

        // Each control alternates begin, end, begin, end.
        for control in &controls {
            let mut open = false;
            for instruction in &out {
                match &instruction.kind {
                    InstructionKind::BeginControl { control: c, .. } if c == control => {
                        prop_assert!(!open);
                        open = true;
                    }
                    InstructionKind::EndControl { control: c } if c == control => {
                        prop_assert!(open);
                        open = false;
                    }
                    _ => {}
                }
            }
            prop_assert!(!open);
        }
    }

    #[test]
    fn prop_wrong_block_count_rejected(k in 1usize..4, delta in 1usize..3) {
        let controls: Vec<QubitAccessor> = (0..k).map(|p| qubit(&format!("c{p}"))).collect();
        let blocks = vec![BasicBlock::new(); (1usize << k) + delta];
        prop_assert!(QuantumMux::new(controls, blocks, None).is_err());
    }
}
