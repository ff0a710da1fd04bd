//! Built-in demonstration modules.

use std::rc::Rc;

use anyhow::Result;

use qforge_compile::{
    BasicBlock, BlockInstruction, ConstantDef, Instruction, IntermediateFunction,
    IntermediateModule, QuantumMux,
};
use qforge_ir::{
    ClassicalType, ClassicalVariable, Indeterminate, IntExpr, IntRange, IrResult, Location,
    OperationDef, OperationExpr, QuantumParameter, QuantumVariable, QubitAccessor, StandardGate,
};

/// A named demonstration module.
pub struct Demo {
    /// Name used on the command line.
    pub name: &'static str,
    /// One-line summary.
    pub description: &'static str,
    build: fn() -> IrResult<IntermediateModule>,
}

/// All demonstration modules.
pub const DEMOS: &[Demo] = &[
    Demo {
        name: "hadamard-wall",
        description: "H on every qubit of a register of inferred size",
        build: hadamard_wall,
    },
    Demo {
        name: "ghz-qif",
        description: "GHZ preparation with a quantum if inside a loop",
        build: ghz_qif,
    },
    Demo {
        name: "multiplexor",
        description: "Two-control mux with one empty block",
        build: multiplexor,
    },
    Demo {
        name: "inference",
        description: "Hidden size argument solved inside a tensor combination",
        build: inference,
    },
    Demo {
        name: "unsolvable",
        description: "Size inference that has no integer solution",
        build: unsolvable,
    },
];

/// Build the demo called `name`.
pub fn build(name: &str) -> Result<IntermediateModule> {
    let demo = DEMOS
        .iter()
        .find(|demo| demo.name == name)
        .ok_or_else(|| anyhow::anyhow!("Unknown demo '{name}', see `qforge demos`"))?;
    Ok((demo.build)()?)
}

fn at(line: u32, column: u32) -> Location {
    Location::new("demo.qf", line, column)
}

fn gate(g: StandardGate) -> OperationExpr {
    OperationExpr::standard(g)
}

/// An operation over one register whose size is `size(n)` for a hidden `n`.
/// Returns the definition and the function with `n` as its first parameter.
fn sized_operation(
    name: &str,
    size: impl Fn(IntExpr) -> IntExpr,
    body: impl FnOnce(&QubitAccessor) -> IrResult<BasicBlock>,
) -> IrResult<(Rc<OperationDef>, IntermediateFunction)> {
    let hidden = Indeterminate::new("n");
    let hidden_param = ClassicalVariable::new("n", ClassicalType::Int);
    let register_size = size(IntExpr::variable(&hidden));
    let param = QuantumParameter::inferred("q", register_size, hidden);
    let definition = Rc::new(OperationDef::new(name, vec![], vec![param.clone()])?);

    let register = QubitAccessor::variable(param.variable.clone());
    let function = IntermediateFunction::operation(
        name,
        true,
        vec![hidden_param],
        vec![param.variable],
        Some(body(&register)?),
    );
    Ok((definition, function))
}

fn hadamard_wall() -> IrResult<IntermediateModule> {
    let (wall, wall_fn) = sized_operation("wall", |n| n, |q| {
        let mut body = BasicBlock::new();
        body.apply(
            OperationExpr::extended(gate(StandardGate::H), q.size().clone()),
            q.clone(),
            Some(at(2, 5)),
        )?;
        Ok(body)
    })?;

    let register = QubitAccessor::alloc(IntExpr::constant(4));
    let mut main = BasicBlock::new();
    main.apply(
        OperationExpr::user_defined(wall, vec![])?,
        register.clone(),
        Some(at(6, 5)),
    )?;
    main.push(Instruction::measure(register));

    let mut module = IntermediateModule::new();
    module.add_function(wall_fn.with_location(at(1, 1)));
    module.add_function(
        IntermediateFunction::program("main", vec![], IntExpr::constant(1024), Some(main))
            .with_location(at(5, 1)),
    );
    Ok(module)
}

fn ghz_qif() -> IrResult<IntermediateModule> {
    let size = ClassicalVariable::new("SIZE", ClassicalType::Int);
    let q = QubitAccessor::variable(QuantumVariable::qvar("q", size.int_expr()));
    let i = ClassicalVariable::new("i", ClassicalType::Int);

    let mut step = BasicBlock::new();
    let control = q.index(i.int_expr() - 1)?;
    let flip = OperationExpr::qif(control, gate(StandardGate::X), gate(StandardGate::I))?;
    step.apply(flip, q.index(i.int_expr())?, Some(at(4, 9)))?;

    let mut main = BasicBlock::new();
    main.apply(gate(StandardGate::H), q.index(IntExpr::constant(0))?, Some(at(3, 5)))?;
    main.push(BlockInstruction::ForLoop {
        iterator: i,
        range: IntRange::exclusive(IntExpr::constant(1), size.int_expr()),
        body: step,
        location: Some(at(4, 5)),
    });
    main.push(Instruction::measure(q));

    let mut module = IntermediateModule::new();
    module.add_constant(ConstantDef::new(size, IntExpr::constant(3)));
    module.add_function(
        IntermediateFunction::program("ghz", vec![], IntExpr::constant(100), Some(main))
            .with_location(at(2, 1)),
    );
    Ok(module)
}

fn multiplexor() -> IrResult<IntermediateModule> {
    let qubits = QubitAccessor::alloc(IntExpr::constant(3));
    let controls = qubits.slice(IntExpr::constant(0), IntExpr::constant(2))?;
    let target = qubits.index(IntExpr::constant(2))?;

    let mut blocks = Vec::with_capacity(4);
    for g in [Some(StandardGate::H), Some(StandardGate::X), None, Some(StandardGate::Z)] {
        let mut block = BasicBlock::new();
        if let Some(g) = g {
            block.apply(gate(g), target.clone(), None)?;
        }
        blocks.push(block);
    }
    let mux = QuantumMux::new(
        vec![
            controls.index(IntExpr::constant(0))?,
            controls.index(IntExpr::constant(1))?,
        ],
        blocks,
        Some(at(3, 5)),
    )?;

    let mut main = BasicBlock::new();
    main.apply(
        OperationExpr::extended(gate(StandardGate::H), IntExpr::constant(2)),
        controls,
        Some(at(2, 5)),
    )?;
    main.push(mux);
    main.push(Instruction::measure(qubits));

    let mut module = IntermediateModule::new();
    module.add_function(
        IntermediateFunction::program("mux", vec![], IntExpr::constant(1000), Some(main))
            .with_location(at(1, 1)),
    );
    Ok(module)
}

fn inference() -> IrResult<IntermediateModule> {
    let (pairs, pairs_fn) = sized_operation("pairs", |n| n * 2 + 2, |q| {
        let mut body = BasicBlock::new();
        let count = q.size() / 2;
        body.apply(
            OperationExpr::extended(gate(StandardGate::Swap), count),
            q.clone(),
            Some(at(2, 5)),
        )?;
        Ok(body)
    })?;

    let register = QubitAccessor::alloc_with_init(IntExpr::constant(9), IntExpr::constant(0b1_0110_1001));
    let op = OperationExpr::combined(vec![
        gate(StandardGate::H),
        OperationExpr::user_defined(pairs, vec![])?,
    ])?;
    let mut main = BasicBlock::new();
    main.apply(op, register.clone(), Some(at(6, 5)))?;
    main.push(Instruction::measure(register));

    let mut module = IntermediateModule::new();
    module.add_function(pairs_fn.with_location(at(1, 1)));
    module.add_function(
        IntermediateFunction::program("main", vec![], IntExpr::constant(1), Some(main))
            .with_location(at(5, 1)),
    );
    Ok(module)
}

fn unsolvable() -> IrResult<IntermediateModule> {
    let (even, even_fn) = sized_operation("even", |n| n * 2, |q| {
        let mut body = BasicBlock::new();
        body.apply(
            OperationExpr::extended(gate(StandardGate::X), q.size().clone()),
            q.clone(),
            None,
        )?;
        Ok(body)
    })?;

    let mut main = BasicBlock::new();
    main.apply(
        OperationExpr::user_defined(even, vec![])?,
        QubitAccessor::alloc(IntExpr::constant(3)),
        Some(at(5, 5)),
    )?;

    let mut module = IntermediateModule::new();
    module.add_function(even_fn.with_location(at(1, 1)));
    module.add_function(
        IntermediateFunction::program("main", vec![], IntExpr::constant(1), Some(main))
            .with_location(at(4, 1)),
    );
    Ok(module)
}
