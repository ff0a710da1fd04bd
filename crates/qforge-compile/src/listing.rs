//! A human-readable listing of lowered modules.

use std::fmt::Write as _;

use qforge_ir::{
    BoolExpr, ClassicalExpr, ClassicalVariable, IntExpr, IntRange, OperationDef, QuantumVariable,
    QubitAccessor, StandardGate,
};

use crate::codegen::CodeGenerator;
use crate::config::CompileConfig;
use crate::module::ConstantDef;

/// Renders every primitive instruction as one indented line.
#[derive(Debug, Clone)]
pub struct ListingGenerator {
    config: CompileConfig,
    out: String,
    depth: usize,
}

impl ListingGenerator {
    /// Create a generator.
    pub fn new(config: CompileConfig) -> Self {
        Self {
            config,
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        let width = self.depth * self.config.indent;
        let _ = writeln!(self.out, "{:width$}{}", "", text.as_ref());
    }

    fn open(&mut self, header: impl AsRef<str>) {
        self.line(format!("{} {{", header.as_ref()));
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }
}

impl Default for ListingGenerator {
    fn default() -> Self {
        Self::new(CompileConfig::default())
    }
}

fn join<T: std::fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn classical_params(params: &[ClassicalVariable]) -> String {
    join(params.iter().map(|p| format!("{}: {}", p.ident, p.ty)))
}

fn operation_signature(
    ident: &str,
    classical: &[ClassicalVariable],
    quantum: &[QuantumVariable],
) -> String {
    let mut params: Vec<String> = classical.iter().map(|p| format!("{}: {}", p.ident, p.ty)).collect();
    params.extend(quantum.iter().map(|q| format!("{}: qreg[{}]", q.ident, q.size)));
    format!("operation {ident}({})", params.join(", "))
}

impl CodeGenerator for ListingGenerator {
    fn begin_file(&mut self) {
        if self.config.emit_comments {
            let kind = if self.config.build_library {
                "library"
            } else {
                "executable"
            };
            self.line(format!(
                "// qforge listing, target {} {kind}",
                self.config.target_language
            ));
        }
    }

    fn end_file(&mut self) {}

    fn def_constant(&mut self, constant: &ConstantDef) {
        self.line(format!(
            "const {}: {} = {};",
            constant.variable.ident, constant.variable.ty, constant.value
        ));
    }

    fn begin_operation(
        &mut self,
        ident: &str,
        export: bool,
        classical_params: &[ClassicalVariable],
        quantum_params: &[QuantumVariable],
    ) {
        let prefix = if export { "export " } else { "" };
        let signature = operation_signature(ident, classical_params, quantum_params);
        self.open(format!("{prefix}{signature}"));
    }

    fn end_operation(&mut self) {
        self.close();
    }

    fn extern_operation(
        &mut self,
        ident: &str,
        export: bool,
        classical_params: &[ClassicalVariable],
        quantum_params: &[QuantumVariable],
    ) {
        let prefix = if export { "export " } else { "" };
        let signature = operation_signature(ident, classical_params, quantum_params);
        self.line(format!("{prefix}extern {signature};"));
    }

    fn begin_program(&mut self, ident: &str, params: &[ClassicalVariable], shots: &IntExpr) {
        self.open(format!(
            "program {ident}({}) shots {shots}",
            classical_params(params)
        ));
    }

    fn end_program(&mut self) {
        self.close();
    }

    fn extern_program(&mut self, ident: &str, params: &[ClassicalVariable]) {
        self.line(format!("extern program {ident}({});", classical_params(params)));
    }

    fn declare_alloc(&mut self, accessor: &QubitAccessor, size: &IntExpr) {
        self.line(format!("qreg {}[{size}];", accessor.ident()));
    }

    fn declare_concat(&mut self, accessor: &QubitAccessor, parts: &[QubitAccessor]) {
        let parts = join(parts.iter().map(QubitAccessor::ident));
        self.line(format!("qref {} = concat({parts});", accessor.ident()));
    }

    fn declare_slice(
        &mut self,
        accessor: &QubitAccessor,
        subject: &QubitAccessor,
        start: &IntExpr,
        end: &IntExpr,
        step: &IntExpr,
    ) {
        let step = if *step == 1 {
            String::new()
        } else {
            format!(":{step}")
        };
        self.line(format!(
            "qref {} = {}[{start}:{end}{step}];",
            accessor.ident(),
            subject.ident()
        ));
    }

    fn declare_index(&mut self, accessor: &QubitAccessor, subject: &QubitAccessor, index: &IntExpr) {
        self.line(format!("qref {} = {}[{index}];", accessor.ident(), subject.ident()));
    }

    fn encode(&mut self, target: &QubitAccessor, value: &IntExpr) {
        self.line(format!("encode {} <- {value};", target.ident()));
    }

    fn push_standard(&mut self, gate: &StandardGate, target: &QubitAccessor) {
        self.line(format!("{gate} {};", target.ident()));
    }

    fn push_custom(&mut self, definition: &OperationDef, args: &[ClassicalExpr], target: &QubitAccessor) {
        self.line(format!(
            "{}({}) {};",
            definition.ident,
            join(args),
            target.ident()
        ));
    }

    fn begin_control(&mut self, control: &QubitAccessor, condition: bool) {
        self.line(format!("ctrl {} == {};", control.ident(), u8::from(condition)));
    }

    fn end_control(&mut self, control: &QubitAccessor) {
        self.line(format!("end ctrl {};", control.ident()));
    }

    fn begin_dagger(&mut self) {
        self.open("dagger");
    }

    fn end_dagger(&mut self) {
        self.close();
    }

    fn measure(&mut self, target: &QubitAccessor) {
        self.line(format!("measure {};", target.ident()));
    }

    fn init_classical(&mut self, variable: &ClassicalVariable, value: &ClassicalExpr) {
        self.line(format!("let {}: {} = {value};", variable.ident, variable.ty));
    }

    fn assign_quantum(&mut self, variable: &QuantumVariable, accessor: &QubitAccessor) {
        self.line(format!("qref {} = {};", variable.ident, accessor.ident()));
    }

    fn begin_for(&mut self, iterator: &ClassicalVariable, range: &IntRange) {
        self.open(format!("for {} in {range}", iterator.ident));
    }

    fn end_for(&mut self) {
        self.close();
    }

    fn begin_if(&mut self, condition: &BoolExpr) {
        self.open(format!("if {condition}"));
    }

    fn begin_else(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("} else {");
        self.depth += 1;
    }

    fn end_if(&mut self) {
        self.close();
    }

    fn finish(&mut self) -> String {
        self.depth = 0;
        std::mem::take(&mut self.out)
    }
}
