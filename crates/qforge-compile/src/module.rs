//! Intermediate modules: constants and function definitions ready for
//! lowering and code generation.

use std::rc::Rc;

use tracing::{debug, info, instrument};

use qforge_ir::{ClassicalExpr, ClassicalVariable, IntExpr, Location, QuantumVariable};

use crate::block::BasicBlock;
use crate::codegen::CodeGenerator;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::instruction::DecomposedBasicBlock;

/// A module-level constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDef {
    /// The constant.
    pub variable: ClassicalVariable,
    /// Its value.
    pub value: ClassicalExpr,
}

impl ConstantDef {
    /// Define `variable` as `value`.
    pub fn new(variable: ClassicalVariable, value: impl Into<ClassicalExpr>) -> Self {
        Self {
            variable,
            value: value.into(),
        }
    }
}

/// What kind of function a definition is.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionKind {
    /// A quantum operation.
    Operation {
        /// Visible outside the module.
        export: bool,
        /// Classical parameters, hidden size arguments first.
        classical_params: Vec<ClassicalVariable>,
        /// Quantum parameters.
        quantum_params: Vec<QuantumVariable>,
    },
    /// An entry point run `shots` times.
    Program {
        /// Classical parameters.
        params: Vec<ClassicalVariable>,
        /// Number of repetitions.
        shots: IntExpr,
    },
}

/// A function definition. Functions without a body are implemented
/// elsewhere.
#[derive(Debug, Clone)]
pub struct IntermediateFunction {
    /// Identifier.
    pub ident: Rc<str>,
    /// Operation or program.
    pub kind: FunctionKind,
    /// Body, if defined in this module.
    pub body: Option<BasicBlock>,
    /// Definition site.
    pub location: Option<Location>,
}

impl IntermediateFunction {
    /// An operation definition.
    pub fn operation(
        ident: impl AsRef<str>,
        export: bool,
        classical_params: Vec<ClassicalVariable>,
        quantum_params: Vec<QuantumVariable>,
        body: Option<BasicBlock>,
    ) -> Self {
        Self {
            ident: Rc::from(ident.as_ref()),
            kind: FunctionKind::Operation {
                export,
                classical_params,
                quantum_params,
            },
            body,
            location: None,
        }
    }

    /// A program definition.
    pub fn program(
        ident: impl AsRef<str>,
        params: Vec<ClassicalVariable>,
        shots: IntExpr,
        body: Option<BasicBlock>,
    ) -> Self {
        Self {
            ident: Rc::from(ident.as_ref()),
            kind: FunctionKind::Program { params, shots },
            body,
            location: None,
        }
    }

    /// Attach a definition site.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// A module: constants followed by functions, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct IntermediateModule {
    constants: Vec<ConstantDef>,
    functions: Vec<IntermediateFunction>,
}

impl IntermediateModule {
    /// An empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constant.
    pub fn add_constant(&mut self, constant: ConstantDef) {
        self.constants.push(constant);
    }

    /// Add a function.
    pub fn add_function(&mut self, function: IntermediateFunction) {
        self.functions.push(function);
    }

    /// Constants, in order.
    pub fn constants(&self) -> &[ConstantDef] {
        &self.constants
    }

    /// Functions, in order.
    pub fn functions(&self) -> &[IntermediateFunction] {
        &self.functions
    }

    /// Lower every function body.
    ///
    /// All functions are lowered even when some fail; each failure becomes
    /// one error diagnostic.
    #[instrument(skip(self), fields(functions = self.functions.len()))]
    pub fn lower(&self) -> Result<LoweredModule<'_>, Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        let mut lowered = Vec::with_capacity(self.functions.len());

        for function in &self.functions {
            let Some(body) = &function.body else {
                lowered.push((function, None));
                continue;
            };
            match body.decompose() {
                Ok(decomposed) => {
                    debug!(
                        "Lowered {} into {} instructions",
                        function.ident,
                        decomposed.deep_len()
                    );
                    lowered.push((function, Some(decomposed)));
                }
                Err(err) => {
                    let mut diagnostic = Diagnostic::from(&err);
                    if diagnostic.location.is_none() {
                        diagnostic.location.clone_from(&function.location);
                    }
                    diagnostics.push(diagnostic);
                }
            }
        }

        if diagnostics.has_errors() {
            info!("Lowering failed with {} diagnostics", diagnostics.len());
            return Err(diagnostics);
        }
        info!("Lowered {} functions", lowered.len());
        Ok(LoweredModule {
            constants: &self.constants,
            functions: lowered,
        })
    }

    /// Lower the module and emit it through `codegen`.
    pub fn dump_code<G: CodeGenerator + ?Sized>(&self, codegen: &mut G) -> Result<String, Diagnostics> {
        Ok(self.lower()?.dump_code(codegen))
    }
}

/// A module whose function bodies have all been lowered.
#[derive(Debug)]
pub struct LoweredModule<'a> {
    constants: &'a [ConstantDef],
    functions: Vec<(&'a IntermediateFunction, Option<&'a DecomposedBasicBlock>)>,
}

impl<'a> LoweredModule<'a> {
    /// Lowered functions with their bodies, in declaration order.
    pub fn functions(
        &self,
    ) -> impl Iterator<Item = (&'a IntermediateFunction, Option<&'a DecomposedBasicBlock>)> + '_ {
        self.functions.iter().copied()
    }

    /// Emit constants, then functions, and return the generated text.
    pub fn dump_code<G: CodeGenerator + ?Sized>(&self, codegen: &mut G) -> String {
        codegen.begin_file();
        for constant in self.constants {
            codegen.def_constant(constant);
        }
        for (function, body) in &self.functions {
            emit_function(codegen, function, *body);
        }
        codegen.end_file();
        codegen.finish()
    }
}

fn emit_function<G: CodeGenerator + ?Sized>(
    codegen: &mut G,
    function: &IntermediateFunction,
    body: Option<&DecomposedBasicBlock>,
) {
    match (&function.kind, body) {
        (
            FunctionKind::Operation {
                export,
                classical_params,
                quantum_params,
            },
            Some(body),
        ) => {
            codegen.begin_operation(&function.ident, *export, classical_params, quantum_params);
            body.emit(codegen);
            codegen.end_operation();
        }
        (
            FunctionKind::Operation {
                export,
                classical_params,
                quantum_params,
            },
            None,
        ) => codegen.extern_operation(&function.ident, *export, classical_params, quantum_params),
        (FunctionKind::Program { params, shots }, Some(body)) => {
            codegen.begin_program(&function.ident, params, shots);
            body.emit(codegen);
            codegen.end_program();
        }
        (FunctionKind::Program { params, .. }, None) => {
            codegen.extern_program(&function.ident, params);
        }
    }
}
