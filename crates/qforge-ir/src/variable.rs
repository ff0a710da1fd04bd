//! Classical and quantum variables, and operation definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

use crate::error::{IrError, IrResult};
use crate::expr::IntExpr;
use crate::location::Location;
use crate::poly::Indeterminate;

/// Classical value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassicalType {
    /// Boolean.
    Bool,
    /// Signed integer.
    Int,
    /// Floating point.
    Float,
    /// Complex number.
    Complex,
}

impl fmt::Display for ClassicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassicalType::Bool => "bool",
            ClassicalType::Int => "int",
            ClassicalType::Float => "float",
            ClassicalType::Complex => "complex",
        };
        f.write_str(name)
    }
}

/// A named classical variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassicalVariable {
    /// Identifier.
    pub ident: Rc<str>,
    /// Value type.
    pub ty: ClassicalType,
}

impl ClassicalVariable {
    /// Create a variable.
    pub fn new(ident: impl AsRef<str>, ty: ClassicalType) -> Self {
        ClassicalVariable {
            ident: Rc::from(ident.as_ref()),
            ty,
        }
    }

    /// The indeterminate standing for this variable in integer expressions.
    pub fn indeterminate(&self) -> Indeterminate {
        Indeterminate::new(&*self.ident)
    }

    /// Reference this variable inside an integer expression.
    pub fn int_expr(&self) -> IntExpr {
        IntExpr::variable(&self.indeterminate())
    }
}

/// Whether a quantum variable owns its qubits or aliases someone else's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantumVariableKind {
    /// Owns a register.
    Qvar,
    /// Refers to qubits owned elsewhere.
    Qref,
}

/// A named quantum register.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuantumVariable {
    /// Identifier.
    pub ident: Rc<str>,
    /// Register size.
    pub size: IntExpr,
    /// Ownership kind.
    pub kind: QuantumVariableKind,
}

impl QuantumVariable {
    /// An owning register.
    pub fn qvar(ident: impl AsRef<str>, size: IntExpr) -> Self {
        QuantumVariable {
            ident: Rc::from(ident.as_ref()),
            size,
            kind: QuantumVariableKind::Qvar,
        }
    }

    /// An aliasing register.
    pub fn qref(ident: impl AsRef<str>, size: IntExpr) -> Self {
        QuantumVariable {
            ident: Rc::from(ident.as_ref()),
            size,
            kind: QuantumVariableKind::Qref,
        }
    }
}

/// A quantum parameter of an operation definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuantumParameter {
    /// The register as seen inside the body.
    pub variable: QuantumVariable,
    /// Hidden unknown to be solved from the caller's target size, when the
    /// declared size is not given explicitly.
    pub size_inference: Option<Indeterminate>,
}

impl QuantumParameter {
    /// A parameter with an explicit size.
    pub fn sized(ident: impl AsRef<str>, size: IntExpr) -> Self {
        QuantumParameter {
            variable: QuantumVariable::qref(ident, size),
            size_inference: None,
        }
    }

    /// A parameter whose size is `size` in terms of the hidden unknown
    /// `inference`, solved at each call site.
    pub fn inferred(ident: impl AsRef<str>, size: IntExpr, inference: Indeterminate) -> Self {
        QuantumParameter {
            variable: QuantumVariable::qref(ident, size),
            size_inference: Some(inference),
        }
    }
}

/// The signature of a user-defined operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDef {
    /// Identifier.
    pub ident: Rc<str>,
    /// Classical parameters, in order.
    pub classical_params: Vec<ClassicalVariable>,
    /// Quantum parameter.
    quantum_param: QuantumParameter,
    /// Definition site.
    pub location: Option<Location>,
}

impl OperationDef {
    /// Create a definition. Operations have exactly one quantum parameter,
    /// and an inferred parameter size must depend on its hidden unknown.
    pub fn new(
        ident: impl AsRef<str>,
        classical_params: Vec<ClassicalVariable>,
        quantum_params: Vec<QuantumParameter>,
    ) -> IrResult<Self> {
        let ident: Rc<str> = Rc::from(ident.as_ref());
        let found = quantum_params.len();
        let mut params = quantum_params.into_iter();
        match (params.next(), params.next()) {
            (Some(quantum_param), None) => {
                if let Some(hidden) = &quantum_param.size_inference {
                    if !quantum_param.variable.size.contains(hidden) {
                        return Err(IrError::UnusedSizeInference {
                            operation: ident.to_string(),
                            parameter: quantum_param.variable.ident.to_string(),
                            size: quantum_param.variable.size.to_string(),
                            inference: hidden.to_string(),
                        });
                    }
                }
                Ok(OperationDef {
                    ident,
                    classical_params,
                    quantum_param,
                    location: None,
                })
            }
            _ => Err(IrError::QuantumParameterCount {
                operation: ident.to_string(),
                found,
            }),
        }
    }

    /// Attach a definition site.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// The single quantum parameter.
    pub fn quantum_param(&self) -> &QuantumParameter {
        &self.quantum_param
    }

    /// Declared size of the quantum parameter.
    pub fn size(&self) -> &IntExpr {
        &self.quantum_param.variable.size
    }

    /// The hidden size-inference unknown, if any.
    pub fn size_inference(&self) -> Option<&Indeterminate> {
        self.quantum_param.size_inference.as_ref()
    }
}
