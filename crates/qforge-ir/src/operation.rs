//! Operation expressions: composable descriptions of unitaries.

use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::{IrError, IrResult};
use crate::expr::{ClassicalExpr, ComplexExpr, IntExpr};
use crate::gate::StandardGate;
use crate::location::Location;
use crate::qubit::QubitAccessor;
use crate::variable::OperationDef;

/// A single gate or a call to a user-defined operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementaryOperation {
    /// A built-in gate.
    Standard(StandardGate),
    /// A user-defined operation with its classical arguments.
    UserDefined {
        /// The callee.
        definition: Rc<OperationDef>,
        /// Classical arguments, in parameter order.
        args: Vec<ClassicalExpr>,
    },
}

impl ElementaryOperation {
    /// The name of the gate or operation.
    pub fn name(&self) -> &str {
        match self {
            ElementaryOperation::Standard(gate) => gate.name(),
            ElementaryOperation::UserDefined { definition, .. } => &definition.ident,
        }
    }
}

/// The shape of an operation expression.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationKind {
    /// A gate or user operation.
    Elementary(ElementaryOperation),
    /// `[U1, U2, U3]`: apply U1, then U2, then U3 to the same qubits.
    SequentialMatMul(Vec<OperationExpr>),
    /// `U1 . U2`: tensor product on consecutive qubits.
    Combined(Vec<OperationExpr>),
    /// `U@n`: the tensor power of `operation`.
    Extended {
        /// Repeated operation.
        operation: Box<OperationExpr>,
        /// Number of copies.
        multiplier: IntExpr,
    },
    /// `U+`: conjugate transpose.
    Dagger(Box<OperationExpr>),
    /// `c*U`: scaled by a complex coefficient.
    Coefficient {
        /// Scaled operation.
        operation: Box<OperationExpr>,
        /// The scalar.
        coefficient: ComplexExpr,
    },
    /// `qif ctrl apply U1 else U2`: quantum-controlled choice.
    QifApply {
        /// Control qubits.
        control: QubitAccessor,
        /// Applied when the control is true.
        if_branch: Box<OperationExpr>,
        /// Applied when the control is false.
        else_branch: Box<OperationExpr>,
    },
}

/// An operation expression with its size, computed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationExpr {
    kind: OperationKind,
    size: IntExpr,
    size_determined: bool,
    location: Option<Location>,
}

impl OperationExpr {
    /// A built-in gate.
    pub fn standard(gate: StandardGate) -> Self {
        let size = IntExpr::constant(i64::from(gate.num_qubits()));
        OperationExpr {
            kind: OperationKind::Elementary(ElementaryOperation::Standard(gate)),
            size,
            size_determined: true,
            location: None,
        }
    }

    /// A call to a user-defined operation.
    pub fn user_defined(definition: Rc<OperationDef>, args: Vec<ClassicalExpr>) -> IrResult<Self> {
        if args.len() != definition.classical_params.len() {
            return Err(IrError::ArgumentCountMismatch {
                operation: definition.ident.to_string(),
                expected: definition.classical_params.len(),
                got: args.len(),
                location: definition.location.clone(),
            });
        }
        let size = definition.size().clone();
        let size_determined = definition
            .size_inference()
            .is_none_or(|hidden| !size.contains(hidden));
        Ok(OperationExpr {
            kind: OperationKind::Elementary(ElementaryOperation::UserDefined { definition, args }),
            size,
            size_determined,
            location: None,
        })
    }

    /// Apply `operations` one after another to the same qubits.
    pub fn sequential(operations: Vec<OperationExpr>) -> IrResult<Self> {
        let first = operations.first().ok_or(IrError::EmptyOperationList {
            kind: "sequential product",
            location: None,
        })?;
        let reference = operations
            .iter()
            .find(|op| op.size_determined)
            .unwrap_or(first);
        for op in operations.iter().filter(|op| op.size_determined) {
            if op.size.provably_differs(&reference.size) {
                return Err(IrError::SizeMismatch {
                    operation: op.to_string(),
                    target: reference.to_string(),
                    expected: op.size.to_string(),
                    got: reference.size.to_string(),
                    location: op.location.clone(),
                });
            }
        }
        let size = reference.size.clone();
        let size_determined = reference.size_determined;
        Ok(OperationExpr {
            kind: OperationKind::SequentialMatMul(operations),
            size,
            size_determined,
            location: None,
        })
    }

    /// Tensor product on consecutive qubits.
    pub fn combined(operations: Vec<OperationExpr>) -> IrResult<Self> {
        if operations.is_empty() {
            return Err(IrError::EmptyOperationList {
                kind: "combination",
                location: None,
            });
        }
        let size = operations
            .iter()
            .fold(IntExpr::constant(0), |acc, op| acc + &op.size);
        let size_determined = operations.iter().all(|op| op.size_determined);
        Ok(OperationExpr {
            kind: OperationKind::Combined(operations),
            size,
            size_determined,
            location: None,
        })
    }

    /// `multiplier` copies of `operation` side by side.
    pub fn extended(operation: OperationExpr, multiplier: IntExpr) -> Self {
        let size = &multiplier * &operation.size;
        let size_determined = operation.size_determined;
        OperationExpr {
            kind: OperationKind::Extended {
                operation: Box::new(operation),
                multiplier,
            },
            size,
            size_determined,
            location: None,
        }
    }

    /// Conjugate transpose.
    pub fn dagger(operation: OperationExpr) -> Self {
        let size = operation.size.clone();
        let size_determined = operation.size_determined;
        OperationExpr {
            kind: OperationKind::Dagger(Box::new(operation)),
            size,
            size_determined,
            location: None,
        }
    }

    /// Scale by a complex coefficient.
    pub fn coefficient(operation: OperationExpr, coefficient: ComplexExpr) -> Self {
        let size = operation.size.clone();
        let size_determined = operation.size_determined;
        OperationExpr {
            kind: OperationKind::Coefficient {
                operation: Box::new(operation),
                coefficient,
            },
            size,
            size_determined,
            location: None,
        }
    }

    /// Quantum-controlled choice between two operations of equal size.
    pub fn qif(
        control: QubitAccessor,
        if_branch: OperationExpr,
        else_branch: OperationExpr,
    ) -> IrResult<Self> {
        if if_branch.size_determined != else_branch.size_determined {
            return Err(IrError::BranchDeterminednessMismatch {
                location: if_branch.location.clone(),
            });
        }
        if if_branch.size_determined && if_branch.size != else_branch.size {
            return Err(IrError::BranchSizeMismatch {
                if_size: if_branch.size.to_string(),
                else_size: else_branch.size.to_string(),
                location: if_branch.location.clone(),
            });
        }
        let size = if_branch.size.clone();
        let size_determined = if_branch.size_determined;
        Ok(OperationExpr {
            kind: OperationKind::QifApply {
                control,
                if_branch: Box::new(if_branch),
                else_branch: Box::new(else_branch),
            },
            size,
            size_determined,
            location: None,
        })
    }

    /// Attach a source location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// The shape of the expression.
    pub fn kind(&self) -> &OperationKind {
        &self.kind
    }

    /// Number of qubits the operation acts on.
    pub fn size(&self) -> &IntExpr {
        &self.size
    }

    /// Whether the size is fixed independently of the call site.
    pub fn is_size_determined(&self) -> bool {
        self.size_determined
    }

    /// Source location.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Fail when the operation has a determined size that is known to
    /// differ from the size of `target`.
    pub fn check_target(&self, target: &QubitAccessor, location: Option<&Location>) -> IrResult<()> {
        if self.size_determined && self.size.provably_differs(target.size()) {
            return Err(IrError::SizeMismatch {
                operation: self.to_string(),
                target: target.to_string(),
                expected: self.size.to_string(),
                got: target.size().to_string(),
                location: location.or(self.location.as_ref()).cloned(),
            });
        }
        Ok(())
    }

    /// A stable structural fingerprint, used to name synthetic loop indices.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.to_string().hash(&mut hasher);
        hasher.finish()
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[OperationExpr], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for OperationExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OperationKind::Elementary(ElementaryOperation::Standard(gate)) => write!(f, "{gate}"),
            OperationKind::Elementary(ElementaryOperation::UserDefined { definition, args }) => {
                write!(f, "{}", definition.ident)?;
                if !args.is_empty() {
                    f.write_str("(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(")")?;
                }
                Ok(())
            }
            OperationKind::SequentialMatMul(ops) => {
                f.write_str("[")?;
                write_list(f, ops, ", ")?;
                f.write_str("]")
            }
            OperationKind::Combined(ops) => {
                f.write_str("(")?;
                write_list(f, ops, " . ")?;
                f.write_str(")")
            }
            OperationKind::Extended {
                operation,
                multiplier,
            } => match multiplier.constant_value() {
                Some(_) => write!(f, "{operation}@{multiplier}"),
                None => write!(f, "{operation}@({multiplier})"),
            },
            OperationKind::Dagger(operation) => write!(f, "{operation}+"),
            OperationKind::Coefficient {
                operation,
                coefficient,
            } => write!(f, "{coefficient}*{operation}"),
            OperationKind::QifApply {
                control,
                if_branch,
                else_branch,
            } => write!(f, "qif {control} apply {if_branch} else {else_branch}"),
        }
    }
}
