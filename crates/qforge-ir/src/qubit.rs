//! Qubit addressing.
//!
//! A [`QubitAccessor`] describes, at compile time, which qubits an
//! instruction acts on: a whole named register, a fresh allocation, a slice
//! or single element of another accessor, or the concatenation of several
//! accessors. Accessors are immutable and cheap to clone; composite
//! accessors share their constituents.
//!
//! Every accessor carries a memoized structural hash. Two independently
//! built accessors with the same constructor arguments are equal and name
//! the same generated identifier, so a backend declares them once.
//! Allocations are the exception: each one is distinct.

use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{IrError, IrResult};
use crate::expr::IntExpr;
use crate::variable::QuantumVariable;

static NEXT_ALLOC_ID: AtomicU64 = AtomicU64::new(0);

/// The shape of an accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessorKind {
    /// A named register.
    Variable(QuantumVariable),
    /// Fresh qubits, optionally initialized to an integer value.
    Alloc {
        /// Unique allocation id.
        id: u64,
        /// Initial value encoded into the fresh qubits.
        init: Option<IntExpr>,
    },
    /// Every `step`-th qubit of `subject` in `[start, end)`.
    Slicing {
        /// Sliced accessor.
        subject: QubitAccessor,
        /// First index.
        start: IntExpr,
        /// Exclusive bound.
        end: IntExpr,
        /// Stride.
        step: IntExpr,
    },
    /// A single qubit of `subject`.
    Indexing {
        /// Indexed accessor.
        subject: QubitAccessor,
        /// Element index.
        index: IntExpr,
    },
    /// Several accessors joined end to end.
    Concat(Vec<QubitAccessor>),
}

impl AccessorKind {
    fn prefix(&self) -> &'static str {
        match self {
            AccessorKind::Variable(_) => "qubitVariable",
            AccessorKind::Alloc { .. } => "qubitAlloc",
            AccessorKind::Slicing { .. } => "qubitSlicing",
            AccessorKind::Indexing { .. } => "qubitIndexing",
            AccessorKind::Concat(_) => "qubitConcat",
        }
    }

    fn structural_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        std::mem::discriminant(self).hash(&mut hasher);
        match self {
            AccessorKind::Variable(variable) => variable.hash(&mut hasher),
            AccessorKind::Alloc { id, init } => {
                id.hash(&mut hasher);
                init.hash(&mut hasher);
            }
            AccessorKind::Slicing {
                subject,
                start,
                end,
                step,
            } => {
                subject.hash(&mut hasher);
                start.hash(&mut hasher);
                end.hash(&mut hasher);
                step.hash(&mut hasher);
            }
            AccessorKind::Indexing { subject, index } => {
                subject.hash(&mut hasher);
                index.hash(&mut hasher);
            }
            AccessorKind::Concat(parts) => parts.hash(&mut hasher),
        }
        hasher.finish()
    }
}

#[derive(Debug)]
struct AccessorNode {
    kind: AccessorKind,
    size: IntExpr,
    hash: u64,
}

/// A shared, immutable description of a set of qubits.
#[derive(Debug, Clone)]
pub struct QubitAccessor(Rc<AccessorNode>);

impl QubitAccessor {
    fn from_kind(kind: AccessorKind, size: IntExpr) -> Self {
        let hash = kind.structural_hash();
        QubitAccessor(Rc::new(AccessorNode { kind, size, hash }))
    }

    /// Access a whole named register.
    pub fn variable(variable: QuantumVariable) -> Self {
        let size = variable.size.clone();
        QubitAccessor::from_kind(AccessorKind::Variable(variable), size)
    }

    /// Allocate `size` fresh qubits.
    pub fn alloc(size: IntExpr) -> Self {
        QubitAccessor::alloc_inner(size, None)
    }

    /// Allocate `size` fresh qubits holding `init`.
    pub fn alloc_with_init(size: IntExpr, init: IntExpr) -> Self {
        QubitAccessor::alloc_inner(size, Some(init))
    }

    fn alloc_inner(size: IntExpr, init: Option<IntExpr>) -> Self {
        let id = NEXT_ALLOC_ID.fetch_add(1, Ordering::Relaxed);
        QubitAccessor::from_kind(AccessorKind::Alloc { id, init }, size)
    }

    /// Join accessors end to end.
    pub fn concat(parts: Vec<QubitAccessor>) -> Self {
        let size = parts
            .iter()
            .fold(IntExpr::constant(0), |acc, part| acc + part.size());
        QubitAccessor::from_kind(AccessorKind::Concat(parts), size)
    }

    /// The `index`-th qubit.
    pub fn index(&self, index: IntExpr) -> IrResult<QubitAccessor> {
        if let Some(i) = index.constant_value() {
            let size = self.size().constant_value();
            if i < 0 || size.is_some_and(|size| i >= size) {
                return Err(IrError::IndexOutOfBounds {
                    index: i,
                    size: size.unwrap_or(-1),
                    location: index.location().cloned(),
                });
            }
        }
        Ok(QubitAccessor::from_kind(
            AccessorKind::Indexing {
                subject: self.clone(),
                index,
            },
            IntExpr::constant(1),
        ))
    }

    /// The qubits in `[start, end)`.
    pub fn slice(&self, start: IntExpr, end: IntExpr) -> IrResult<QubitAccessor> {
        self.slice_with(start, end, IntExpr::constant(1), false)
    }

    /// The qubits from `start` to `end` with stride `step`.
    ///
    /// Inclusive bounds are normalized to exclusive ones. A range covering a
    /// single element yields an indexing accessor.
    pub fn slice_with(
        &self,
        start: IntExpr,
        end: IntExpr,
        step: IntExpr,
        inclusive: bool,
    ) -> IrResult<QubitAccessor> {
        let location = start.location().or(end.location()).cloned();
        let invalid = |reason: String| IrError::InvalidSlice {
            reason,
            location: location.clone(),
        };
        let end = if inclusive { end + 1 } else { end };

        if step.constant_value().is_some_and(|s| s <= 0) {
            return Err(invalid(format!("step {step} must be positive")));
        }
        if start.constant_value().is_some_and(|s| s < 0) {
            return Err(invalid(format!("start {start} is negative")));
        }
        match (&end - &start).constant_value() {
            Some(span) if span <= 0 => {
                return Err(invalid(format!("range [{start}, {end}) is empty")));
            }
            Some(1) => return self.index(start),
            _ => {}
        }
        if let (Some(e), Some(size)) = (end.constant_value(), self.size().constant_value()) {
            if e > size {
                return Err(invalid(format!(
                    "end {e} exceeds register size {size}"
                )));
            }
        }

        let size = (&end - &start) / &step;
        Ok(QubitAccessor::from_kind(
            AccessorKind::Slicing {
                subject: self.clone(),
                start,
                end,
                step,
            },
            size,
        ))
    }

    /// The shape of this accessor.
    pub fn kind(&self) -> &AccessorKind {
        &self.0.kind
    }

    /// Number of qubits addressed.
    pub fn size(&self) -> &IntExpr {
        &self.0.size
    }

    /// The memoized structural hash.
    pub fn structural_hash(&self) -> u64 {
        self.0.hash
    }

    /// The identifier a backend uses for this accessor.
    pub fn ident(&self) -> String {
        match self.kind() {
            AccessorKind::Variable(variable) => variable.ident.to_string(),
            kind => format!("{}_{:x}", kind.prefix(), self.0.hash),
        }
    }

    /// Whether the accessor needs a declaration before first use.
    pub fn is_declarable(&self) -> bool {
        !matches!(self.kind(), AccessorKind::Variable(_))
    }

    /// Accessors that must be usable before this one can be declared.
    pub fn constituents(&self) -> &[QubitAccessor] {
        match self.kind() {
            AccessorKind::Variable(_) | AccessorKind::Alloc { .. } => &[],
            AccessorKind::Slicing { subject, .. } | AccessorKind::Indexing { subject, .. } => {
                std::slice::from_ref(subject)
            }
            AccessorKind::Concat(parts) => parts,
        }
    }
}

impl PartialEq for QubitAccessor {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || (self.0.hash == other.0.hash && self.0.kind == other.0.kind)
    }
}

impl Eq for QubitAccessor {}

impl Hash for QubitAccessor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Display for QubitAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            AccessorKind::Variable(variable) => write!(f, "{}", variable.ident),
            AccessorKind::Alloc { init: None, .. } => write!(f, "alloc({})", self.size()),
            AccessorKind::Alloc {
                init: Some(init), ..
            } => write!(f, "alloc({}, {init})", self.size()),
            AccessorKind::Slicing {
                subject,
                start,
                end,
                step,
            } => {
                write!(f, "{subject}[{start}:{end}")?;
                if *step != 1 {
                    write!(f, ":{step}")?;
                }
                f.write_str("]")
            }
            AccessorKind::Indexing { subject, index } => write!(f, "{subject}[{index}]"),
            AccessorKind::Concat(parts) => {
                f.write_str("concat(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str(")")
            }
        }
    }
}
