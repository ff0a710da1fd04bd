//! Error types for the IR crate.

use crate::location::Location;
use thiserror::Error;

/// Errors raised while constructing IR values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Operation and target register sizes are known to differ.
    #[error("{}size mismatch: operation '{operation}' has size {expected}, target '{target}' has size {got}", format_location(.location))]
    SizeMismatch {
        /// Rendered operation.
        operation: String,
        /// Rendered target accessor.
        target: String,
        /// Operation size.
        expected: String,
        /// Target size.
        got: String,
        /// Call site.
        location: Option<Location>,
    },

    /// The branches of a quantum if have different sizes.
    #[error("{}qif branches have different sizes: {if_size} and {else_size}", format_location(.location))]
    BranchSizeMismatch {
        /// Size of the if-branch.
        if_size: String,
        /// Size of the else-branch.
        else_size: String,
        /// Source location.
        location: Option<Location>,
    },

    /// One qif branch has a determined size and the other does not.
    #[error("{}qif branches disagree on whether their size is determined", format_location(.location))]
    BranchDeterminednessMismatch {
        /// Source location.
        location: Option<Location>,
    },

    /// Slice bounds or step are invalid.
    #[error("{}invalid slice: {reason}", format_location(.location))]
    InvalidSlice {
        /// What is wrong with the slice.
        reason: String,
        /// Source location.
        location: Option<Location>,
    },

    /// A constant index lies outside a constant-sized register.
    #[error("{}index {index} out of bounds for register of size {size}", format_location(.location))]
    IndexOutOfBounds {
        /// The index.
        index: i64,
        /// The register size.
        size: i64,
        /// Source location.
        location: Option<Location>,
    },

    /// Wrong number of classical arguments for an operation.
    #[error("{}operation '{operation}' expects {expected} classical arguments, got {got}", format_location(.location))]
    ArgumentCountMismatch {
        /// Operation name.
        operation: String,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        got: usize,
        /// Source location.
        location: Option<Location>,
    },

    /// A user-defined operation does not have exactly one quantum parameter.
    #[error("operation '{operation}' must have exactly one quantum parameter, found {found}")]
    QuantumParameterCount {
        /// Operation name.
        operation: String,
        /// Number of quantum parameters found.
        found: usize,
    },

    /// An inferred quantum parameter whose size does not mention the hidden
    /// unknown.
    #[error("size '{size}' of quantum parameter '{parameter}' of operation '{operation}' does not depend on '{inference}'")]
    UnusedSizeInference {
        /// Operation name.
        operation: String,
        /// Parameter name.
        parameter: String,
        /// Declared size.
        size: String,
        /// The hidden unknown.
        inference: String,
    },

    /// A composite operation was built without elements.
    #[error("{}{kind} requires at least one operation", format_location(.location))]
    EmptyOperationList {
        /// Composite kind.
        kind: &'static str,
        /// Source location.
        location: Option<Location>,
    },

    /// A multiplexor does not have one block per control assignment.
    #[error("mux with {controls} controls needs {expected} blocks, got {got}")]
    InvalidMux {
        /// Number of controls.
        controls: usize,
        /// Required number of blocks.
        expected: usize,
        /// Supplied number of blocks.
        got: usize,
    },
}

impl IrError {
    /// The source location the error points at, if any.
    pub fn location(&self) -> Option<&Location> {
        match self {
            IrError::SizeMismatch { location, .. }
            | IrError::BranchSizeMismatch { location, .. }
            | IrError::BranchDeterminednessMismatch { location }
            | IrError::InvalidSlice { location, .. }
            | IrError::IndexOutOfBounds { location, .. }
            | IrError::ArgumentCountMismatch { location, .. }
            | IrError::EmptyOperationList { location, .. } => location.as_ref(),
            IrError::QuantumParameterCount { .. }
            | IrError::UnusedSizeInference { .. }
            | IrError::InvalidMux { .. } => None,
        }
    }
}

#[allow(clippy::ref_option)]
fn format_location(location: &Option<Location>) -> String {
    match location {
        Some(location) => format!("{location}: "),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

/// Failure of the restricted linear solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The expression is not `c + k * variable`.
    #[error("'{expression}' is not linear in '{variable}'")]
    NotSolvable {
        /// Rendered expression.
        expression: String,
        /// The unknown being solved for.
        variable: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_location() {
        let err = IrError::IndexOutOfBounds {
            index: 4,
            size: 4,
            location: Some(Location::new("a.qf", 2, 5)),
        };
        assert_eq!(
            err.to_string(),
            "a.qf:2:5: index 4 out of bounds for register of size 4"
        );
        assert_eq!(err.location().map(|l| l.line), Some(2));
    }

    #[test]
    fn test_error_without_location() {
        let err = IrError::InvalidMux {
            controls: 2,
            expected: 4,
            got: 3,
        };
        assert_eq!(err.to_string(), "mux with 2 controls needs 4 blocks, got 3");
        assert!(err.location().is_none());
    }
}
