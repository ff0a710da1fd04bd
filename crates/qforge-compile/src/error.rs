//! Error types for lowering.

use std::path::PathBuf;

use qforge_ir::{IrError, Location};
use thiserror::Error;

/// Errors that can occur while lowering a module.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// An IR construction error surfaced during lowering.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// The hidden size argument of a user operation could not be solved.
    #[error(
        "Unable to solve quantum parameter size inference expression '{expression}' of '{operation}' for target size {target_size}"
    )]
    UnsolvableSizeInference {
        /// The callee.
        operation: String,
        /// The declared parameter size.
        expression: String,
        /// The size of the call-site target.
        target_size: String,
        /// Call site.
        location: Option<Location>,
    },

    /// More than one operand of a tensor combination has an undetermined size.
    #[error("Cannot split target between several operations of undetermined size in '{operation}'")]
    AmbiguousCombinedSize {
        /// The combination.
        operation: String,
        /// Call site.
        location: Option<Location>,
    },

    /// A register of known size cannot be split into the requested number
    /// of equal parts.
    #[error("Cannot split target of size {target_size} into {multiplier} equal parts for '{operation}'")]
    UnevenExtension {
        /// The extended operation.
        operation: String,
        /// Size of the call-site target.
        target_size: String,
        /// Number of parts.
        multiplier: String,
        /// Call site.
        location: Option<Location>,
    },

    /// Configuration file could not be read.
    #[error("Failed to read config '{}': {source}", .path.display())]
    ConfigIo {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// YAML configuration is malformed.
    #[error("Invalid YAML config: {0}")]
    ConfigYaml(#[from] serde_yaml_ng::Error),

    /// JSON configuration is malformed.
    #[error("Invalid JSON config: {0}")]
    ConfigJson(#[from] serde_json::Error),

    /// Unknown target language name.
    #[error("Unknown target language '{0}'")]
    UnknownLanguage(String),

    /// Configuration values are out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl CompileError {
    /// The source location the error points at, if any.
    pub fn location(&self) -> Option<&Location> {
        match self {
            CompileError::Ir(err) => err.location(),
            CompileError::UnsolvableSizeInference { location, .. }
            | CompileError::AmbiguousCombinedSize { location, .. }
            | CompileError::UnevenExtension { location, .. } => location.as_ref(),
            _ => None,
        }
    }
}

/// Result type for lowering.
pub type CompileResult<T> = Result<T, CompileError>;
