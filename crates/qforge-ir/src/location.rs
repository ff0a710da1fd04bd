//! Source locations attached to expressions, instructions and diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A position in a source file. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Source file, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Line number.
    pub line: u32,
    /// Column number.
    pub column: u32,
}

impl Location {
    /// Create a location inside a file.
    pub fn new(source: impl AsRef<Path>, line: u32, column: u32) -> Self {
        Location {
            source: Some(source.as_ref().to_path_buf()),
            line,
            column,
        }
    }

    /// Create a location without a source file.
    pub fn anonymous(line: u32, column: u32) -> Self {
        Location {
            source: None,
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(path) => write!(f, "{}:{}:{}", path.display(), self.line, self.column),
            None => write!(f, "<unknown>:{}:{}", self.line, self.column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new("main.qf", 3, 14).to_string(), "main.qf:3:14");
        assert_eq!(Location::anonymous(1, 1).to_string(), "<unknown>:1:1");
    }
}
