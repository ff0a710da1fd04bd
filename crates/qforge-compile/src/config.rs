//! Compile configuration.
//!
//! Loaded from YAML or JSON files; every field has a default so partial
//! files are accepted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{CompileError, CompileResult};

/// Backend language a module is compiled for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    /// C.
    #[default]
    C,
    /// C++.
    #[serde(alias = "c++", alias = "cxx")]
    Cpp,
    /// Rust.
    #[serde(alias = "rs")]
    Rust,
    /// Java.
    Java,
    /// Python.
    #[serde(alias = "py")]
    Python,
}

impl FromStr for TargetLanguage {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(TargetLanguage::C),
            "c++" | "cpp" | "cxx" => Ok(TargetLanguage::Cpp),
            "rust" | "rs" => Ok(TargetLanguage::Rust),
            "java" => Ok(TargetLanguage::Java),
            "py" | "python" => Ok(TargetLanguage::Python),
            _ => Err(CompileError::UnknownLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TargetLanguage::C => "c",
            TargetLanguage::Cpp => "cpp",
            TargetLanguage::Rust => "rust",
            TargetLanguage::Java => "java",
            TargetLanguage::Python => "python",
        })
    }
}

/// Options controlling lowering and emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Backend language.
    pub target_language: TargetLanguage,
    /// Emit a library instead of an executable program.
    pub build_library: bool,
    /// Emit explanatory comments into generated code.
    pub emit_comments: bool,
    /// Spaces per indentation level.
    pub indent: usize,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            target_language: TargetLanguage::default(),
            build_library: false,
            emit_comments: true,
            indent: 4,
        }
    }
}

impl CompileConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(contents: &str) -> CompileResult<Self> {
        let config: CompileConfig = serde_yaml_ng::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document.
    pub fn from_json_str(contents: &str) -> CompileResult<Self> {
        let config: CompileConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are parsed as JSON, anything else as
    /// YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CompileResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CompileError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> CompileResult<()> {
        if !(1..=16).contains(&self.indent) {
            return Err(CompileError::InvalidConfig(format!(
                "indent must be between 1 and 16, got {}",
                self.indent
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_aliases() {
        assert_eq!("C++".parse::<TargetLanguage>().unwrap(), TargetLanguage::Cpp);
        assert_eq!("cxx".parse::<TargetLanguage>().unwrap(), TargetLanguage::Cpp);
        assert_eq!("rs".parse::<TargetLanguage>().unwrap(), TargetLanguage::Rust);
        assert_eq!("py".parse::<TargetLanguage>().unwrap(), TargetLanguage::Python);
        assert!(matches!(
            "cobol".parse::<TargetLanguage>(),
            Err(CompileError::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_yaml_partial() {
        let config = CompileConfig::from_yaml_str("target_language: c++\nbuild_library: true\n").unwrap();
        assert_eq!(config.target_language, TargetLanguage::Cpp);
        assert!(config.build_library);
        assert_eq!(config.indent, 4);
    }

    #[test]
    fn test_json() {
        let config = CompileConfig::from_json_str(r#"{"target_language": "rust", "indent": 2}"#).unwrap();
        assert_eq!(config.target_language, TargetLanguage::Rust);
        assert_eq!(config.indent, 2);
        assert!(config.emit_comments);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            CompileConfig::from_json_str(r#"{"indent": 0}"#),
            Err(CompileError::InvalidConfig(_))
        ));
        assert!(matches!(
            CompileConfig::from_yaml_str("target_language: [1, 2]"),
            Err(CompileError::ConfigYaml(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = CompileConfig::from_file("/nonexistent/qforge.yaml").unwrap_err();
        assert!(matches!(err, CompileError::ConfigIo { .. }));
    }
}
