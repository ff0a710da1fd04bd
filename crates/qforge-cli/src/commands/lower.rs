//! Lower command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use tracing::info;

use qforge_compile::{CompileConfig, Diagnostics, ListingGenerator, TargetLanguage};

use crate::OutputFormat;
use crate::demos;

/// Command-line settings layered over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    /// Config file.
    pub config: Option<PathBuf>,
    /// Target language name.
    pub language: Option<String>,
    /// Build a library.
    pub library: bool,
    /// Omit listing comments.
    pub no_comments: bool,
    /// Indentation width.
    pub indent: Option<usize>,
}

impl Overrides {
    /// Load the config file, if any, and apply the flags on top.
    fn resolve(&self) -> Result<CompileConfig> {
        let mut config = match &self.config {
            Some(path) => CompileConfig::from_file(path)?,
            None => CompileConfig::default(),
        };
        if let Some(language) = &self.language {
            config.target_language = language.parse::<TargetLanguage>()?;
        }
        if self.library {
            config.build_library = true;
        }
        if self.no_comments {
            config.emit_comments = false;
        }
        if let Some(indent) = self.indent {
            config.indent = indent;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Execute the lower command.
pub fn execute(
    demo: &str,
    overrides: &Overrides,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let config = overrides.resolve()?;
    let module = demos::build(demo)?;
    info!(
        "Lowering demo {} for {} ({} functions)",
        demo,
        config.target_language,
        module.functions().len()
    );

    let mut generator = ListingGenerator::new(config);
    let listing = match module.dump_code(&mut generator) {
        Ok(listing) => listing,
        Err(diagnostics) => {
            report(&diagnostics, format)?;
            anyhow::bail!("lowering '{demo}' failed with {} error(s)", diagnostics.len());
        }
    };

    match output {
        Some(path) => {
            fs::write(path, &listing)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Lowered {} into {}",
                style("✓").green().bold(),
                style(demo).green(),
                style(path.display()).cyan()
            );
        }
        None if format == OutputFormat::Json => {
            let document = serde_json::json!({
                "demo": demo,
                "listing": listing,
                "diagnostics": [],
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        None => print!("{listing}"),
    }
    Ok(())
}

fn report(diagnostics: &Diagnostics, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(diagnostics)?);
        }
        OutputFormat::Text => {
            for diagnostic in diagnostics {
                let location = diagnostic
                    .location
                    .as_ref()
                    .map(|l| format!("{l}: "))
                    .unwrap_or_default();
                eprintln!(
                    "{}{} {}",
                    style(location).bold(),
                    style(format!("{}:", diagnostic.severity)).red().bold(),
                    diagnostic.message
                );
            }
        }
    }
    Ok(())
}
