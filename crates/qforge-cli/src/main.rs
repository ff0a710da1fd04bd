//! qforge Command-Line Interface
//!
//! Lowers the built-in demonstration modules and prints their listings or
//! diagnostics.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod demos;

use commands::{demos as list_demos, lower, version};

/// qforge - lowering for quantum/classical hybrid programs
#[derive(Parser)]
#[command(name = "qforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable.
    Text,
    /// JSON.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower a demonstration module and print its listing
    Lower {
        /// Demo name (see `qforge demos`)
        demo: String,

        /// Config file (YAML or JSON)
        #[arg(short, long, env = "QFORGE_CONFIG")]
        config: Option<PathBuf>,

        /// Target language (c, cpp, rust, java, python)
        #[arg(short, long)]
        language: Option<String>,

        /// Build a library instead of an executable
        #[arg(long)]
        library: bool,

        /// Omit comments from the listing
        #[arg(long)]
        no_comments: bool,

        /// Spaces per indentation level
        #[arg(long)]
        indent: Option<usize>,

        /// Diagnostic output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the demonstration modules
    Demos,

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Lower {
            demo,
            config,
            language,
            library,
            no_comments,
            indent,
            format,
            output,
        } => lower::execute(
            &demo,
            &lower::Overrides {
                config,
                language,
                library,
                no_comments,
                indent,
            },
            format,
            output.as_deref(),
        ),

        Commands::Demos => {
            list_demos::execute();
            Ok(())
        }

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
