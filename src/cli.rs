//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Request field filter for HTTP middleware chains
#[derive(Parser)]
#[command(
    name = "field-filter",
    version,
    about = "Request field filter for HTTP middleware chains",
    long_about = "Inspects one query or form field of a request, rejects it with \
                  400 Bad Request when the value contains disallowed content, \
                  and forwards it unchanged otherwise."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

/// Output format of the decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// JSON object (default)
    #[default]
    Json,
    /// Single line: "forward" or "reject <status> <message>"
    Text,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a JSON request description read from stdin (alias: eval)
    #[command(alias = "eval")]
    Run {
        /// Output format of the decision
        #[arg(long, short = 'f', default_value = "json")]
        format: Format,
    },
    /// Generate default configuration file
    Init {
        /// Path where to create the configuration file
        #[arg(long, short = 'p')]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Validate configuration file
    Check,
    /// Display version information
    Version,
}
