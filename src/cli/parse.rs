//! CLI parse: clap types for askfile. No behavior; definitions only.

use crate::engine::ArrayScope;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// askfile - schema-driven configuration capture
#[derive(Parser, Debug)]
#[command(name = "askfile")]
#[command(about = "Walk a schema of questions and save the answers as YAML or JSON")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (relative paths resolve against it)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask every question in the schema and save the answers
    Run {
        /// Schema file (defaults to the configured schema_path)
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Artifact path; .json writes JSON, anything else YAML.
        /// Without one the answers are printed to stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Take every default without prompting
        #[arg(long)]
        defaults: bool,

        /// Array sibling visibility (live, isolated)
        #[arg(long)]
        array_scope: Option<ArrayScope>,

        /// Do not print the final answers table
        #[arg(long)]
        no_summary: bool,
    },
    /// Print the default-valued skeleton without asking anything
    Skeleton {
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Output format (yaml, json)
        #[arg(long, default_value = "yaml")]
        format: String,
    },
    /// Check a schema's expressions, patterns and handler references
    Check {
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Run { .. } => "run",
            Commands::Skeleton { .. } => "skeleton",
            Commands::Check { .. } => "check",
        }
    }
}
