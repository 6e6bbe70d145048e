//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docqueue - batch scheduler for document operations
#[derive(Parser)]
#[command(
    name = "dq",
    about = "Priority-ordered, concurrency-capped batch runner for document operations",
    version,
    after_help = "Config is read from --config, ./.docqueue.yml, or ~/.config/docqueue/docqueue.yml"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run every operation in a batch manifest and report outcomes
    Run {
        /// YAML manifest listing the operations
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Override the concurrency cap
        #[arg(short = 'j', long)]
        max_concurrent: Option<usize>,

        /// Override the retry budget
        #[arg(short, long)]
        retry_attempts: Option<u32>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List operation kinds and their input cardinality
    Kinds,
}

/// Output format for the run summary
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
