//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Storyloom - story engine for LLM collaborative fiction
#[derive(Parser, Debug)]
#[command(name = "storyloom")]
#[command(about = "Story engine for LLM collaborative fiction", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this configuration file instead of the layered defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the narration request the next turn would send
    Context {
        /// Path to the book JSON document
        #[arg(long)]
        book: PathBuf,

        /// Path to the template (JSON or TOML)
        #[arg(long)]
        template: PathBuf,

        /// Only include the story before this segment id
        #[arg(long)]
        until: Option<String>,

        /// Writer input for the new turn
        #[arg(long, default_value = "")]
        input: String,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Write the book's full narrative as a Markdown document
    Export {
        /// Path to the book JSON document
        #[arg(long)]
        book: PathBuf,

        /// Directory receiving the export file
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Print the document instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Show every segment with its role and annotations
    Inspect {
        /// Path to the book JSON document
        #[arg(long)]
        book: PathBuf,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Validate the story invariants of a persisted book
    Check {
        /// Path to the book JSON document
        #[arg(long)]
        book: PathBuf,
    },

    /// List the book ids stored in a directory
    List {
        /// Directory holding `<book_id>.json` files
        dir: PathBuf,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_accepts_cutoff_and_global_flags() {
        let cli = Cli::try_parse_from([
            "storyloom",
            "context",
            "--book",
            "b.json",
            "--template",
            "t.toml",
            "--until",
            "seg-7",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Context { until, format, input, .. } => {
                assert_eq!(until.as_deref(), Some("seg-7"));
                assert_eq!(format, OutputFormat::Json);
                assert!(input.is_empty());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn export_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["storyloom", "export", "--book", "b.json"]).unwrap();
        match cli.command {
            Commands::Export { out_dir, stdout, .. } => {
                assert_eq!(out_dir, PathBuf::from("."));
                assert!(!stdout);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
