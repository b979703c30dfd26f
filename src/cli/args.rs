//! CLI argument parsing using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for seriesgate commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// Machine-readable JSON
    Json,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Automatically detect if the terminal supports color
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

impl ColorChoice {
    /// Maps to the termcolor choice, probing stdout for `Auto`
    pub fn for_stdout(self) -> termcolor::ColorChoice {
        match self {
            ColorChoice::Auto => {
                if std::io::stdout().is_terminal() {
                    termcolor::ColorChoice::Auto
                } else {
                    termcolor::ColorChoice::Never
                }
            }
            ColorChoice::Always => termcolor::ColorChoice::Always,
            ColorChoice::Never => termcolor::ColorChoice::Never,
        }
    }
}

/// Seriesgate CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "seriesgate")]
#[command(about = "Rule-driven trigger engine for forwarding medical-image series to AI models")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Output coloring
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,
}

/// Available seriesgate subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse and validate a rule file
    Validate {
        /// Path to the rule file
        rulefile: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },

    /// Evaluate a rule file against a series of attribute records
    Evaluate {
        /// Path to the rule file
        rulefile: PathBuf,

        /// JSON file holding an array of per-image records keyed "GGGG,EEEE"
        #[arg(long)]
        records: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },

    /// Parse a semi-structured query response and print it as JSON
    Inspect {
        /// Path to the response text
        responsefile: PathBuf,
    },
}
