//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Verminator - version compatibility validation for multi-product distributions
///
/// Validates per-instance release declarations against a global release
/// matrix, repairs dependency ranges and derives new releases.
#[derive(Parser, Debug)]
#[command(
    name = "verminator",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "VERMINATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate instance files against the release matrix, repairing dependency ranges
    Validate(ValidateArgs),

    /// Show the versions of every product compatible with a version
    Compat(CompatArgs),

    /// Derive a new release of an instance from an existing final release
    CreateRelease(CreateReleaseArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Instance files or directories containing them
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    /// Release matrix file (defaults to meta_file from the config)
    #[arg(short, long, value_name = "FILE")]
    pub meta: Option<PathBuf>,

    /// Write repaired instances back to their files
    #[arg(short, long)]
    pub write: bool,
}

/// Arguments for the compat command
#[derive(Parser, Debug)]
pub struct CompatArgs {
    /// Version to query, e.g. tool-1.3.2-final or tdc-1.0
    #[arg(id = "query_version", value_name = "VERSION")]
    pub version: String,

    /// Release matrix file (defaults to meta_file from the config)
    #[arg(short, long, value_name = "FILE")]
    pub meta: Option<PathBuf>,
}

/// Arguments for the create-release command
#[derive(Parser, Debug)]
pub struct CreateReleaseArgs {
    /// Instance file to add the release to
    #[arg(value_name = "INSTANCE")]
    pub instance: PathBuf,

    /// Version of the new release
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Reference release (defaults to the latest final release of the target's product)
    #[arg(long, value_name = "VERSION")]
    pub from: Option<String>,

    /// Print the derived release without writing the instance file
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
