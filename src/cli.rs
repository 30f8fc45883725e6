//! Command-line interface definitions for fixity.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes, so we
//! allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for fixity.
#[derive(Parser)]
#[command(
    name = "fixity",
    version = crate::VERSION,
    about = "Detect unauthorized modification of tracked files",
    long_about = "Records a SHA-256 fingerprint per file and reports whether each tracked file is intact, violated, unknown, or unreadable"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Record store file (overrides FIXITY_STORE_PATH and core.store_path)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start tracking files by recording their fingerprints
    Add {
        /// Files to track
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Record a new fingerprint for already tracked files
    Update {
        /// Tracked files to re-fingerprint
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Check tracked files against their recorded fingerprints
    Check {
        /// Files to check
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        paths: Vec<String>,

        /// Check every tracked file
        #[arg(short, long)]
        all: bool,
    },

    /// List tracked files and their fingerprints
    List,

    /// Get and set configuration options
    Config {
        /// Configuration key (section.key)
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
