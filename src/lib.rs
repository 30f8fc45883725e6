#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! # Fixity - File Integrity Store
//!
//! Fixity records a cryptographic fingerprint for each tracked file and later
//! reports whether the file still matches it.
//!
//! ## Architecture
//!
//! - [`digest`]: streaming SHA-256 / BLAKE3 fingerprints of file content
//! - [`storage`]: the path to fingerprint record store and its text format
//! - [`verify`]: the four-way verification outcome and the verifier
//! - [`tracker`]: add / update / check operations with persistence
//! - [`commands`]: CLI command implementations
//! - [`config`]: TOML configuration
//!
//! ## Example Usage
//!
//! ```no_run
//! use fixity::digest::DigestEngine;
//! use fixity::tracker::Tracker;
//!
//! # fn main() -> anyhow::Result<()> {
//! let (mut tracker, _report) = Tracker::open("data/integrity_db.txt", DigestEngine::default())?;
//! tracker.add_file("/etc/hosts")?;
//!
//! let result = tracker.check_file("/etc/hosts");
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations for the CLI.
pub mod commands;

/// Configuration parsing, validation, and management.
#[allow(missing_docs)]
pub mod config;

pub mod digest;

pub mod error;

pub mod logging;

pub mod output;

/// Record store, record codec and the concurrent store handle.
pub mod storage;

pub mod tracker;

pub mod utils;

pub mod verify;

#[cfg(test)]
mod test_utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the fixity binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default record store location, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "data/integrity_db.txt";

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/fixity/config";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "FIXITY_CONFIG_PATH";

/// Environment variable overriding the record store location.
pub const STORE_PATH_ENV: &str = "FIXITY_STORE_PATH";

/// Resolved locations and settings for one invocation.
///
/// # Examples
///
/// ```no_run
/// use fixity::FixityContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Default config location, store path from config or environment
/// let ctx = FixityContext::new(None)?;
///
/// // Explicit paths (for testing)
/// let ctx = FixityContext::new_explicit("/tmp/db.txt".into(), "/tmp/config".into())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FixityContext {
    /// Path to the record store file.
    pub store_path: PathBuf,

    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl FixityContext {
    /// Creates a context from the default or environment-selected config file.
    ///
    /// Store location precedence: `store_override`, then `FIXITY_STORE_PATH`,
    /// then `core.store_path` from the config.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or if the
    /// configuration file cannot be read or created.
    pub fn new(store_override: Option<PathBuf>) -> Result<Self> {
        // Check environment variable for config path first
        let config_path = if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            PathBuf::from(path)
        } else {
            let home = dirs::home_dir().context("Could not find home directory")?;
            home.join(DEFAULT_CONFIG_PATH)
        };

        let config = config::Config::load(&config_path)
            .with_context(|| format!("Failed to load configuration: {}", config_path.display()))?;

        let store_path = match store_override {
            Some(path) => path,
            None => match std::env::var(STORE_PATH_ENV) {
                Ok(path) if !path.is_empty() => PathBuf::from(path),
                _ => config.core.store_path.clone(),
            },
        };
        let store_path = utils::expand_tilde(&store_path.to_string_lossy())?;

        tracing::debug!(
            config = %config_path.display(),
            store = %store_path.display(),
            algorithm = %config.digest.algorithm,
            "resolved context"
        );

        Ok(Self {
            store_path,
            config_path,
            config,
        })
    }

    /// Creates a context with explicit paths, bypassing environment lookup.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(store_path: PathBuf, config_path: PathBuf) -> Result<Self> {
        let config = config::Config::load(&config_path)?;
        Ok(Self {
            store_path,
            config_path,
            config,
        })
    }

    /// Opens the record store with the configured digest engine.
    ///
    /// Malformed records are skipped (and logged); a warning summarises how
    /// many were dropped.
    ///
    /// # Errors
    /// Returns an error if the store file exists but cannot be read.
    pub fn open_tracker(&self) -> Result<tracker::Tracker> {
        let (tracker, report) =
            tracker::Tracker::open(&self.store_path, self.config.digest_engine()).with_context(
                || format!("Failed to load record store: {}", self.store_path.display()),
            )?;
        if report.skipped > 0 {
            output::warning(&format!(
                "Skipped {} malformed record(s) in {}",
                report.skipped,
                self.store_path.display()
            ));
        }
        Ok(tracker)
    }

    /// Ensures the directory holding the record store exists.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn ensure_store_dir(&self) -> Result<()> {
        utils::ensure_parent_dirs(&self.store_path)
    }
}
