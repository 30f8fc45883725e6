pub mod parser;

use crate::digest::{DEFAULT_CHUNK_SIZE, DigestEngine, HashAlgorithm};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Every key accepted by [`Config::get`] and [`Config::set`].
pub const KEYS: &[&str] = &[
    "core.store_path",
    "digest.algorithm",
    "digest.chunk_size",
    "check.parallel",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,

    #[serde(default)]
    pub digest: DigestConfig,

    #[serde(default)]
    pub check: CheckConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoreConfig {
    /// Record store file; relative paths resolve against the working directory
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DigestConfig {
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckConfig {
    /// Verify multiple files on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot read or parse the configuration file
    /// - Configuration file contains invalid TOML or out-of-range values
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            // Create default config if it doesn't exist
            let config = Self::default();
            config.save(path)?;
            tracing::debug!(config = %path.display(), "wrote default configuration");
            return Ok(config);
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Digest engine described by the `[digest]` section.
    #[must_use]
    pub fn digest_engine(&self) -> DigestEngine {
        DigestEngine::new(self.digest.algorithm, self.digest.chunk_size)
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key.split_once('.')? {
            ("core", "store_path") => Some(self.core.store_path.display().to_string()),
            ("digest", "algorithm") => Some(self.digest.algorithm.to_string()),
            ("digest", "chunk_size") => Some(self.digest.chunk_size.to_string()),
            ("check", "parallel") => Some(self.check.parallel.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value is invalid for the key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts = key
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Invalid configuration key: {key}"))?;

        match parts {
            ("core", "store_path") => {
                if value.is_empty() {
                    anyhow::bail!("Store path cannot be empty");
                }
                self.core.store_path = PathBuf::from(value);
            }
            ("digest", "algorithm") => self.digest.algorithm = value.parse()?,
            ("digest", "chunk_size") => {
                let size: usize = value
                    .parse()
                    .with_context(|| format!("Invalid number: {value}"))?;
                parser::validate_chunk_size(size)?;
                self.digest.chunk_size = size;
            }
            ("check", "parallel") => {
                self.check.parallel = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {key}")),
        }
        Ok(())
    }
}

// Default functions for serde
fn default_store_path() -> PathBuf {
    PathBuf::from(crate::DEFAULT_STORE_PATH)
}

const fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

const fn default_parallel() -> bool {
    true
}
