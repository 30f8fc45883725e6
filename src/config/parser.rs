use super::Config;
use crate::digest::MAX_CHUNK_SIZE;
use anyhow::{Context, Result};
use std::path::Path;

pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;

    // Validate and return validation errors directly without wrapping
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    validate_chunk_size(config.digest.chunk_size)?;

    if config.core.store_path.as_os_str().is_empty() {
        anyhow::bail!("core.store_path cannot be empty");
    }

    Ok(())
}

/// Reject chunk sizes outside `1..=16 MiB`.
///
/// # Errors
///
/// Returns an error naming the accepted range.
pub fn validate_chunk_size(size: usize) -> Result<()> {
    if size == 0 || size > MAX_CHUNK_SIZE {
        anyhow::bail!("digest.chunk_size must be between 1 and {MAX_CHUNK_SIZE} bytes");
    }
    Ok(())
}
