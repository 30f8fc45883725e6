//! Path helpers shared by the command layer.
//!
//! # Examples
//!
//! ```
//! use fixity::utils::{expand_tilde, path_key};
//!
//! # fn main() -> anyhow::Result<()> {
//! let path = expand_tilde("~/.bashrc")?;
//! assert!(!path.as_os_str().is_empty());
//!
//! assert_eq!(path_key("notes/a.txt")?, "notes/a.txt");
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Expands a path starting with `~` to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path is empty.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        anyhow::bail!("Path cannot be empty");
    }
    if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Ok(home);
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(path))
}

/// Store key for a path argument: tilde-expanded, otherwise spelled exactly
/// as given.
///
/// # Errors
///
/// Returns an error if the path is empty or the expanded path is not UTF-8.
pub fn path_key(path: &str) -> Result<String> {
    let expanded = expand_tilde(path)?;
    expanded
        .into_os_string()
        .into_string()
        .map_err(|p| anyhow::anyhow!("Path is not valid UTF-8: {}", PathBuf::from(p).display()))
}

/// Ensures parent directories exist for a given path
///
/// # Errors
///
/// Returns an error if the parent directories cannot be created
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create parent directories for {}", path.display())
        })?;
    }
    Ok(())
}
