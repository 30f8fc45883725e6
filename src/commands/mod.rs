//! Command implementations behind the `fixity` subcommands.
//!
//! Each command resolves paths, runs the matching [`Tracker`](crate::tracker::Tracker)
//! operation and prints the outcome. Policy errors surface as
//! [`TrackError`](crate::error::TrackError) inside the returned `anyhow::Error`.

pub mod add;
pub mod check;
pub mod config;
pub mod list;
pub mod update;

use crate::utils::path_key;
use anyhow::Result;

/// Convert command-line path arguments into store keys.
fn resolve_keys(paths: &[String]) -> Result<Vec<String>> {
    paths.iter().map(|p| path_key(p)).collect()
}
