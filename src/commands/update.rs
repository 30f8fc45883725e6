use super::resolve_keys;
use crate::digest::Fingerprint;
use crate::{FixityContext, output};
use anyhow::Result;
use std::collections::BTreeMap;

/// Record a new fingerprint for already tracked `paths`.
///
/// # Errors
///
/// Returns an error wrapping `TrackError::NotTracked` if any path was never
/// added, or an I/O error if a file cannot be digested or the store cannot be
/// saved.
pub fn execute(ctx: &FixityContext, paths: &[String]) -> Result<()> {
    let keys = resolve_keys(paths)?;
    let mut tracker = ctx.open_tracker()?;
    ctx.ensure_store_dir()?;

    let previous: BTreeMap<&str, Fingerprint> = keys
        .iter()
        .filter_map(|k| Some((k.as_str(), tracker.store().lookup(k)?.clone())))
        .collect();
    let recorded = tracker.update_files(&keys)?;

    let mut changed = 0;
    for (path, fingerprint) in &recorded {
        if previous.get(path.as_str()) == Some(fingerprint) {
            output::recorded("unchanged", path, fingerprint.as_str());
        } else {
            changed += 1;
            output::recorded("updated", path, fingerprint.as_str());
        }
    }
    output::success(&format!(
        "Updated {} file(s), {} unchanged",
        changed,
        recorded.len() - changed
    ));
    Ok(())
}
