use super::resolve_keys;
use crate::{FixityContext, output};
use anyhow::Result;

/// Start tracking `paths`.
///
/// Every path is checked before anything is recorded, so one already-tracked
/// or unreadable file leaves the store unchanged.
///
/// # Errors
///
/// Returns an error wrapping `TrackError::AlreadyTracked` if any path is
/// already tracked, or an I/O error if a file cannot be digested or the store
/// cannot be saved.
pub fn execute(ctx: &FixityContext, paths: &[String]) -> Result<()> {
    let keys = resolve_keys(paths)?;
    let mut tracker = ctx.open_tracker()?;
    ctx.ensure_store_dir()?;

    let recorded = tracker.add_files(&keys)?;
    for (path, fingerprint) in &recorded {
        output::recorded("added", path, fingerprint.as_str());
    }
    output::success(&format!(
        "Tracking {} new file(s) in {}",
        recorded.len(),
        ctx.store_path.display()
    ));
    Ok(())
}
