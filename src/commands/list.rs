use crate::{FixityContext, output};
use anyhow::Result;

/// Print every tracked path with its fingerprint.
///
/// # Errors
///
/// Returns an error if the store file exists but cannot be read.
pub fn execute(ctx: &FixityContext) -> Result<()> {
    let tracker = ctx.open_tracker()?;
    let store = tracker.store();

    if store.is_empty() {
        output::info(&format!("No files tracked in {}", ctx.store_path.display()));
        return Ok(());
    }

    for (path, fingerprint) in store.iter() {
        println!("{fingerprint}  {path}");
    }
    output::info(&format!(
        "{} file(s) tracked with {}",
        store.len(),
        ctx.config.digest.algorithm
    ));
    Ok(())
}
