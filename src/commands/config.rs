use crate::FixityContext;
use crate::config::KEYS;
use anyhow::Result;

/// Read, write or list configuration values.
///
/// - no key, or `list`: print every `key = value`
/// - key only: print its value
/// - key and value: set and save
///
/// # Errors
///
/// Returns an error for unknown keys, invalid values, or if the
/// configuration file cannot be written.
pub fn execute(
    ctx: &mut FixityContext,
    key: Option<&str>,
    value: Option<String>,
    list: bool,
) -> Result<()> {
    match (key, value) {
        (None, _) => list_all(ctx),
        (Some(_), _) if list => list_all(ctx),
        (Some(key), None) => {
            let current = ctx
                .config
                .get(key)
                .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {key}"))?;
            println!("{current}");
        }
        (Some(key), Some(value)) => {
            let previous = ctx.config.digest.algorithm;
            ctx.config.set(key, &value)?;
            ctx.config.save(&ctx.config_path)?;
            crate::output::success(&format!("Set {key} = {value}"));
            if ctx.config.digest.algorithm != previous {
                crate::output::warning(
                    "Existing records keep their old fingerprints and will report as violated until updated",
                );
            }
        }
    }
    Ok(())
}

fn list_all(ctx: &FixityContext) {
    for key in KEYS {
        if let Some(value) = ctx.config.get(key) {
            println!("{key} = {value}");
        }
    }
}
