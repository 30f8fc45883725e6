use super::resolve_keys;
use crate::verify::{VerificationResult, worst};
use crate::{FixityContext, output};
use anyhow::Result;

/// Verify `paths`, or every tracked file when `all` is set. Never writes.
///
/// Returns the process exit code of the most severe outcome: 0 when every
/// file is intact, otherwise the code of the worst result.
///
/// # Errors
///
/// Returns an error if the store file exists but cannot be read.
pub fn execute(ctx: &FixityContext, paths: &[String], all: bool) -> Result<i32> {
    let tracker = ctx.open_tracker()?;
    let parallel = ctx.config.check.parallel;

    let results = if all {
        if tracker.store().is_empty() {
            output::info(&format!("No files tracked in {}", ctx.store_path.display()));
            return Ok(0);
        }
        tracker.check_all(parallel)
    } else {
        tracker.check_files(&resolve_keys(paths)?, parallel)
    };

    for (path, result) in &results {
        output::verification(path, result);
        if matches!(result, VerificationResult::Unknown) {
            output::info(&format!("Use 'fixity add {path}' to start tracking it"));
        }
    }

    let intact = results.iter().filter(|(_, r)| r.is_intact()).count();
    let overall = worst(results.iter().map(|(_, r)| r));
    let code = overall.map_or(0, VerificationResult::exit_code);
    tracing::info!(
        checked = results.len(),
        outcome = overall.map_or("none", VerificationResult::label),
        "check finished"
    );
    if code == 0 {
        output::success(&format!("Integrity verified: {intact} file(s) unchanged"));
    } else {
        output::error(&format!(
            "{} of {} file(s) failed verification",
            results.len() - intact,
            results.len()
        ));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::TestWorkspace;

    #[test]
    fn test_check_exit_codes() -> Result<()> {
        let ws = TestWorkspace::new()?;
        let file = ws.create_file("a.txt", "hello")?;
        let untracked = ws.create_file("b.txt", "other")?;
        crate::commands::add::execute(&ws.context, &[file.clone()])?;

        assert_eq!(execute(&ws.context, &[file.clone()], false)?, 0);
        assert_eq!(execute(&ws.context, &[untracked], false)?, 4);

        std::fs::write(&file, "tampered")?;
        assert_eq!(execute(&ws.context, &[file.clone()], false)?, 3);
        assert_eq!(execute(&ws.context, &[], true)?, 3);

        std::fs::remove_file(&file)?;
        assert_eq!(execute(&ws.context, &[file], false)?, 5);
        Ok(())
    }

    #[test]
    fn test_check_does_not_write_store() -> Result<()> {
        let ws = TestWorkspace::new()?;
        let file = ws.create_file("a.txt", "hello")?;

        execute(&ws.context, &[file], false)?;
        assert!(!ws.context.store_path.exists());
        Ok(())
    }

    #[test]
    fn test_check_all_on_empty_store() -> Result<()> {
        let ws = TestWorkspace::new()?;
        assert_eq!(execute(&ws.context, &[], true)?, 0);
        Ok(())
    }
}
