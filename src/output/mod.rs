//! Terminal output for the fixity CLI.
//!
//! Result lines (one per checked or recorded file) go to stdout; status
//! messages go to stderr. Informational messages honour a global verbosity.

use crate::verify::VerificationResult;
use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Suppress informational messages, show only warnings and errors.
    Quiet = 0,
    /// Default verbosity level, show all standard messages.
    Normal = 1,
    /// Show verbose debug messages in addition to standard output.
    Verbose = 2,
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Prints a success message in green (respects quiet mode).
pub fn success(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message in bold red (always shown).
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red().bold());
}

/// Prints a warning message in bold yellow (always shown).
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow().bold());
}

/// Prints an informational message in dimmed color (respects quiet mode).
pub fn info(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints a fingerprint line for a recorded file.
pub fn recorded(verb: &str, path: &str, fingerprint: &str) {
    println!("{} {path}  {}", format!("{verb}:").green(), fingerprint.dimmed());
}

/// Prints one verification result line.
pub fn verification(path: &str, result: &VerificationResult) {
    let tag = match result {
        VerificationResult::Intact => "OK".green().bold(),
        VerificationResult::Violated { .. } => "VIOLATED".red().bold(),
        VerificationResult::Unknown => "UNKNOWN".yellow().bold(),
        VerificationResult::HashError { .. } => "ERROR".magenta().bold(),
    };
    if result.is_intact() {
        if get_verbosity() != Verbosity::Quiet {
            println!("{tag} {path}");
        }
    } else {
        println!("{tag} {path}: {result}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_round_trip() {
        let levels = [Verbosity::Quiet, Verbosity::Normal, Verbosity::Verbose];
        for level in &levels {
            set_verbosity(*level);
            assert_eq!(get_verbosity(), *level);
        }
        set_verbosity(Verbosity::Normal);
    }
}
