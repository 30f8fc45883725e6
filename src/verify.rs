//! Integrity verification: compares a file's current digest to the recorded one.

use crate::digest::{DigestEngine, Fingerprint};
use crate::storage::RecordStore;
use rayon::prelude::*;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of checking one path.
///
/// None of these are errors: an untracked path, a mismatch, and an
/// unreadable file are all ordinary answers to "has this file changed?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// The path was never recorded.
    Unknown,
    /// Current digest equals the recorded digest.
    Intact,
    /// Current digest differs from the recorded digest.
    Violated {
        /// Recorded fingerprint
        expected: Fingerprint,
        /// Fingerprint computed now
        actual: Fingerprint,
    },
    /// The file is tracked but its digest could not be computed.
    HashError {
        /// Description of the I/O failure
        reason: String,
    },
}

impl VerificationResult {
    /// Whether the file matched its record.
    #[must_use]
    pub const fn is_intact(&self) -> bool {
        matches!(self, Self::Intact)
    }

    /// Ranking used to pick the overall outcome of a multi-file check.
    ///
    /// Intact < Unknown < HashError < Violated.
    #[must_use]
    pub const fn severity(&self) -> u8 {
        match self {
            Self::Intact => 0,
            Self::Unknown => 1,
            Self::HashError { .. } => 2,
            Self::Violated { .. } => 3,
        }
    }

    /// Process exit status for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Intact => 0,
            Self::Violated { .. } => 3,
            Self::Unknown => 4,
            Self::HashError { .. } => 5,
        }
    }

    /// Short lowercase label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Intact => "intact",
            Self::Violated { .. } => "violated",
            Self::HashError { .. } => "hash-error",
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("not tracked"),
            Self::Intact => f.write_str("intact"),
            Self::Violated { expected, actual } => write!(
                f,
                "integrity violation (expected {}, found {})",
                expected.short(),
                actual.short()
            ),
            Self::HashError { reason } => write!(f, "cannot verify: {reason}"),
        }
    }
}

/// Checks tracked files against a [`RecordStore`].
///
/// Each call is independent and read-only; retrying is just calling again.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<'a> {
    store: &'a RecordStore,
    engine: DigestEngine,
}

impl<'a> Verifier<'a> {
    /// Verifier using `engine` to compute current digests.
    #[must_use]
    pub const fn new(store: &'a RecordStore, engine: DigestEngine) -> Self {
        Self { store, engine }
    }

    /// Check one path.
    #[must_use]
    pub fn verify(&self, path: &str) -> VerificationResult {
        let Some(expected) = self.store.lookup(path) else {
            debug!(path, "not tracked");
            return VerificationResult::Unknown;
        };

        let actual = match self.engine.digest_file(Path::new(path)) {
            Ok(fp) => fp,
            Err(e) => {
                warn!(path, error = %e, "cannot digest tracked file");
                return VerificationResult::HashError {
                    reason: e.to_string(),
                };
            }
        };

        if actual == *expected {
            VerificationResult::Intact
        } else {
            warn!(path, expected = %expected, actual = %actual, "integrity violation");
            VerificationResult::Violated {
                expected: expected.clone(),
                actual,
            }
        }
    }

    /// Check several paths, optionally in parallel. Results keep input order.
    #[must_use]
    pub fn verify_many(
        &self,
        paths: &[String],
        parallel: bool,
    ) -> Vec<(String, VerificationResult)> {
        if parallel {
            paths
                .par_iter()
                .map(|p| (p.clone(), self.verify(p)))
                .collect()
        } else {
            paths.iter().map(|p| (p.clone(), self.verify(p))).collect()
        }
    }

    /// Check every tracked path.
    #[must_use]
    pub fn verify_all(&self, parallel: bool) -> Vec<(String, VerificationResult)> {
        self.verify_many(&self.store.paths(), parallel)
    }
}

/// Most severe outcome in `results`, if any.
#[must_use]
pub fn worst<'r>(
    results: impl IntoIterator<Item = &'r VerificationResult>,
) -> Option<&'r VerificationResult> {
    results.into_iter().max_by_key(|r| r.severity())
}
