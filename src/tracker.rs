//! Add, update and check operations over a loaded record store.
//!
//! `add` refuses paths that are already tracked and `update` refuses paths
//! that are not, so recording a new digest is always a deliberate act. Both
//! persist the store before returning, and a failed save leaves the in-memory
//! records as they were. `check` never writes.

use crate::digest::{DigestEngine, Fingerprint};
use crate::error::{TrackError, TrackerError};
use crate::storage::{LoadReport, RecordStore};
use crate::verify::{VerificationResult, Verifier};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Whether a recording operation requires the path to be new or known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Add,
    Update,
}

/// A record store paired with the digest engine used to fill it.
#[derive(Debug, Clone)]
pub struct Tracker {
    store: RecordStore,
    engine: DigestEngine,
}

impl Tracker {
    /// Wrap an already loaded store.
    #[must_use]
    pub const fn new(store: RecordStore, engine: DigestEngine) -> Self {
        Self { store, engine }
    }

    /// Load the store at `location` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Store` if the store file exists but cannot be read.
    pub fn open(
        location: impl Into<std::path::PathBuf>,
        engine: DigestEngine,
    ) -> Result<(Self, LoadReport), TrackerError> {
        let mut store = RecordStore::new(location);
        let report = store.load()?;
        Ok((Self::new(store, engine), report))
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Start tracking `path` and persist the store.
    ///
    /// # Errors
    ///
    /// - `TrackError::AlreadyTracked` if `path` already has a record
    /// - `DigestError` if the file cannot be read
    /// - `StoreError` if the store cannot be saved
    pub fn add_file(&mut self, path: &str) -> Result<Fingerprint, TrackerError> {
        self.record(std::slice::from_ref(&path), Mode::Add)
            .map(|mut recorded| recorded.remove(0).1)
    }

    /// Record a new digest for an already tracked `path` and persist the store.
    ///
    /// # Errors
    ///
    /// - `TrackError::NotTracked` if `path` has no record
    /// - `DigestError` if the file cannot be read
    /// - `StoreError` if the store cannot be saved
    pub fn update_file(&mut self, path: &str) -> Result<Fingerprint, TrackerError> {
        self.record(std::slice::from_ref(&path), Mode::Update)
            .map(|mut recorded| recorded.remove(0).1)
    }

    /// Add several paths with a single save. Nothing is recorded unless every
    /// path passes the policy check and digests successfully and the store is
    /// saved. A path given more than once is recorded once.
    ///
    /// # Errors
    ///
    /// See [`add_file`](Self::add_file).
    pub fn add_files<S: AsRef<str>>(
        &mut self,
        paths: &[S],
    ) -> Result<Vec<(String, Fingerprint)>, TrackerError> {
        self.record(paths, Mode::Add)
    }

    /// Update several paths with a single save. Nothing is recorded unless
    /// every path is tracked, digests successfully, and the store is saved.
    /// A path given more than once is recorded once.
    ///
    /// # Errors
    ///
    /// See [`update_file`](Self::update_file).
    pub fn update_files<S: AsRef<str>>(
        &mut self,
        paths: &[S],
    ) -> Result<Vec<(String, Fingerprint)>, TrackerError> {
        self.record(paths, Mode::Update)
    }

    fn record<S: AsRef<str>>(
        &mut self,
        paths: &[S],
        mode: Mode,
    ) -> Result<Vec<(String, Fingerprint)>, TrackerError> {
        let mut seen = BTreeSet::new();
        let paths: Vec<&str> = paths
            .iter()
            .map(|path| path.as_ref())
            .filter(|path| seen.insert(*path))
            .collect();

        for &path in &paths {
            match (mode, self.store.contains(path)) {
                (Mode::Add, true) => {
                    return Err(TrackError::AlreadyTracked {
                        path: path.to_string(),
                    }
                    .into());
                }
                (Mode::Update, false) => {
                    return Err(TrackError::NotTracked {
                        path: path.to_string(),
                    }
                    .into());
                }
                _ => {}
            }
        }

        let mut recorded = Vec::with_capacity(paths.len());
        for &path in &paths {
            let fingerprint = self.engine.digest_file(Path::new(path))?;
            recorded.push((path.to_string(), fingerprint));
        }

        let replaced: Vec<Option<Fingerprint>> = recorded
            .iter()
            .map(|(path, fingerprint)| self.store.upsert(path.clone(), fingerprint.clone()))
            .collect();
        if let Err(e) = self.store.save() {
            for ((path, _), previous) in recorded.iter().zip(replaced) {
                match previous {
                    Some(fingerprint) => {
                        self.store.upsert(path.clone(), fingerprint);
                    }
                    None => {
                        self.store.remove(path);
                    }
                }
            }
            return Err(e.into());
        }

        info!(
            count = recorded.len(),
            store = %self.store.location().display(),
            mode = ?mode,
            "recorded fingerprints"
        );
        Ok(recorded)
    }

    /// Verify one path. Read-only.
    #[must_use]
    pub fn check_file(&self, path: &str) -> VerificationResult {
        self.verifier().verify(path)
    }

    /// Verify several paths, keeping input order.
    #[must_use]
    pub fn check_files(
        &self,
        paths: &[String],
        parallel: bool,
    ) -> Vec<(String, VerificationResult)> {
        self.verifier().verify_many(paths, parallel)
    }

    /// Verify every tracked path.
    #[must_use]
    pub fn check_all(&self, parallel: bool) -> Vec<(String, VerificationResult)> {
        self.verifier().verify_all(parallel)
    }

    fn verifier(&self) -> Verifier<'_> {
        Verifier::new(&self.store, self.engine)
    }
}
