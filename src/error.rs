//! Typed errors for the digest engine, record store and tracking policy.
//!
//! The command layer wraps these in `anyhow` with extra context; library
//! callers can match on them directly.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to compute a fingerprint.
#[derive(Debug, Error)]
pub enum DigestError {
    /// The file could not be opened for reading.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// File that was being digested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading failed part way through the file.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that was being digested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A hex string did not have the shape of a fingerprint.
    #[error("invalid fingerprint '{value}': {reason}")]
    InvalidFingerprint {
        /// The rejected input
        value: String,
        /// Why it was rejected
        reason: &'static str,
    },
}

/// Failure reading or writing the backing store file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file exists but could not be read.
    #[error("cannot read record store {}: {source}", path.display())]
    Read {
        /// Backing location
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The backing file could not be written or replaced.
    #[error("cannot write record store {}: {source}", path.display())]
    Write {
        /// Backing location
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// A single line of the store file that could not be parsed.
///
/// These are never fatal: `load` skips the line and logs a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// No `|` between path and digest.
    #[error("missing '|' delimiter")]
    MissingDelimiter,
    /// Nothing before the delimiter.
    #[error("empty path")]
    EmptyPath,
    /// Nothing after the delimiter.
    #[error("empty digest")]
    EmptyDigest,
    /// A backslash escape other than `\\`, `\n` or `\r`.
    #[error("invalid escape sequence in path")]
    InvalidEscape,
    /// The line is not valid UTF-8.
    #[error("line is not valid UTF-8")]
    NotUtf8,
}

/// Add-versus-update policy violations raised by the command layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    /// `add` was called for a path that already has a recorded digest.
    #[error("{path} is already tracked; use 'fixity update' to record a new digest")]
    AlreadyTracked {
        /// Path as given by the caller
        path: String,
    },

    /// `update` was called for a path that was never added.
    #[error("{path} is not tracked; use 'fixity add' first")]
    NotTracked {
        /// Path as given by the caller
        path: String,
    },
}

/// Any failure of a tracking operation.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Add/update policy rejected the path.
    #[error(transparent)]
    Track(#[from] TrackError),
    /// The file could not be digested.
    #[error(transparent)]
    Digest(#[from] DigestError),
    /// The record store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}
