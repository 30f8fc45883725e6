//! Streaming file digests.
//!
//! Files are folded into the hash accumulator one fixed-size chunk at a time,
//! so memory use is bounded by the chunk size regardless of file size. The
//! chunk size never affects the resulting fingerprint.

use crate::error::DigestError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Default read buffer size (32 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Largest chunk size accepted from configuration (16 MiB).
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Digest length in bytes shared by every supported algorithm.
pub const DIGEST_LEN: usize = 32;

/// SHA-256 of the empty input.
pub const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Hash function used to fingerprint file content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256, the reference algorithm
    #[default]
    Sha256,
    /// BLAKE3 with its default 32-byte output
    Blake3,
}

impl HashAlgorithm {
    /// Configuration name of the algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }

    fn accumulator(self) -> Accumulator {
        match self {
            Self::Sha256 => Accumulator::Sha256(Sha256::new()),
            Self::Blake3 => Accumulator::Blake3(Box::new(blake3::Hasher::new())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(anyhow::anyhow!(
                "Unknown hash algorithm: {other} (expected sha256 or blake3)"
            )),
        }
    }
}

enum Accumulator {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl Accumulator {
    fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(chunk),
            Self::Blake3(h) => {
                h.update(chunk);
            }
        }
    }

    fn finish(self) -> Fingerprint {
        let hex = match self {
            Self::Sha256(h) => hex::encode(h.finalize()),
            Self::Blake3(h) => hex::encode(h.finalize().as_bytes()),
        };
        Fingerprint(hex)
    }
}

/// Lowercase hexadecimal digest of a file's full content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parse a user-supplied fingerprint, requiring exactly 64 lowercase hex digits.
    ///
    /// # Errors
    ///
    /// Returns `DigestError::InvalidFingerprint` if the length or alphabet is wrong.
    pub fn parse(value: &str) -> Result<Self, DigestError> {
        let invalid = |reason| DigestError::InvalidFingerprint {
            value: value.to_string(),
            reason,
        };
        if value.len() != DIGEST_LEN * 2 {
            return Err(invalid("expected 64 hex characters"));
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(invalid("expected lowercase hexadecimal"));
        }
        Ok(Self(value.to_string()))
    }

    /// Wrap a digest read back from the store file without validating it.
    ///
    /// Stored digests are compared verbatim, so a hand-edited value simply
    /// fails to match.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for display.
    #[must_use]
    pub fn short(&self) -> &str {
        // Stored values are unvalidated and may hold multi-byte characters.
        self.0
            .char_indices()
            .nth(12)
            .map_or(self.0.as_str(), |(end, _)| &self.0[..end])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Computes fingerprints with a fixed algorithm and chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestEngine {
    algorithm: HashAlgorithm,
    chunk_size: usize,
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self::new(HashAlgorithm::default(), DEFAULT_CHUNK_SIZE)
    }
}

impl DigestEngine {
    /// Create an engine. A zero chunk size is bumped to one byte.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, chunk_size: usize) -> Self {
        Self {
            algorithm,
            chunk_size: chunk_size.clamp(1, MAX_CHUNK_SIZE),
        }
    }

    /// Algorithm in use.
    #[must_use]
    pub const fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Read buffer size in bytes.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Digest the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `DigestError::Open` if the file cannot be opened (missing,
    /// permission denied, is a directory on some platforms) and
    /// `DigestError::Read` if a read fails.
    pub fn digest_file(&self, path: &Path) -> Result<Fingerprint, DigestError> {
        let file = File::open(path).map_err(|source| DigestError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let fingerprint = self
            .digest_reader(file)
            .map_err(|source| DigestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(
            path = %path.display(),
            algorithm = %self.algorithm,
            fingerprint = %fingerprint,
            "digested file"
        );
        Ok(fingerprint)
    }

    /// Digest everything `reader` yields until EOF.
    ///
    /// # Errors
    ///
    /// Propagates any read error other than `Interrupted`.
    pub fn digest_reader<R: Read>(&self, mut reader: R) -> io::Result<Fingerprint> {
        let mut acc = self.algorithm.accumulator();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            acc.update(&buffer[..bytes_read]);
        }

        Ok(acc.finish())
    }

    /// Digest an in-memory buffer.
    #[must_use]
    pub fn digest_bytes(&self, data: &[u8]) -> Fingerprint {
        let mut acc = self.algorithm.accumulator();
        acc.update(data);
        acc.finish()
    }
}

/// Digest a file with SHA-256 and the default chunk size.
///
/// # Errors
///
/// See [`DigestEngine::digest_file`].
pub fn digest(path: &Path) -> Result<Fingerprint, DigestError> {
    DigestEngine::default().digest_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_sha256() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("empty");
        std::fs::write(&path, b"")?;

        let fp = digest(&path)?;
        assert_eq!(fp.as_str(), EMPTY_SHA256);
        Ok(())
    }

    #[test]
    fn test_known_sha256_vector() {
        let fp = DigestEngine::default().digest_bytes(b"abc");
        assert_eq!(
            fp.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_blake3_empty() {
        let engine = DigestEngine::new(HashAlgorithm::Blake3, DEFAULT_CHUNK_SIZE);
        assert_eq!(
            engine.digest_bytes(b"").as_str(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_chunk_size_does_not_change_output() -> anyhow::Result<()> {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let expected = DigestEngine::default().digest_bytes(&data);

        for chunk in [1, 7, 4096, 65_536, 1_000_000] {
            let engine = DigestEngine::new(HashAlgorithm::Sha256, chunk);
            assert_eq!(engine.digest_reader(Cursor::new(&data))?, expected);
        }
        Ok(())
    }

    #[test]
    fn test_single_byte_change() {
        let engine = DigestEngine::default();
        let a = engine.digest_bytes(b"hello world");
        let b = engine.digest_bytes(b"hello worle");
        assert_ne!(a, b);
    }

    #[test]
    fn test_output_is_lowercase_hex() -> anyhow::Result<()> {
        for algorithm in [HashAlgorithm::Sha256, HashAlgorithm::Blake3] {
            let fp = DigestEngine::new(algorithm, 16).digest_bytes(b"Some Content");
            assert_eq!(fp.as_str().len(), DIGEST_LEN * 2);
            Fingerprint::parse(fp.as_str())?;
        }
        Ok(())
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let dir = tempdir().unwrap();
        let err = digest(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, DigestError::Open { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_fingerprints() {
        assert!(Fingerprint::parse("abc").is_err());
        assert!(Fingerprint::parse(&EMPTY_SHA256.to_uppercase()).is_err());
        assert!(Fingerprint::parse(&"g".repeat(64)).is_err());
        assert!(Fingerprint::parse(EMPTY_SHA256).is_ok());
    }

    #[test]
    fn test_short_form() {
        assert_eq!(Fingerprint::from_stored(EMPTY_SHA256).short(), "e3b0c44298fc");
        assert_eq!(Fingerprint::from_stored("ab").short(), "ab");
        assert_eq!(Fingerprint::from_stored("ééééééééééééé").short(), "éééééééééééé");
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let engine = DigestEngine::new(HashAlgorithm::Sha256, 0);
        assert_eq!(engine.chunk_size(), 1);
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("blake3".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Blake3);
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }
}
