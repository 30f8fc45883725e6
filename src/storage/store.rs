use super::TrackedFile;
use super::format::{FORMAT_MARKER, LineFormat, encode_record, parse_record};
use crate::digest::Fingerprint;
use crate::error::{RecordError, StoreError};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Outcome of a successful [`RecordStore::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records now held in memory
    pub loaded: usize,
    /// Malformed lines that were skipped
    pub skipped: usize,
    /// Whether the backing file existed at all
    pub existed: bool,
}

/// Persistent path to fingerprint mapping backed by a flat text file.
///
/// At most one fingerprint is held per path. Entries are kept sorted by path
/// so that saves are deterministic; the order carries no meaning.
#[derive(Debug, Clone)]
pub struct RecordStore {
    location: PathBuf,
    entries: BTreeMap<String, Fingerprint>,
}

impl RecordStore {
    /// Create an empty store bound to `location`. Nothing is read until [`load`](Self::load).
    #[must_use]
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Create a store and load it in one step.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn open(location: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut store = Self::new(location);
        store.load()?;
        Ok(store)
    }

    /// Backing file location.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Replace the in-memory entries with the contents of the backing file.
    ///
    /// A missing backing file yields an empty store. A file whose first line
    /// is [`FORMAT_MARKER`] has escaped paths; any other file is read as plain
    /// `<path>|<digest>` lines with paths taken verbatim. Malformed lines are
    /// skipped with a warning and the rest of the file is still loaded. On
    /// error the in-memory entries are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Read` if the file exists but cannot be read.
    pub fn load(&mut self) -> Result<LoadReport, StoreError> {
        let data = match fs::read(&self.location) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(store = %self.location.display(), "no record store yet, starting empty");
                self.entries.clear();
                return Ok(LoadReport::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.location.clone(),
                    source,
                });
            }
        };

        let mut entries = BTreeMap::new();
        let mut skipped = 0;
        let mut format = LineFormat::Verbatim;
        let mut first = true;

        for (idx, raw) in data.split(|&b| b == b'\n').enumerate() {
            if raw.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let line = std::str::from_utf8(raw).map_err(|_| RecordError::NotUtf8);
            if std::mem::take(&mut first)
                && line.as_ref().is_ok_and(|l| LineFormat::is_marker(l))
            {
                format = LineFormat::Escaped;
                continue;
            }
            match line.and_then(|l| parse_record(l, format)) {
                Ok(TrackedFile { path, fingerprint }) => {
                    entries.insert(path, fingerprint);
                }
                Err(reason) => {
                    skipped += 1;
                    warn!(
                        store = %self.location.display(),
                        line = idx + 1,
                        %reason,
                        "skipping malformed record"
                    );
                }
            }
        }

        self.entries = entries;
        let report = LoadReport {
            loaded: self.entries.len(),
            skipped,
            existed: true,
        };
        debug!(
            store = %self.location.display(),
            loaded = report.loaded,
            skipped = report.skipped,
            escaped = format == LineFormat::Escaped,
            "loaded record store"
        );
        Ok(report)
    }

    /// Atomically replace the backing file with the current entries.
    ///
    /// The records are written to a temporary file in the same directory,
    /// synced, and renamed over the backing file, so a failed save leaves the
    /// previous contents intact. The replacement keeps the permissions of the
    /// file it replaces. The directory must already exist.
    ///
    /// Paths are written verbatim unless one of them contains a line break,
    /// in which case the file starts with [`FORMAT_MARKER`] and every path is
    /// escaped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the temporary file cannot be created,
    /// written, or renamed into place.
    pub fn save(&self) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.location.clone(),
            source,
        };

        let dir = match self.location.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let format = LineFormat::for_paths(self.entries.keys().map(String::as_str));
        let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            if format == LineFormat::Escaped {
                writeln!(writer, "{FORMAT_MARKER}").map_err(write_err)?;
            }
            for (path, fingerprint) in &self.entries {
                writeln!(writer, "{}", encode_record(path, fingerprint, format))
                    .map_err(write_err)?;
            }
            writer.flush().map_err(write_err)?;
        }
        match fs::metadata(&self.location) {
            Ok(existing) => temp
                .as_file()
                .set_permissions(existing.permissions())
                .map_err(write_err)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(write_err(e)),
        }
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&self.location).map_err(|e| write_err(e.error))?;

        debug!(
            store = %self.location.display(),
            records = self.entries.len(),
            "saved record store"
        );
        Ok(())
    }

    /// Insert a new entry or overwrite the fingerprint recorded for `path`,
    /// returning the fingerprint it replaced.
    pub fn upsert(
        &mut self,
        path: impl Into<String>,
        fingerprint: Fingerprint,
    ) -> Option<Fingerprint> {
        self.entries.insert(path.into(), fingerprint)
    }

    /// Drop the record for `path`, returning its fingerprint.
    pub fn remove(&mut self, path: &str) -> Option<Fingerprint> {
        self.entries.remove(path)
    }

    /// Recorded fingerprint for `path`, if tracked.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Fingerprint> {
        self.entries.get(path)
    }

    /// Whether `path` has a recorded fingerprint.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(path, fingerprint)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fingerprint)> {
        self.entries.iter().map(|(p, f)| (p.as_str(), f))
    }

    /// Tracked paths in path order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::EMPTY_SHA256;
    use anyhow::Result;
    use tempfile::tempdir;

    fn fp(s: &str) -> Fingerprint {
        Fingerprint::from_stored(s)
    }

    #[test]
    fn test_load_missing_file_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let mut store = RecordStore::new(dir.path().join("db.txt"));
        store.upsert("stale", fp("00"));

        let report = store.load()?;
        assert!(!report.existed);
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("db.txt");

        let mut store = RecordStore::new(&location);
        store.upsert("a.txt", fp(EMPTY_SHA256));
        store.save()?;

        let reloaded = RecordStore::open(&location)?;
        assert!(reloaded.contains("a.txt"));
        assert_eq!(reloaded.lookup("a.txt").map(Fingerprint::as_str), Some(EMPTY_SHA256));
        Ok(())
    }

    #[test]
    fn test_save_overwrites_previous_content() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("db.txt");
        fs::write(&location, "old.txt|deadbeef\nother.txt|cafe\n")?;

        let mut store = RecordStore::new(&location);
        store.upsert("new.txt", fp("beef"));
        store.save()?;

        let content = fs::read_to_string(&location)?;
        assert_eq!(content, "new.txt|beef\n");
        Ok(())
    }

    #[test]
    fn test_load_replaces_memory_state() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("db.txt");
        fs::write(&location, "disk.txt|abcd\n")?;

        let mut store = RecordStore::new(&location);
        store.upsert("memory.txt", fp("1234"));
        store.load()?;

        assert!(!store.contains("memory.txt"));
        assert!(store.contains("disk.txt"));
        Ok(())
    }

    #[test]
    fn test_load_skips_malformed_lines() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("db.txt");
        fs::write(
            &location,
            format!("good.txt|{EMPTY_SHA256}\nno delimiter\n|nopath\nnodigest|\n\n"),
        )?;

        let mut store = RecordStore::new(&location);
        let report = store.load()?;
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 3);
        assert!(store.contains("good.txt"));
        Ok(())
    }

    #[test]
    fn test_load_skips_invalid_utf8_line() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("db.txt");
        let mut data = b"ok.txt|abc\n".to_vec();
        data.extend_from_slice(&[0xff, 0xfe, b'|', b'a', b'\n']);
        fs::write(&location, data)?;

        let store = RecordStore::open(&location)?;
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn test_duplicate_lines_last_wins() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("db.txt");
        fs::write(&location, "a.txt|first\na.txt|second\n")?;

        let store = RecordStore::open(&location)?;
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup("a.txt"), Some(&fp("second")));
        Ok(())
    }

    #[test]
    fn test_save_into_missing_directory_fails() -> Result<()> {
        let dir = tempdir()?;
        let store = RecordStore::new(dir.path().join("missing").join("db.txt"));
        assert!(matches!(store.save(), Err(StoreError::Write { .. })));
        Ok(())
    }

    #[test]
    fn test_failed_load_keeps_memory_state() -> Result<()> {
        let dir = tempdir()?;
        // A directory cannot be read as a file.
        let mut store = RecordStore::new(dir.path());
        store.upsert("kept.txt", fp("aa"));

        assert!(store.load().is_err());
        assert!(store.contains("kept.txt"));
        Ok(())
    }

    #[test]
    fn test_legacy_backslash_paths_load_verbatim() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("db.txt");
        fs::write(
            &location,
            format!(
                "C:\\data\\notes.txt|{EMPTY_SHA256}\nC:\\Users\\x.txt|abcd\nshare\\new\\notes.txt|abc\n"
            ),
        )?;

        let mut store = RecordStore::new(&location);
        let report = store.load()?;
        assert_eq!(report.skipped, 0);
        assert_eq!(
            store.paths(),
            vec![
                "C:\\Users\\x.txt".to_string(),
                "C:\\data\\notes.txt".to_string(),
                "share\\new\\notes.txt".to_string(),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_backslash_paths_survive_resave_in_plain_format() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("db.txt");
        fs::write(&location, "C:\\data\\notes.txt|abcd\n")?;

        let mut store = RecordStore::open(&location)?;
        store.upsert("share\\new.txt", fp("beef"));
        store.save()?;

        let content = fs::read_to_string(&location)?;
        assert_eq!(content, "C:\\data\\notes.txt|abcd\nshare\\new.txt|beef\n");
        assert_eq!(RecordStore::open(&location)?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_line_break_in_path_switches_to_escaped_format() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("db.txt");

        let mut store = RecordStore::new(&location);
        store.upsert("C:\\data\\a.txt", fp("aa"));
        store.upsert("two\nlines", fp("bb"));
        store.save()?;

        let content = fs::read_to_string(&location)?;
        assert_eq!(
            content,
            format!("{FORMAT_MARKER}\nC:\\\\data\\\\a.txt|aa\ntwo\\nlines|bb\n")
        );

        let reloaded = RecordStore::open(&location)?;
        assert_eq!(reloaded.lookup("C:\\data\\a.txt"), Some(&fp("aa")));
        assert_eq!(reloaded.lookup("two\nlines"), Some(&fp("bb")));
        assert_eq!(reloaded.len(), 2);
        Ok(())
    }

    #[test]
    fn test_marker_only_counts_as_first_line() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("db.txt");
        fs::write(&location, format!("a\\b|aa\n{FORMAT_MARKER}\n"))?;

        let mut store = RecordStore::new(&location);
        let report = store.load()?;
        assert!(store.contains("a\\b"));
        assert_eq!(report.skipped, 1);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_save_preserves_permissions() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let location = dir.path().join("db.txt");
        fs::write(&location, "a.txt|aa\n")?;
        fs::set_permissions(&location, fs::Permissions::from_mode(0o644))?;

        let mut store = RecordStore::open(&location)?;
        store.upsert("b.txt", fp("bb"));
        store.save()?;

        let mode = fs::metadata(&location)?.permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
        Ok(())
    }

    #[test]
    fn test_upsert_returns_replaced_value_and_remove() {
        let mut store = RecordStore::new("db.txt");
        assert_eq!(store.upsert("a", fp("1")), None);
        assert_eq!(store.upsert("a", fp("2")), Some(fp("1")));
        assert_eq!(store.remove("a"), Some(fp("2")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut once = RecordStore::new("db.txt");
        once.upsert("a", fp("1"));

        let mut twice = RecordStore::new("db.txt");
        twice.upsert("a", fp("1"));
        twice.upsert("a", fp("1"));

        assert_eq!(once.iter().collect::<Vec<_>>(), twice.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_lookup_absent() {
        let store = RecordStore::new("db.txt");
        assert!(store.lookup("nothing").is_none());
        assert!(!store.contains("nothing"));
    }
}
