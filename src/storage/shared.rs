use super::{LoadReport, RecordStore, TrackedFile};
use crate::digest::Fingerprint;
use crate::error::StoreError;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe handle to a [`RecordStore`].
///
/// Lookups take a shared lock and run in parallel; `upsert` and `load` take
/// the exclusive lock. `save` holds the shared lock for the whole write, so no
/// mutation can land between the snapshot and the rename.
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<RwLock<RecordStore>>,
}

impl SharedStore {
    /// Wrap an existing store.
    #[must_use]
    pub fn new(store: RecordStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RecordStore> {
        // Every mutation is a single map operation, so a poisoned lock still
        // holds a consistent map.
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RecordStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`RecordStore::load`].
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Read` if the backing file cannot be read.
    pub fn load(&self) -> Result<LoadReport, StoreError> {
        self.write().load()
    }

    /// See [`RecordStore::save`].
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the backing file cannot be replaced.
    pub fn save(&self) -> Result<(), StoreError> {
        self.read().save()
    }

    /// See [`RecordStore::upsert`].
    pub fn upsert(&self, path: impl Into<String>, fingerprint: Fingerprint) {
        self.write().upsert(path, fingerprint);
    }

    /// Cloned fingerprint for `path`, if tracked.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<Fingerprint> {
        self.read().lookup(path).cloned()
    }

    /// See [`RecordStore::contains`].
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.read().contains(path)
    }

    /// Number of tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Point-in-time copy of every entry.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TrackedFile> {
        self.read()
            .iter()
            .map(|(path, fingerprint)| TrackedFile {
                path: path.to_string(),
                fingerprint: fingerprint.clone(),
            })
            .collect()
    }

    /// Unwrap the store if this is the last handle, otherwise clone it.
    #[must_use]
    pub fn into_inner(self) -> RecordStore {
        match Arc::try_unwrap(self.inner) {
            Ok(lock) => lock.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => {
                let guard = shared.read().unwrap_or_else(PoisonError::into_inner);
                guard.clone()
            }
        }
    }
}

impl From<RecordStore> for SharedStore {
    fn from(store: RecordStore) -> Self {
        Self::new(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_concurrent_upserts() {
        let shared = SharedStore::new(RecordStore::new("unused.txt"));
        let mut handles = Vec::new();

        for t in 0..8 {
            let store = shared.clone();
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    store.upsert(format!("t{t}/f{i}"), Fingerprint::from_stored(format!("{t}{i}")));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(shared.len(), 400);
        assert_eq!(
            shared.lookup("t3/f7"),
            Some(Fingerprint::from_stored("37"))
        );
    }

    #[test]
    fn test_save_while_writing_produces_loadable_file() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let location = dir.path().join("db.txt");
        let shared = SharedStore::new(RecordStore::new(&location));

        let writer = {
            let store = shared.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    store.upsert(format!("f{i}"), Fingerprint::from_stored("ab"));
                }
            })
        };
        for _ in 0..10 {
            shared.save()?;
        }
        writer.join().unwrap();
        shared.save()?;

        let reloaded = RecordStore::open(&location)?;
        assert_eq!(reloaded.len(), 200);
        Ok(())
    }

    #[test]
    fn test_into_inner_with_other_handles() {
        let shared = SharedStore::new(RecordStore::new("x.txt"));
        shared.upsert("a", Fingerprint::from_stored("1"));
        let other = shared.clone();

        let store = shared.into_inner();
        assert!(store.contains("a"));
        assert!(other.contains("a"));
    }
}
