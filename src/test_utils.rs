pub mod fixtures {
    use crate::FixityContext;
    use crate::config::Config;
    use crate::storage::RecordStore;
    use anyhow::Result;
    use std::fs;
    use tempfile::TempDir;

    pub struct TestWorkspace {
        pub temp_dir: TempDir,
        pub context: FixityContext,
    }

    impl TestWorkspace {
        pub fn new() -> Result<Self> {
            Self::with_store_path("integrity_db.txt")
        }

        /// Workspace whose store lives at `relative` under the temp dir.
        pub fn with_store_path(relative: &str) -> Result<Self> {
            let temp_dir = tempfile::tempdir()?;
            let store_path = temp_dir.path().join(relative);
            let config_path = temp_dir.path().join("config.toml");

            let mut config = Config::default();
            config.core.store_path.clone_from(&store_path);
            config.save(&config_path)?;

            let context = FixityContext::new_explicit(store_path, config_path)?;
            Ok(Self { temp_dir, context })
        }

        /// Write a file and return its path as a store key.
        pub fn create_file(&self, name: &str, content: &str) -> Result<String> {
            let path = self.temp_dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
            Ok(path.to_string_lossy().into_owned())
        }

        pub fn load_store(&self) -> Result<RecordStore> {
            Ok(RecordStore::open(&self.context.store_path)?)
        }
    }
}
