//! File-backed [`PersistedStore`].

use super::atomic_file::AtomicFile;
use crate::paths::SurakshPaths;
use std::path::{Path, PathBuf};
use suraksh_core::error::Result;
use suraksh_core::store::{PersistedStore, validate_key};

/// Stores each key as its own file under a root directory.
///
/// Every `set` is an atomic replace of that one file, so a crash can never
/// leave a half-written value; there is no atomicity across keys.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Opens the store at the default location (`~/.config/suraksh/store`).
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(SurakshPaths::store_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file(&self, key: &str) -> Result<AtomicFile> {
        validate_key(key)?;
        Ok(AtomicFile::new(self.root.join(key)))
    }
}

impl PersistedStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.file(key)?.read()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.file(key)?.write(value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.file(key)?.delete()
    }
}
