//! Atomic single-file writes.
//!
//! Provides a thin layer for replacing a file's content all-or-nothing.

use std::fs::{self, File};
use std::io::{ErrorKind, Write as IoWrite};
use std::path::{Path, PathBuf};
use suraksh_core::error::{Result, SurakshError};
use uuid::Uuid;

/// A handle to a file whose content is replaced atomically.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Durability**: Explicit fsync before rename
///
/// There is no locking: concurrent writers to the same file each produce a
/// complete file and the last rename wins.
pub struct AtomicFile {
    path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file. Returns `None` if it does not exist.
    pub fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SurakshError::io(format!(
                "Failed to read '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Replaces the file content atomically.
    pub fn write(&self, content: &str) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to a uniquely named temporary file in the same directory so
        // that concurrent writers never share one.
        let tmp_path = self.temp_path()?;
        let result = (|| -> std::io::Result<()> {
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(content.as_bytes())?;
            tmp_file.sync_all()?;
            drop(tmp_file);
            fs::rename(&tmp_path, &self.path)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(SurakshError::io(format!(
                "Failed to write '{}': {}",
                self.path.display(),
                e
            )));
        }
        Ok(())
    }

    /// Deletes the file. A missing file is not an error.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| SurakshError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| SurakshError::io("Path has no file name"))?;

        let tmp_name = format!(
            ".{}.{}.tmp",
            file_name.to_string_lossy(),
            Uuid::new_v4().simple()
        );
        Ok(parent.join(tmp_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::new(temp_dir.path().join("nested").join("value"));

        assert_eq!(file.read().unwrap(), None);
        file.write("hello").unwrap();
        assert_eq!(file.read().unwrap().as_deref(), Some("hello"));

        file.write("replaced").unwrap();
        assert_eq!(file.read().unwrap().as_deref(), Some("replaced"));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::new(temp_dir.path().join("value"));
        file.write("data").unwrap();

        let names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["value".to_string()]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::new(temp_dir.path().join("value"));
        file.write("data").unwrap();

        file.delete().unwrap();
        file.delete().unwrap();
        assert_eq!(file.read().unwrap(), None);
    }
}
