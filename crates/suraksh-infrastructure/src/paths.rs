//! Unified path management for suraksh client files.
//!
//! Paths are resolved via AppPaths from the version-migrate crate, which
//! picks the platform-appropriate configuration directory.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/suraksh/           # Config directory (AppPaths default)
//! ├── config.toml              # Client configuration (versioned)
//! └── store/                   # PersistedStore, one file per key
//!     ├── session-record
//!     ├── legacy-token
//!     └── notification-log
//! ```

use std::path::PathBuf;
use suraksh_core::error::{Result, SurakshError};
use version_migrate::AppPaths;

pub struct SurakshPaths;

impl SurakshPaths {
    fn app_paths() -> AppPaths {
        AppPaths::new("suraksh")
    }

    /// Returns the suraksh configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        Self::app_paths()
            .config_dir()
            .map_err(|_| SurakshError::config("Cannot find home directory"))
    }

    /// Returns the path to the client configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory backing the persisted key/value store.
    pub fn store_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("store"))
    }
}
