//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the client configuration
//! from the configuration file (~/.config/suraksh/config.toml).

use crate::dto::{CLIENT_CONFIG_VERSION, ClientConfigDTO, create_client_config_migrator};
use crate::paths::SurakshPaths;
use crate::storage::AtomicFile;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use suraksh_core::config::ClientConfig;
use suraksh_core::error::{Result, SurakshError};

/// Configuration service that loads and caches the client configuration.
///
/// A missing file yields [`ClientConfig::default`]. Files written before the
/// `version` field existed are read as V1.0.0.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses the default config location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(SurakshPaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the client configuration, loading from file if not cached.
    ///
    /// An unreadable file is logged and replaced by defaults rather than
    /// blocking startup.
    pub fn get_config(&self) -> ClientConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = match self.load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "[ConfigService] Ignoring unreadable config '{}': {}",
                    self.path.display(),
                    e
                );
                ClientConfig::default()
            }
        };

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(loaded.clone());
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    /// Reads and migrates the config file without touching the cache.
    pub fn load(&self) -> Result<ClientConfig> {
        let Some(content) = AtomicFile::new(self.path.clone()).read()? else {
            tracing::debug!(
                "[ConfigService] No config at '{}', using defaults",
                self.path.display()
            );
            return Ok(ClientConfig::default());
        };

        let mut toml_value: toml::Value = toml::from_str(&content)?;
        let table = toml_value.as_table_mut().ok_or_else(|| {
            SurakshError::config(format!(
                "Config '{}' is not a TOML table",
                self.path.display()
            ))
        })?;
        if !table.contains_key("version") {
            table.insert("version".to_string(), toml::Value::from("1.0.0"));
        }

        let migrator = create_client_config_migrator();
        let config: ClientConfig = migrator.load_flat_from("client_config", toml_value)?;
        Ok(config)
    }

    /// Writes `config` as the latest schema version and refreshes the cache.
    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        let dto = ClientConfigDTO::from(config);
        let mut toml_value = toml::Value::try_from(&dto).map_err(|e| {
            SurakshError::Serialization {
                format: "TOML".to_string(),
                message: e.to_string(),
            }
        })?;
        if let Some(table) = toml_value.as_table_mut() {
            table.insert(
                "version".to_string(),
                toml::Value::from(CLIENT_CONFIG_VERSION),
            );
        }
        let toml_str =
            toml::to_string_pretty(&toml_value).map_err(|e| SurakshError::Serialization {
                format: "TOML".to_string(),
                message: e.to_string(),
            })?;

        AtomicFile::new(self.path.clone()).write(&toml_str)?;

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));
        assert_eq!(service.get_config(), ClientConfig::default());
    }

    #[test]
    fn test_unversioned_file_is_read_as_v1_0() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "api_base_url = \"http://10.0.0.5:8000/api/v1\"\n").unwrap();

        let config = ConfigService::new(&path).load().unwrap();
        assert_eq!(config.api_base_url, "http://10.0.0.5:8000/api/v1");
        assert_eq!(
            config.notification_poll_interval,
            suraksh_core::config::NOTIFICATION_POLL_INTERVAL
        );
    }

    #[test]
    fn test_save_then_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(&path);

        let mut config = ClientConfig::default().with_api_base_url("http://intel:8000/api/v1/");
        config.hydration_delay = Duration::from_millis(20);
        service.save(&config).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("version = \"1.1.0\""));

        let reloaded = ConfigService::new(&path).get_config();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_garbage_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "not = [valid").unwrap();

        let service = ConfigService::new(&path);
        assert!(service.load().is_err());
        assert_eq!(service.get_config(), ClientConfig::default());
    }

    #[test]
    fn test_invalidate_cache_rereads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(&path);
        assert_eq!(service.get_config(), ClientConfig::default());

        fs::write(&path, "version = \"1.1.0\"\nhydration_delay_ms = 5\n").unwrap();
        assert_eq!(service.get_config(), ClientConfig::default());

        service.invalidate_cache();
        assert_eq!(service.get_config().hydration_delay, Duration::from_millis(5));
    }
}
