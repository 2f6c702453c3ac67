//! ClientConfig DTOs and migrations

use serde::{Deserialize, Serialize};
use std::time::Duration;
use suraksh_core::config::{
    ClientConfig, DEFAULT_API_BASE_URL, DEFAULT_HEALTH_TIMEOUT, DEFAULT_HYDRATION_DELAY,
    DEFAULT_REQUEST_TIMEOUT, NOTIFICATION_POLL_INTERVAL,
};
use version_migrate::{IntoDomain, MigratesTo, Versioned};

/// Version string of [`ClientConfigDTO`], written into saved files.
pub const CLIENT_CONFIG_VERSION: &str = "1.1.0";

/// Client configuration V1.0.0 (backend location and timeouts).
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ClientConfigV1_0_0 {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,
}

/// Client configuration V1.1.0 (added notification polling and hydration delay).
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
pub struct ClientConfigV1_1_0 {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub notification_poll_interval_secs: u64,
    #[serde(default = "default_hydration_delay_ms")]
    pub hydration_delay_ms: u64,
}

/// Type alias for the latest ClientConfig version.
pub type ClientConfigDTO = ClientConfigV1_1_0;

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_health_timeout_secs() -> u64 {
    DEFAULT_HEALTH_TIMEOUT.as_secs()
}

fn default_poll_interval_secs() -> u64 {
    NOTIFICATION_POLL_INTERVAL.as_secs()
}

fn default_hydration_delay_ms() -> u64 {
    DEFAULT_HYDRATION_DELAY.as_millis() as u64
}

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from ClientConfigV1_0_0 to ClientConfigV1_1_0.
/// Adds polling interval and hydration delay with their defaults.
impl MigratesTo<ClientConfigV1_1_0> for ClientConfigV1_0_0 {
    fn migrate(self) -> ClientConfigV1_1_0 {
        ClientConfigV1_1_0 {
            api_base_url: self.api_base_url,
            request_timeout_secs: self.request_timeout_secs,
            health_timeout_secs: self.health_timeout_secs,
            notification_poll_interval_secs: default_poll_interval_secs(),
            hydration_delay_ms: default_hydration_delay_ms(),
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<ClientConfig> for ClientConfigV1_1_0 {
    fn into_domain(self) -> ClientConfig {
        ClientConfig {
            api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
            // A zero deadline would fail every request immediately.
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            health_timeout: Duration::from_secs(self.health_timeout_secs.max(1)),
            notification_poll_interval: Duration::from_secs(
                self.notification_poll_interval_secs.max(1),
            ),
            hydration_delay: Duration::from_millis(self.hydration_delay_ms),
        }
    }
}

impl From<&ClientConfig> for ClientConfigV1_1_0 {
    fn from(config: &ClientConfig) -> Self {
        ClientConfigV1_1_0 {
            api_base_url: config.api_base_url.clone(),
            request_timeout_secs: config.request_timeout.as_secs(),
            health_timeout_secs: config.health_timeout.as_secs(),
            notification_poll_interval_secs: config.notification_poll_interval.as_secs(),
            hydration_delay_ms: config.hydration_delay.as_millis() as u64,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for ClientConfig.
///
/// # Migration Path
///
/// - V1.0.0 → V1.1.0: Adds `notification_poll_interval_secs` and `hydration_delay_ms`
/// - V1.1.0 → ClientConfig: Converts DTO to domain model
///
/// # Example
///
/// ```ignore
/// let migrator = create_client_config_migrator();
/// let config: ClientConfig = migrator.load_flat_from("client_config", toml_value)?;
/// ```
pub fn create_client_config_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let config_path = version_migrate::Migrator::define("client_config")
        .from::<ClientConfigV1_0_0>()
        .step::<ClientConfigV1_1_0>()
        .into::<ClientConfig>();

    migrator
        .register(config_path)
        .expect("Failed to register client_config migration path");

    migrator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_0_migrates_with_defaults() {
        let migrator = create_client_config_migrator();
        let toml_str = r#"
version = "1.0.0"
api_base_url = "http://intel.local:9000/api/v1/"
request_timeout_secs = 600
health_timeout_secs = 3
"#;
        let toml_value: toml::Value = toml::from_str(toml_str).unwrap();

        let config: ClientConfig = migrator
            .load_flat_from("client_config", toml_value)
            .unwrap();

        assert_eq!(config.api_base_url, "http://intel.local:9000/api/v1");
        assert_eq!(config.request_timeout, Duration::from_secs(600));
        assert_eq!(config.health_timeout, Duration::from_secs(3));
        assert_eq!(config.notification_poll_interval, NOTIFICATION_POLL_INTERVAL);
        assert_eq!(config.hydration_delay, DEFAULT_HYDRATION_DELAY);
    }

    #[test]
    fn test_v1_1_loads_directly() {
        let migrator = create_client_config_migrator();
        let toml_str = r#"
version = "1.1.0"
notification_poll_interval_secs = 2
hydration_delay_ms = 250
"#;
        let toml_value: toml::Value = toml::from_str(toml_str).unwrap();

        let config: ClientConfig = migrator
            .load_flat_from("client_config", toml_value)
            .unwrap();

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.notification_poll_interval, Duration::from_secs(2));
        assert_eq!(config.hydration_delay, Duration::from_millis(250));
    }
}
