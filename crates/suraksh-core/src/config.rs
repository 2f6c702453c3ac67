//! Client configuration domain model.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default backend API root.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default per-request deadline. Generous so that large vault uploads and
/// ingestion runs are not cut off.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Deadline for liveness probes.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// How often notification consumers re-read the persisted log. There is no
/// push channel between the writer and unrelated readers, so this bounds how
/// stale a reader can be.
pub const NOTIFICATION_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Delay between the route guard entering `Hydrating` and its decision.
pub const DEFAULT_HYDRATION_DELAY: Duration = Duration::from_millis(100);

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub health_timeout: Duration,
    pub notification_poll_interval: Duration,
    pub hydration_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            notification_poll_interval: NOTIFICATION_POLL_INTERVAL,
            hydration_delay: DEFAULT_HYDRATION_DELAY,
        }
    }
}

impl ClientConfig {
    /// Overrides the API root, trimming any trailing slash.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}
