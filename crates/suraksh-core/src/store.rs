//! Durable key/value storage shared by the session and notification layers.
//!
//! Every record lives under its own key and each `set`/`remove` is atomic on
//! its own. There is no multi-key transaction: callers that keep two keys in
//! step (the session record and the legacy mirror) must tolerate a crash
//! between the two writes.

use crate::error::{Result, SurakshError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Logical key names. Crate-private so that only the owning components
/// (`SessionManager`, `NotificationStore`) can address them.
pub(crate) mod keys {
    /// Structured session record: `{ token, user, schemaVersion }`.
    pub const SESSION_RECORD: &str = "session-record";
    /// Flat credential string kept for older readers.
    pub const LEGACY_TOKEN: &str = "legacy-token";
    /// JSON array of notification entries.
    pub const NOTIFICATION_LOG: &str = "notification-log";
}

/// A durable, restart-surviving key/value store.
pub trait PersistedStore: Send + Sync {
    /// Reads the raw value stored under `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value under `key` atomically.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Rejects keys that could escape a storage directory or collide on
/// case-insensitive file systems.
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SurakshError::validation(format!(
            "invalid store key '{key}': use lowercase letters, digits, '-' or '_'"
        )))
    }
}

/// Process-local store, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| SurakshError::internal(format!("store lock poisoned: {e}")))
    }
}

impl PersistedStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip_and_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("legacy-token").unwrap(), None);

        store.set("legacy-token", "abc").unwrap();
        assert_eq!(store.get("legacy-token").unwrap().as_deref(), Some("abc"));

        store.remove("legacy-token").unwrap();
        store.remove("legacy-token").unwrap();
        assert_eq!(store.get("legacy-token").unwrap(), None);
    }

    #[test]
    fn test_key_validation() {
        assert!(validate_key("session-record").is_ok());
        assert!(validate_key("notification_log2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("Session").is_err());
    }
}
