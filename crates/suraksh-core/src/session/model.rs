//! Session domain model and its persisted form.

use serde::{Deserialize, Serialize};

/// Schema version written into every persisted session record.
pub const SESSION_SCHEMA_VERSION: u32 = 1;

/// Identity of the logged-in analyst, as reported by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    /// Clearance tier ("L1", "L2", "L3").
    pub clearance_level: String,
}

/// The persisted session record.
///
/// Stored as camelCase JSON under the session key. A record whose
/// `schema_version` differs from [`SESSION_SCHEMA_VERSION`], or that carries a
/// profile without a credential, is treated as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    pub schema_version: u32,
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            schema_version: SESSION_SCHEMA_VERSION,
        }
    }
}

impl SessionRecord {
    /// Parses and validates a persisted record.
    ///
    /// Returns a description of the problem instead of an error type: every
    /// failure here means "no usable record" to the caller.
    pub fn parse(raw: &str) -> std::result::Result<Self, String> {
        let record: SessionRecord =
            serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))?;
        if record.schema_version != SESSION_SCHEMA_VERSION {
            return Err(format!(
                "schema version {} (expected {})",
                record.schema_version, SESSION_SCHEMA_VERSION
            ));
        }
        if record.user.is_some() && record.token.is_none() {
            return Err("profile present without a credential".to_string());
        }
        Ok(record)
    }
}

/// Read-only view of the in-memory session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_format_is_camel_case() {
        let record = SessionRecord {
            token: Some("abc".to_string()),
            user: Some(UserProfile {
                username: "analyst".to_string(),
                email: "analyst@example.org".to_string(),
                clearance_level: "L2".to_string(),
            }),
            schema_version: SESSION_SCHEMA_VERSION,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["schemaVersion"], 1);
        assert_eq!(json["user"]["clearanceLevel"], "L2");
    }

    #[test]
    fn test_parse_rejects_bad_records() {
        assert!(SessionRecord::parse("{not json").is_err());
        assert!(SessionRecord::parse(r#"{"token":"a","schemaVersion":7}"#).is_err());
        assert!(
            SessionRecord::parse(
                r#"{"token":null,"user":{"username":"u","email":"e","clearanceLevel":"L1"},"schemaVersion":1}"#
            )
            .is_err()
        );
        assert!(SessionRecord::parse(r#"{"schemaVersion":1}"#).is_ok());
    }
}
