//! Wire models of the intelligence backend API.

use crate::session::UserProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of results requested from search endpoints when not specified.
pub const DEFAULT_TOP_K: u32 = 5;

/// Traversal depth for entity neighbourhood graphs.
pub const DEFAULT_GRAPH_DEPTH: u32 = 2;
pub const MAX_GRAPH_DEPTH: u32 = 5;

/// Node cap for the full knowledge graph.
pub const DEFAULT_GRAPH_LIMIT: u32 = 200;
pub const MAX_GRAPH_LIMIT: u32 = 1000;

/// Node cap for graph exports.
pub const DEFAULT_EXPORT_LIMIT: u32 = 1000;

/// Clearance levels the backend accepts, lowest first.
pub const CLEARANCE_LEVELS: [&str; 3] = ["L1", "L2", "L3"];

/// Clearance given to new accounts unless another is requested.
pub const DEFAULT_ACCOUNT_CLEARANCE: &str = "L1";

/// Clearance attached to ingested text unless another is requested.
pub const DEFAULT_TEXT_CLEARANCE: &str = "L3";

pub fn is_clearance_level(level: &str) -> bool {
    CLEARANCE_LEVELS.contains(&level)
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Response of `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    pub email: String,
    pub clearance_level: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl CurrentUser {
    /// The part of the account the session keeps.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            email: self.email.clone(),
            clearance_level: self.clearance_level.clone(),
        }
    }
}

/// Body of `POST /auth/register`. The response is a [`CurrentUser`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub clearance_level: String,
}

impl Registration {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            clearance_level: DEFAULT_ACCOUNT_CLEARANCE.to_string(),
        }
    }

    pub fn with_clearance(mut self, level: impl Into<String>) -> Self {
        self.clearance_level = level.into();
        self
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("clearance_level", &self.clearance_level)
            .finish()
    }
}

/// Body of `POST /ingest/`: free text pushed straight into extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextIngest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    pub clearance_level: String,
    pub extract_graph: bool,
}

impl TextIngest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_id: None,
            source_name: None,
            clearance_level: DEFAULT_TEXT_CLEARANCE.to_string(),
            extract_graph: true,
        }
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = Some(source_name.into());
        self
    }

    pub fn with_clearance(mut self, level: impl Into<String>) -> Self {
        self.clearance_level = level.into();
        self
    }

    pub fn without_graph(mut self) -> Self {
        self.extract_graph = false;
        self
    }

    /// Name shown to the user for this run.
    pub fn display_name(&self) -> &str {
        self.source_name
            .as_deref()
            .or(self.source_id.as_deref())
            .unwrap_or("Text snippet")
    }
}

/// Filters of `GET /ingest/export`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphExport {
    /// Restrict the export to entities from one document.
    pub document_id: Option<String>,
    pub limit: u32,
    /// Also export entities without any relation.
    pub include_isolated: bool,
}

impl Default for GraphExport {
    fn default() -> Self {
        Self {
            document_id: None,
            limit: DEFAULT_EXPORT_LIMIT,
            include_isolated: false,
        }
    }
}

/// A document stored in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultFile {
    pub id: String,
    pub filename: String,
    pub size: u64,
    pub clearance_level: String,
    pub uploaded_at: String,
    pub uploaded_by: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Response of `GET /vault/files`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VaultListing {
    #[serde(default)]
    pub files: Vec<VaultFile>,
    #[serde(default)]
    pub total: u64,
}

/// Response of `POST /vault/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub file_id: String,
    pub filename: String,
    pub size: u64,
    pub uploaded_at: String,
}

/// Response of `POST /ingest/file` and `POST /ingest/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    #[serde(default)]
    pub source_id: String,
    #[serde(default)]
    pub source_name: Option<String>,
    pub entities_extracted: u64,
    pub relations_extracted: u64,
    #[serde(default)]
    pub chunks_created: u64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// Display label: the entity name when the backend has one.
    pub label: String,
    /// Entity type, e.g. `Person`. Absent from neighbourhood queries.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub properties: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(alias = "relationship")]
    pub relation: String,
    /// Only set by the export endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub properties: serde_json::Value,
}

/// Knowledge graph slice returned by the graph endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl GraphData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphPath {
    #[serde(default)]
    pub path_found: bool,
    #[serde(default)]
    pub path_length: u32,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `POST /search/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub query: String,
    pub answer: String,
    #[serde(default)]
    pub graph_path: GraphPath,
    #[serde(default)]
    pub entities_found: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub filename: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub filename: String,
    #[serde(default)]
    pub pages: Vec<u32>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Response of `POST /deepsearch/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepSearchResult {
    #[serde(default)]
    pub query: String,
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub source_summary: Vec<SourceSummary>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Liveness answer of the API root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_report_from_backend_json() {
        let json = r#"{
            "source_id": "src-1",
            "source_name": "fir_042.pdf",
            "entities_extracted": 12,
            "relations_extracted": 7,
            "chunks_created": 30,
            "status": "completed"
        }"#;
        let report: IngestReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.entities_extracted, 12);
        assert_eq!(report.source_name.as_deref(), Some("fir_042.pdf"));
    }

    #[test]
    fn test_graph_edge_properties_optional() {
        let json = r#"{"nodes":[{"id":"a","label":"Person","properties":{"name":"A"}}],
                       "edges":[{"source":"a","target":"b","relation":"KNOWS"}]}"#;
        let graph: GraphData = serde_json::from_str(json).unwrap();
        assert_eq!(graph.nodes[0].properties["name"], "A");
        assert!(graph.edges[0].properties.is_null());
    }

    #[test]
    fn test_graph_node_keeps_entity_type() {
        let json = r#"{"nodes":[
                           {"id":"n1","label":"Ravi Kumar","type":"Person","properties":{}},
                           {"id":"n2","label":"Person","properties":{}}],
                       "edges":[]}"#;
        let graph: GraphData = serde_json::from_str(json).unwrap();
        assert_eq!(graph.nodes[0].kind.as_deref(), Some("Person"));
        assert_eq!(graph.nodes[0].label, "Ravi Kumar");
        assert_eq!(graph.nodes[1].kind, None);

        let back = serde_json::to_value(&graph.nodes[0]).unwrap();
        assert_eq!(back["type"], "Person");
    }

    #[test]
    fn test_export_edge_shape() {
        let json = r#"{"source":"a","target":"b","relationship":"funded_by","weight":0.5,"properties":{}}"#;
        let edge: GraphEdge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.relation, "funded_by");
        assert_eq!(edge.weight, Some(0.5));
    }

    #[test]
    fn test_text_ingest_wire_shape() {
        let body = serde_json::to_value(TextIngest::new("Ravi met Arjun").with_source_name("tip")).unwrap();
        assert_eq!(body["text"], "Ravi met Arjun");
        assert_eq!(body["source_name"], "tip");
        assert_eq!(body["clearance_level"], DEFAULT_TEXT_CLEARANCE);
        assert_eq!(body["extract_graph"], true);
        assert!(body.get("source_id").is_none());
    }

    #[test]
    fn test_registration_debug_hides_password() {
        let registration = Registration::new("analyst", "a@example.org", "hunter2");
        let printed = format!("{:?}", registration);
        assert!(!printed.contains("hunter2"));
        assert_eq!(registration.clearance_level, "L1");
        assert!(is_clearance_level("L3"));
        assert!(!is_clearance_level("L4"));
    }

    #[test]
    fn test_current_user_profile_drops_activity_flag() {
        let user = CurrentUser {
            username: "analyst".into(),
            email: "analyst@example.org".into(),
            clearance_level: "L2".into(),
            is_active: true,
        };
        assert_eq!(user.profile().clearance_level, "L2");
    }
}
