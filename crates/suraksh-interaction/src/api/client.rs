//! Typed client for the backend REST API.

use crate::transport::{ApiRequest, RequestBody, TransportClient};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use suraksh_core::backend::{
    AccessToken, CLEARANCE_LEVELS, CurrentUser, DeepSearchResult, GraphData, GraphExport,
    HealthStatus, IngestReport, IntelligenceBackend, MAX_GRAPH_DEPTH, MAX_GRAPH_LIMIT,
    Registration, SearchResult, TextIngest, UploadedFile, VaultListing, is_clearance_level,
};
use suraksh_core::error::{Result, SurakshError};

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct IngestFileBody<'a> {
    file_id: &'a str,
    extract_graph: bool,
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    top_k: u32,
}

/// [`IntelligenceBackend`] over HTTP.
#[derive(Clone)]
pub struct SurakshApi {
    transport: Arc<TransportClient>,
}

impl SurakshApi {
    pub fn new(transport: Arc<TransportClient>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &TransportClient {
        &self.transport
    }

    /// Downloads the raw content of a vault document.
    pub async fn download_file(&self, file_id: &str) -> Result<Vec<u8>> {
        let path = format!("vault/files/{}", encode_segment(file_id)?);
        let response = self.transport.send(ApiRequest::get(path)).await?;
        Ok(response.bytes().to_vec())
    }
}

#[async_trait]
impl IntelligenceBackend for SurakshApi {
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(SurakshError::validation("Username and password are required"));
        }
        let request = ApiRequest::post("auth/login").json(&LoginBody { username, password })?;
        self.transport.send_json(request).await
    }

    async fn register(&self, registration: &Registration) -> Result<CurrentUser> {
        if registration.username.trim().is_empty() || registration.password.is_empty() {
            return Err(SurakshError::validation("Username and password are required"));
        }
        if !registration.email.contains('@') {
            return Err(SurakshError::validation(format!(
                "Invalid email address '{}'",
                registration.email
            )));
        }
        check_clearance(&registration.clearance_level)?;
        let request = ApiRequest::post("auth/register").json(registration)?;
        self.transport.send_json(request).await
    }

    async fn current_user(&self) -> Result<CurrentUser> {
        self.transport.send_json(ApiRequest::get("auth/me")).await
    }

    async fn list_files(&self) -> Result<VaultListing> {
        self.transport.send_json(ApiRequest::get("vault/files")).await
    }

    async fn upload_file(&self, file_name: &str, content: Vec<u8>) -> Result<UploadedFile> {
        if file_name.trim().is_empty() {
            return Err(SurakshError::validation("File name is required"));
        }
        let request =
            ApiRequest::post("vault/upload").body(RequestBody::file("file", file_name, content));
        self.transport.send_json(request).await
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        let path = format!("vault/files/{}", encode_segment(file_id)?);
        self.transport.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    async fn ingest_file(&self, file_id: &str, extract_graph: bool) -> Result<IngestReport> {
        let request = ApiRequest::post("ingest/file").json(&IngestFileBody {
            file_id,
            extract_graph,
        })?;
        self.transport.send_json(request).await
    }

    async fn ingest_text(&self, request: &TextIngest) -> Result<IngestReport> {
        if request.text.trim().is_empty() {
            return Err(SurakshError::validation("Text to ingest must not be empty"));
        }
        check_clearance(&request.clearance_level)?;
        let request = ApiRequest::post("ingest/").json(request)?;
        self.transport.send_json(request).await
    }

    async fn entity_graph(&self, entity_name: &str, depth: u32) -> Result<GraphData> {
        if entity_name.trim().is_empty() {
            return Err(SurakshError::validation("Entity name is required"));
        }
        if !(1..=MAX_GRAPH_DEPTH).contains(&depth) {
            return Err(SurakshError::validation(format!(
                "Graph depth must be between 1 and {}",
                MAX_GRAPH_DEPTH
            )));
        }
        let request = ApiRequest::get("search/graph")
            .query("entity_name", entity_name)
            .query("depth", depth);
        self.transport.send_json(request).await
    }

    async fn full_graph(&self, limit: u32) -> Result<GraphData> {
        if !(1..=MAX_GRAPH_LIMIT).contains(&limit) {
            return Err(SurakshError::validation(format!(
                "Graph limit must be between 1 and {}",
                MAX_GRAPH_LIMIT
            )));
        }
        let request = ApiRequest::get("search/graph/all").query("limit", limit);
        self.transport.send_json(request).await
    }

    async fn export_graph(&self, export: &GraphExport) -> Result<GraphData> {
        if export.limit == 0 {
            return Err(SurakshError::validation("Export limit must be at least 1"));
        }
        let mut request = ApiRequest::get("ingest/export")
            .query("limit", export.limit)
            .query("include_isolated", export.include_isolated);
        if let Some(document_id) = export.document_id.as_deref() {
            request = request.query("document_id", document_id);
        }
        self.transport.send_json(request).await
    }

    async fn search(&self, query: &str, top_k: u32) -> Result<SearchResult> {
        let request = ApiRequest::post("search/").json(&query_body(query, top_k)?)?;
        self.transport.send_json(request).await
    }

    async fn deep_search(&self, query: &str, top_k: u32) -> Result<DeepSearchResult> {
        let request = ApiRequest::post("deepsearch/").json(&query_body(query, top_k)?)?;
        self.transport.send_json(request).await
    }

    async fn health(&self) -> Result<HealthStatus> {
        let request = ApiRequest::get("").timeout(self.transport.health_timeout());
        self.transport.send_json(request).await
    }
}

fn query_body(query: &str, top_k: u32) -> Result<QueryBody<'_>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SurakshError::validation("Query must not be empty"));
    }
    Ok(QueryBody {
        query,
        top_k: top_k.max(1),
    })
}

fn check_clearance(level: &str) -> Result<()> {
    if is_clearance_level(level) {
        Ok(())
    } else {
        Err(SurakshError::validation(format!(
            "Invalid clearance level '{}'. Must be one of {}",
            level,
            CLEARANCE_LEVELS.join(", ")
        )))
    }
}

/// Vault ids are opaque; refuse anything that would change the path.
fn encode_segment(id: &str) -> Result<&str> {
    if id.is_empty() || id.contains(['/', '?', '#', '%']) || id == "." || id == ".." {
        return Err(SurakshError::validation(format!("Invalid file id '{}'", id)));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_body_trims_and_rejects_empty() {
        assert!(query_body("   ", 5).unwrap_err().is_validation());
        let body = query_body("  who met Ravi?  ", 0).unwrap();
        assert_eq!(body.query, "who met Ravi?");
        assert_eq!(body.top_k, 1);
    }

    #[test]
    fn test_file_id_cannot_escape_path() {
        assert!(encode_segment("../auth/me").is_err());
        assert!(encode_segment("").is_err());
        assert_eq!(encode_segment("3f2a-91").unwrap(), "3f2a-91");
    }
}
