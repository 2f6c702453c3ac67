#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use suraksh_core::SurakshError;
use suraksh_core::backend::{
    AccessToken, CurrentUser, DeepSearchResult, GraphData, GraphExport, GraphNode, HealthStatus,
    IngestReport, IntelligenceBackend, Registration, SearchResult, TextIngest, UploadedFile,
    VaultListing,
};
use suraksh_core::error::Result;

/// In-process backend double. The graph grows by one node per ingestion.
#[derive(Default)]
pub struct FakeBackend {
    pub graph_loads: AtomicUsize,
    pub ingested: Mutex<Vec<String>>,
    pub fail_me: Mutex<Option<SurakshError>>,
    pub fail_ingest: Mutex<Option<SurakshError>>,
}

impl FakeBackend {
    pub fn graph_loads(&self) -> usize {
        self.graph_loads.load(Ordering::SeqCst)
    }

    fn node(id: usize) -> GraphNode {
        GraphNode {
            id: format!("entity-{}", id),
            label: format!("Person {}", id),
            kind: Some("Person".to_string()),
            properties: serde_json::Value::Null,
        }
    }
}

#[async_trait]
impl IntelligenceBackend for FakeBackend {
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken> {
        if password != "correct" {
            return Err(SurakshError::Authorization(
                "Incorrect username or password".to_string(),
            ));
        }
        Ok(AccessToken {
            access_token: format!("token-for-{}", username),
            token_type: "bearer".to_string(),
        })
    }

    async fn current_user(&self) -> Result<CurrentUser> {
        if let Some(err) = self.fail_me.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(CurrentUser {
            username: "analyst".to_string(),
            email: "analyst@example.org".to_string(),
            clearance_level: "L2".to_string(),
            is_active: true,
        })
    }

    async fn register(&self, registration: &Registration) -> Result<CurrentUser> {
        if registration.username == "analyst" {
            return Err(SurakshError::Validation(
                "Username already registered".to_string(),
            ));
        }
        Ok(CurrentUser {
            username: registration.username.clone(),
            email: registration.email.clone(),
            clearance_level: registration.clearance_level.clone(),
            is_active: true,
        })
    }

    async fn list_files(&self) -> Result<VaultListing> {
        Ok(VaultListing::default())
    }

    async fn upload_file(&self, file_name: &str, content: Vec<u8>) -> Result<UploadedFile> {
        Ok(UploadedFile {
            file_id: format!("id-{}", file_name),
            filename: file_name.to_string(),
            size: content.len() as u64,
            uploaded_at: "2026-01-01T00:00:00".to_string(),
        })
    }

    async fn delete_file(&self, _file_id: &str) -> Result<()> {
        Ok(())
    }

    async fn ingest_file(&self, file_id: &str, _extract_graph: bool) -> Result<IngestReport> {
        if let Some(err) = self.fail_ingest.lock().unwrap().clone() {
            return Err(err);
        }
        self.ingested.lock().unwrap().push(file_id.to_string());
        Ok(IngestReport {
            source_id: file_id.to_string(),
            source_name: None,
            entities_extracted: 4,
            relations_extracted: 3,
            chunks_created: 9,
            status: "completed".to_string(),
        })
    }

    async fn ingest_text(&self, request: &TextIngest) -> Result<IngestReport> {
        if let Some(err) = self.fail_ingest.lock().unwrap().clone() {
            return Err(err);
        }
        let source_id = request
            .source_id
            .clone()
            .unwrap_or_else(|| "text-1".to_string());
        self.ingested.lock().unwrap().push(source_id.clone());
        Ok(IngestReport {
            source_id,
            source_name: request.source_name.clone(),
            entities_extracted: 2,
            relations_extracted: 1,
            chunks_created: 1,
            status: "completed".to_string(),
        })
    }

    async fn entity_graph(&self, _entity_name: &str, _depth: u32) -> Result<GraphData> {
        self.full_graph(1).await
    }

    async fn full_graph(&self, _limit: u32) -> Result<GraphData> {
        self.graph_loads.fetch_add(1, Ordering::SeqCst);
        let nodes = (0..=self.ingested.lock().unwrap().len())
            .map(Self::node)
            .collect();
        Ok(GraphData {
            nodes,
            edges: Vec::new(),
        })
    }

    async fn export_graph(&self, export: &GraphExport) -> Result<GraphData> {
        self.full_graph(export.limit).await
    }

    async fn search(&self, query: &str, _top_k: u32) -> Result<SearchResult> {
        Ok(SearchResult {
            query: query.to_string(),
            answer: String::new(),
            graph_path: Default::default(),
            entities_found: Vec::new(),
            reasoning: String::new(),
        })
    }

    async fn deep_search(&self, query: &str, _top_k: u32) -> Result<DeepSearchResult> {
        Ok(DeepSearchResult {
            query: query.to_string(),
            answer: String::new(),
            citations: Vec::new(),
            source_summary: Vec::new(),
            error: None,
        })
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            status: "operational".to_string(),
            service: None,
            version: None,
        })
    }
}
