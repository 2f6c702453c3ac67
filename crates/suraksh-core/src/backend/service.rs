//! Backend service trait.

use super::model::{
    AccessToken, CurrentUser, DeepSearchResult, GraphData, GraphExport, HealthStatus,
    IngestReport, Registration, SearchResult, TextIngest, UploadedFile, VaultListing,
};
use crate::error::Result;
use async_trait::async_trait;

/// The intelligence backend as seen by the client.
///
/// Implementations attach the current credential to every call and are
/// expected to route authorization failures through the session teardown
/// path before returning [`SurakshError::Authorization`].
///
/// [`SurakshError::Authorization`]: crate::error::SurakshError::Authorization
#[async_trait]
pub trait IntelligenceBackend: Send + Sync {
    /// Exchanges credentials for an access token.
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken>;

    /// Creates an account. Does not sign in.
    async fn register(&self, registration: &Registration) -> Result<CurrentUser>;

    /// Profile of the account the current credential belongs to.
    async fn current_user(&self) -> Result<CurrentUser>;

    async fn list_files(&self) -> Result<VaultListing>;

    /// Uploads a document into the vault.
    async fn upload_file(&self, file_name: &str, content: Vec<u8>) -> Result<UploadedFile>;

    async fn delete_file(&self, file_id: &str) -> Result<()>;

    /// Runs extraction for a vault document.
    ///
    /// This can take minutes for large documents.
    async fn ingest_file(&self, file_id: &str, extract_graph: bool) -> Result<IngestReport>;

    /// Runs extraction over free text that never went through the vault.
    async fn ingest_text(&self, request: &TextIngest) -> Result<IngestReport>;

    /// Neighbourhood of a named entity up to `depth` hops.
    async fn entity_graph(&self, entity_name: &str, depth: u32) -> Result<GraphData>;

    /// The whole knowledge graph, capped at `limit` nodes.
    async fn full_graph(&self, limit: u32) -> Result<GraphData>;

    /// Knowledge graph export, optionally limited to one document.
    async fn export_graph(&self, export: &GraphExport) -> Result<GraphData>;

    async fn search(&self, query: &str, top_k: u32) -> Result<SearchResult>;

    async fn deep_search(&self, query: &str, top_k: u32) -> Result<DeepSearchResult>;

    /// Liveness probe with a short deadline.
    async fn health(&self) -> Result<HealthStatus>;
}
