//! Upload and ingestion use case.

use std::sync::Arc;
use suraksh_core::backend::{IngestReport, IntelligenceBackend, TextIngest, UploadedFile};
use suraksh_core::error::Result;
use suraksh_core::event::{EventBus, GraphDataUpdated};
use suraksh_core::navigation::Route;
use suraksh_core::notification::{NotificationKind, NotificationStore};

/// Result of a successful upload + ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub file: UploadedFile,
    pub report: IngestReport,
}

/// Runs ingestion and tells the rest of the client about it.
///
/// Files and text snippets take the same path. On success a notification
/// linking to the graph is persisted and a [`GraphDataUpdated`] event is
/// published; on failure an error notification is persisted. Nothing here knows who listens.
pub struct IngestionUseCase {
    backend: Arc<dyn IntelligenceBackend>,
    notifications: Arc<NotificationStore>,
    bus: EventBus,
}

impl IngestionUseCase {
    pub fn new(
        backend: Arc<dyn IntelligenceBackend>,
        notifications: Arc<NotificationStore>,
        bus: EventBus,
    ) -> Self {
        Self {
            backend,
            notifications,
            bus,
        }
    }

    /// Uploads a document to the vault and ingests it.
    pub async fn upload_and_ingest(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<IngestOutcome> {
        let file = match self.backend.upload_file(file_name, content).await {
            Ok(file) => file,
            Err(e) => {
                self.notify_failure("Upload Failed", file_name, &e);
                return Err(e);
            }
        };
        tracing::info!(
            "[IngestionUseCase] Uploaded {} as {}",
            file.filename,
            file.file_id
        );

        let report = self.ingest(&file.file_id, &file.filename).await?;
        Ok(IngestOutcome { file, report })
    }

    /// Ingests a document already in the vault.
    pub async fn ingest(&self, file_id: &str, file_name: &str) -> Result<IngestReport> {
        let report = match self.backend.ingest_file(file_id, true).await {
            Ok(report) => report,
            Err(e) => {
                self.notify_failure("Ingestion Failed", file_name, &e);
                return Err(e);
            }
        };
        self.announce("File Ingested", file_name, &report);
        Ok(report)
    }

    /// Ingests free text, announcing it the same way as a document.
    pub async fn ingest_text(&self, request: &TextIngest) -> Result<IngestReport> {
        let name = request.display_name();
        let report = match self.backend.ingest_text(request).await {
            Ok(report) => report,
            Err(e) => {
                self.notify_failure("Ingestion Failed", name, &e);
                return Err(e);
            }
        };
        self.announce("Text Ingested", name, &report);
        Ok(report)
    }

    /// Records the success notification, then tells listeners the graph moved.
    fn announce(&self, title: &str, source_name: &str, report: &IngestReport) {
        let message = format!(
            "{} processed: {} entities, {} relations extracted",
            source_name, report.entities_extracted, report.relations_extracted
        );
        if let Err(e) = self.notifications.create(
            NotificationKind::Success,
            title,
            message,
            Some(Route::Graph.path().to_string()),
        ) {
            tracing::warn!("[IngestionUseCase] Could not record notification: {}", e);
        }

        let event = GraphDataUpdated {
            entities_extracted: report.entities_extracted,
            relations_extracted: report.relations_extracted,
        };
        match self.bus.publish_event(&event) {
            Ok(listeners) => tracing::debug!(
                "[IngestionUseCase] graph update announced to {} listener(s)",
                listeners
            ),
            Err(e) => tracing::warn!("[IngestionUseCase] Could not publish graph update: {}", e),
        }
    }

    fn notify_failure(&self, title: &str, file_name: &str, error: &suraksh_core::SurakshError) {
        // Authorization failures end in a silent redirect.
        if error.is_authorization() {
            return;
        }
        let detail = error.user_message().unwrap_or_else(|| error.to_string());
        if let Err(e) = self.notifications.create(
            NotificationKind::Error,
            title,
            format!("{}: {}", file_name, detail),
            Some(Route::Vault.path().to_string()),
        ) {
            tracing::warn!("[IngestionUseCase] Could not record notification: {}", e);
        }
    }
}
