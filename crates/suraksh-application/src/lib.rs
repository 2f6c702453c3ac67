//! Application layer: use cases and long-lived views built from the core
//! components and the backend seam.

pub mod auth_usecase;
pub mod graph_viewer;
pub mod ingestion_usecase;
pub mod notification_feed;

pub use auth_usecase::AuthUseCase;
pub use graph_viewer::{GraphScope, GraphView, GraphViewer};
pub use ingestion_usecase::{IngestOutcome, IngestionUseCase};
pub use notification_feed::{FeedSnapshot, NotificationFeed};
