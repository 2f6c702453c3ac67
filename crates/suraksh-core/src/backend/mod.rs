//! Backend API models and the service seam used by the application layer.

pub mod model;
pub mod service;

pub use model::*;
pub use service::IntelligenceBackend;
