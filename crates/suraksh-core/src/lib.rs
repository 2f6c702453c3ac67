//! Domain layer of the Suraksh client: session state, the notification log,
//! the cross-component event bus and the route guard.

pub mod backend;
pub mod config;
pub mod error;
pub mod event;
pub mod guard;
pub mod navigation;
pub mod notification;
pub mod session;
pub mod store;

// Re-export common error type
pub use error::{Result, SurakshError};
