pub mod auth;
pub mod context;
pub mod graph;
pub mod navigator;
pub mod notifications;
pub mod search;
pub mod vault;
pub mod watch;

pub use context::ContextOptions;
