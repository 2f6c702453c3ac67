//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: session record, user profile and snapshot types
//! - `manager`: the session manager and the credential seam used by the transport

mod manager;
mod model;

pub use manager::{CredentialSource, SessionManager};
pub use model::{SESSION_SCHEMA_VERSION, SessionRecord, SessionSnapshot, UserProfile};
