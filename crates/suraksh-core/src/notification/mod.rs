//! Persisted notification log.

mod model;
mod store;

pub use model::{NotificationEntry, NotificationKind};
pub use store::{NOTIFICATION_CAPACITY, NotificationStore};
