use super::model::{NotificationEntry, NotificationKind};
use crate::error::Result;
use crate::store::{PersistedStore, keys};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Maximum number of entries kept in the log. Older entries are evicted
/// silently; a new entry is never rejected.
pub const NOTIFICATION_CAPACITY: usize = 50;

/// Bounded, persisted log of user-facing alerts.
///
/// Every operation works on the full persisted list: mutations read it,
/// apply the change and write the whole list back. Mutations issued through
/// the same `NotificationStore` are serialized by an internal writer lock,
/// so concurrent callers sharing one instance never lose an update. Writers
/// in *other processes* sharing the same storage are not coordinated; between
/// them the last write wins.
///
/// Reads never fail: a missing, unreadable or corrupt log is an empty log.
pub struct NotificationStore {
    store: Arc<dyn PersistedStore>,
    writer: Mutex<()>,
}

impl NotificationStore {
    pub fn new(store: Arc<dyn PersistedStore>) -> Self {
        Self {
            store,
            writer: Mutex::new(()),
        }
    }

    /// Creates an unread entry timestamped now and persists it at the head
    /// of the log, evicting the oldest entries beyond the capacity.
    pub fn create(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        action_target: Option<String>,
    ) -> Result<NotificationEntry> {
        let created_at = Utc::now();
        let entry = NotificationEntry {
            // The random half keeps ids unique when several entries share a
            // millisecond.
            id: format!(
                "{}-{}",
                created_at.timestamp_millis(),
                Uuid::new_v4().simple()
            ),
            kind,
            title: title.into(),
            message: message.into(),
            created_at,
            read: false,
            action_target,
        };

        let created = entry.clone();
        self.mutate(move |entries| {
            entries.insert(0, entry);
        })?;

        tracing::debug!(
            "[NotificationStore] Created {} notification '{}'",
            created.kind,
            created.title
        );
        Ok(created)
    }

    /// All persisted entries, most recent first. Always re-reads storage.
    pub fn list(&self) -> Vec<NotificationEntry> {
        let mut entries = self.read_all();
        normalize(&mut entries);
        entries
    }

    /// Number of unread entries, derived from the persisted list.
    pub fn unread_count(&self) -> usize {
        self.list().iter().filter(|entry| !entry.read).count()
    }

    /// Marks one entry read. Returns `false` if no entry has that id.
    pub fn mark_read(&self, id: &str) -> Result<bool> {
        self.mutate(|entries| {
            match entries.iter_mut().find(|entry| entry.id == id) {
                Some(entry) => {
                    entry.read = true;
                    true
                }
                None => false,
            }
        })
    }

    /// Marks every entry read and returns how many changed.
    pub fn mark_all_read(&self) -> Result<usize> {
        self.mutate(|entries| {
            let mut changed = 0;
            for entry in entries.iter_mut().filter(|entry| !entry.read) {
                entry.read = true;
                changed += 1;
            }
            changed
        })
    }

    /// Removes one entry. Returns `false` if no entry has that id.
    pub fn remove(&self, id: &str) -> Result<bool> {
        self.mutate(|entries| {
            let before = entries.len();
            entries.retain(|entry| entry.id != id);
            entries.len() != before
        })
    }

    /// Empties the log.
    pub fn clear(&self) -> Result<()> {
        self.mutate(|entries| entries.clear())
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut Vec<NotificationEntry>) -> T) -> Result<T> {
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());

        let mut entries = self.read_all();
        let outcome = f(&mut entries);
        normalize(&mut entries);

        let json = serde_json::to_string(&entries)?;
        self.store.set(keys::NOTIFICATION_LOG, &json)?;
        Ok(outcome)
    }

    fn read_all(&self) -> Vec<NotificationEntry> {
        let raw = match self.store.get(keys::NOTIFICATION_LOG) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("[NotificationStore] Failed to read notification log: {}", e);
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(
                "[NotificationStore] Discarding corrupt notification log: {}",
                e
            );
            Vec::new()
        })
    }
}

/// Orders by `created_at` descending and enforces the capacity.
///
/// The sort is stable, so entries sharing a timestamp keep their list order;
/// a freshly created entry sits at the head and wins such ties.
fn normalize(entries: &mut Vec<NotificationEntry>) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries.truncate(NOTIFICATION_CAPACITY);
}
