//! Polling bridge between the notification log and its readers.
//!
//! Writers of the log and readers of it have no reference to each other, so
//! readers re-read the persisted log on a timer. A `graph-data-updated`
//! event short-circuits the wait, which is how an ingestion notification
//! shows up in an open panel without waiting a full interval.

use std::sync::Arc;
use std::time::Duration;
use suraksh_core::event::{EventBus, GraphDataUpdated, Subscription};
use suraksh_core::notification::{NotificationEntry, NotificationStore};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What a notification panel renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub entries: Vec<NotificationEntry>,
    pub unread: usize,
}

impl FeedSnapshot {
    fn read(store: &NotificationStore) -> Self {
        let entries = store.list();
        let unread = entries.iter().filter(|entry| !entry.read).count();
        Self { entries, unread }
    }
}

/// A running poller. Stops when dropped or on [`NotificationFeed::shutdown`].
pub struct NotificationFeed {
    store: Arc<NotificationStore>,
    snapshot_tx: watch::Sender<FeedSnapshot>,
    wake: Arc<Notify>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    _subscription: Subscription,
}

impl NotificationFeed {
    /// Reads the log once and starts polling every `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(store: Arc<NotificationStore>, bus: &EventBus, interval: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(FeedSnapshot::read(&store));
        let wake = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        let subscription = {
            let wake = wake.clone();
            bus.subscribe_event(move |_: GraphDataUpdated| wake.notify_one())
        };

        let task = tokio::spawn(poll_loop(
            store.clone(),
            snapshot_tx.clone(),
            wake.clone(),
            cancel.clone(),
            interval,
        ));
        tracing::debug!("[NotificationFeed] Polling every {:?}", interval);

        Self {
            store,
            snapshot_tx,
            wake,
            cancel,
            task: Some(task),
            _subscription: subscription,
        }
    }

    /// Latest snapshot the poller has seen.
    pub fn latest(&self) -> FeedSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Receiver that is notified whenever the snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Asks the poller to re-read without waiting for the next tick.
    pub fn refresh_now(&self) {
        self.wake.notify_one();
    }

    /// Re-reads the log on the caller's task and returns the result.
    pub fn refresh(&self) -> FeedSnapshot {
        publish(&self.snapshot_tx, FeedSnapshot::read(&self.store));
        self.latest()
    }

    /// Stops the poller and waits for it to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for NotificationFeed {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop(
    store: Arc<NotificationStore>,
    snapshot_tx: watch::Sender<FeedSnapshot>,
    wake: Arc<Notify>,
    cancel: CancellationToken,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately and the initial read already
    // happened in `start`.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
            _ = wake.notified() => {
                tracing::debug!("[NotificationFeed] Woken by graph update");
            }
        }
        publish(&snapshot_tx, FeedSnapshot::read(&store));
    }
    tracing::debug!("[NotificationFeed] Stopped");
}

fn publish(snapshot_tx: &watch::Sender<FeedSnapshot>, next: FeedSnapshot) {
    snapshot_tx.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use suraksh_core::notification::NotificationKind;
    use suraksh_core::store::InMemoryStore;

    fn store() -> Arc<NotificationStore> {
        Arc::new(NotificationStore::new(Arc::new(InMemoryStore::new())))
    }

    #[tokio::test(start_paused = true)]
    async fn test_picks_up_writes_on_next_tick() {
        let store = store();
        let bus = EventBus::new();
        let feed = NotificationFeed::start(store.clone(), &bus, Duration::from_secs(5));
        let mut rx = feed.subscribe();
        assert_eq!(feed.latest().unread, 0);

        store
            .create(NotificationKind::Info, "Vault", "sync done", None)
            .unwrap();
        rx.changed().await.unwrap();

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.unread, 1);
        assert_eq!(snapshot.entries[0].title, "Vault");
        feed.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_graph_update_wakes_poller_early() {
        let store = store();
        let bus = EventBus::new();
        let feed = NotificationFeed::start(store.clone(), &bus, Duration::from_secs(3600));
        let mut rx = feed.subscribe();

        store
            .create(NotificationKind::Success, "File Ingested", "done", None)
            .unwrap();
        bus.publish_event(&GraphDataUpdated {
            entities_extracted: 1,
            relations_extracted: 0,
        })
        .unwrap();

        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .expect("woken before the hourly tick")
            .unwrap();
        assert_eq!(rx.borrow().unread, 1);
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let feed = NotificationFeed::start(store(), &bus, Duration::from_secs(5));
        assert_eq!(bus.listener_count("graph-data-updated"), 1);
        drop(feed);
        assert_eq!(bus.listener_count("graph-data-updated"), 0);
    }

    #[tokio::test]
    async fn test_refresh_reads_synchronously() {
        let store = store();
        let bus = EventBus::new();
        let feed = NotificationFeed::start(store.clone(), &bus, Duration::from_secs(3600));
        let entry = store
            .create(NotificationKind::Warning, "Clearance", "L3 required", None)
            .unwrap();
        store.mark_read(&entry.id).unwrap();

        let snapshot = feed.refresh();
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.unread, 0);
    }
}
