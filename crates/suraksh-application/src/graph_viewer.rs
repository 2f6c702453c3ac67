//! Knowledge graph view that follows ingestion runs.

use std::sync::Arc;
use suraksh_core::backend::{DEFAULT_GRAPH_LIMIT, GraphData, IntelligenceBackend};
use suraksh_core::error::Result;
use suraksh_core::event::{EventBus, GraphDataUpdated, Subscription};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Which part of the graph a viewer shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphScope {
    All { limit: u32 },
    Entity { name: String, depth: u32 },
}

impl Default for GraphScope {
    fn default() -> Self {
        GraphScope::All {
            limit: DEFAULT_GRAPH_LIMIT,
        }
    }
}

/// Rendered state of a viewer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphView {
    pub data: GraphData,
    /// Completed load attempts, successful or not.
    pub loads: u64,
    pub last_error: Option<String>,
    /// The most recent update event that triggered a reload.
    pub last_update: Option<GraphDataUpdated>,
}

/// A mounted graph view.
///
/// Loads eagerly on mount, because an update published before mounting is
/// never replayed. While mounted, every `graph-data-updated` event triggers a
/// reload. Dropping the viewer unsubscribes and stops the reload task.
pub struct GraphViewer {
    state_tx: watch::Sender<GraphView>,
    reload: Arc<Notify>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    subscription: Option<Subscription>,
}

impl GraphViewer {
    pub async fn mount(
        backend: Arc<dyn IntelligenceBackend>,
        bus: &EventBus,
        scope: GraphScope,
    ) -> Self {
        let (state_tx, _) = watch::channel(GraphView::default());
        let reload = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        // Subscribe before the first load so an update landing mid-load is
        // not lost.
        let subscription = {
            let reload = reload.clone();
            let state_tx = state_tx.clone();
            bus.subscribe_event(move |event: GraphDataUpdated| {
                tracing::debug!(
                    "[GraphViewer] Graph updated (+{} entities, +{} relations)",
                    event.entities_extracted,
                    event.relations_extracted
                );
                state_tx.send_modify(|view| view.last_update = Some(event));
                reload.notify_one();
            })
        };

        refresh(&*backend, &scope, &state_tx).await;

        let task = tokio::spawn(reload_loop(
            backend,
            scope,
            state_tx.clone(),
            reload.clone(),
            cancel.clone(),
        ));

        Self {
            state_tx,
            reload,
            cancel,
            task: Some(task),
            subscription: Some(subscription),
        }
    }

    pub fn view(&self) -> GraphView {
        self.state_tx.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn changes(&self) -> watch::Receiver<GraphView> {
        self.state_tx.subscribe()
    }

    /// Reloads in the background, as an update event would.
    pub fn request_reload(&self) {
        self.reload.notify_one();
    }

    /// Unsubscribes and waits for an in-flight reload to finish.
    pub async fn unmount(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for GraphViewer {
    fn drop(&mut self) {
        self.subscription.take();
        self.cancel.cancel();
    }
}

async fn reload_loop(
    backend: Arc<dyn IntelligenceBackend>,
    scope: GraphScope,
    state_tx: watch::Sender<GraphView>,
    reload: Arc<Notify>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = reload.notified() => {
                refresh(&*backend, &scope, &state_tx).await;
            }
        }
    }
}

async fn refresh(
    backend: &dyn IntelligenceBackend,
    scope: &GraphScope,
    state_tx: &watch::Sender<GraphView>,
) {
    let result = load(backend, scope).await;
    state_tx.send_modify(|view| {
        view.loads += 1;
        match result {
            Ok(data) => {
                tracing::debug!(
                    "[GraphViewer] Loaded {} nodes, {} edges",
                    data.nodes.len(),
                    data.edges.len()
                );
                view.data = data;
                view.last_error = None;
            }
            Err(e) => {
                // Keep showing the previous graph.
                tracing::warn!("[GraphViewer] Reload failed: {}", e);
                view.last_error = Some(e.user_message().unwrap_or_else(|| e.to_string()));
            }
        }
    });
}

async fn load(backend: &dyn IntelligenceBackend, scope: &GraphScope) -> Result<GraphData> {
    match scope {
        GraphScope::All { limit } => backend.full_graph(*limit).await,
        GraphScope::Entity { name, depth } => backend.entity_graph(name, *depth).await,
    }
}
