//! Live dashboard: a mounted graph view plus the notification panel.

use super::context::{AppContext, ContextOptions};
use super::graph::print_graph;
use super::notifications::print_entry;
use anyhow::Result;
use std::collections::HashSet;
use suraksh_application::{FeedSnapshot, GraphScope, GraphViewer, NotificationFeed};
use suraksh_core::navigation::Route;

pub async fn run(options: &ContextOptions, scope: GraphScope) -> Result<()> {
    let ctx = AppContext::new(options, Route::Graph)?;
    ctx.require_session().await?;

    let feed = NotificationFeed::start(
        ctx.notifications.clone(),
        &ctx.bus,
        ctx.config.notification_poll_interval,
    );
    let viewer = GraphViewer::mount(ctx.backend(), &ctx.bus, scope).await;

    let mut graph_rx = viewer.changes();
    let mut feed_rx = feed.subscribe();

    let initial = feed.latest();
    let mut seen: HashSet<String> = initial.entries.iter().map(|e| e.id.clone()).collect();
    render_graph(&viewer);
    println!("🔔 {} unread notification(s). Press Ctrl-C to stop.", initial.unread);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = graph_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                render_graph(&viewer);
            }
            changed = feed_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = feed_rx.borrow_and_update().clone();
                // Ingestions run by other processes only reach us through the
                // persisted log, so a fresh graph-linked entry means reload.
                if announce_new(&snapshot, &mut seen) {
                    viewer.request_reload();
                }
            }
        }

        if ctx.navigator.redirected_to_login() {
            break;
        }
    }

    viewer.unmount().await;
    feed.shutdown().await;
    Ok(())
}

fn render_graph(viewer: &GraphViewer) {
    let view = viewer.view();
    println!();
    match &view.last_error {
        Some(error) => println!("⚠️  Graph load failed: {}", error),
        None => print_graph(&view.data),
    }
}

/// Prints entries not seen before. Returns whether any of them links to the
/// graph view.
fn announce_new(snapshot: &FeedSnapshot, seen: &mut HashSet<String>) -> bool {
    let mut graph_changed = false;
    for entry in snapshot.entries.iter().rev() {
        if !seen.insert(entry.id.clone()) {
            continue;
        }
        println!();
        print_entry(entry);
        if entry.action_target.as_deref() == Some(Route::Graph.path()) {
            graph_changed = true;
        }
    }
    graph_changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use suraksh_core::notification::{NotificationEntry, NotificationKind};

    fn entry(id: &str, target: Option<&str>) -> NotificationEntry {
        NotificationEntry {
            id: id.to_string(),
            kind: NotificationKind::Success,
            title: "File Ingested".to_string(),
            message: "report.pdf processed".to_string(),
            created_at: Utc::now(),
            read: false,
            action_target: target.map(str::to_string),
        }
    }

    #[test]
    fn test_only_new_graph_entries_trigger_reload() {
        let mut seen = HashSet::from(["old".to_string()]);

        let snapshot = FeedSnapshot {
            entries: vec![entry("new", Some("/vault")), entry("old", Some("/graph"))],
            unread: 2,
        };
        assert!(!announce_new(&snapshot, &mut seen));

        let snapshot = FeedSnapshot {
            entries: vec![entry("newer", Some("/graph")), entry("new", Some("/vault"))],
            unread: 2,
        };
        assert!(announce_new(&snapshot, &mut seen));
        assert!(!announce_new(&snapshot, &mut seen));
    }
}
