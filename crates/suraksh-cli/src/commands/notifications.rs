use super::context::{AppContext, ContextOptions};
use anyhow::{Result, bail};
use suraksh_core::navigation::Route;
use suraksh_core::notification::{NotificationEntry, NotificationKind};

pub async fn list(options: &ContextOptions, unread_only: bool, json: bool) -> Result<()> {
    let ctx = AppContext::new(options, Route::Notifications)?;
    ctx.require_session().await?;

    let entries: Vec<NotificationEntry> = ctx
        .notifications
        .list()
        .into_iter()
        .filter(|entry| !unread_only || !entry.read)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No notifications.");
        return Ok(());
    }

    for entry in &entries {
        print_entry(entry);
    }
    println!("{} unread", ctx.notifications.unread_count());
    Ok(())
}

pub async fn mark_read(options: &ContextOptions, id: &str) -> Result<()> {
    let ctx = AppContext::new(options, Route::Notifications)?;
    ctx.require_session().await?;

    if !ctx.notifications.mark_read(id)? {
        bail!("No notification with id '{}'", id);
    }
    Ok(())
}

pub async fn mark_all_read(options: &ContextOptions) -> Result<()> {
    let ctx = AppContext::new(options, Route::Notifications)?;
    ctx.require_session().await?;

    let changed = ctx.notifications.mark_all_read()?;
    println!("Marked {} notification(s) as read.", changed);
    Ok(())
}

pub async fn remove(options: &ContextOptions, id: &str) -> Result<()> {
    let ctx = AppContext::new(options, Route::Notifications)?;
    ctx.require_session().await?;

    if !ctx.notifications.remove(id)? {
        bail!("No notification with id '{}'", id);
    }
    Ok(())
}

pub async fn clear(options: &ContextOptions) -> Result<()> {
    let ctx = AppContext::new(options, Route::Notifications)?;
    ctx.require_session().await?;

    ctx.notifications.clear()?;
    println!("Notifications cleared.");
    Ok(())
}

pub(crate) fn print_entry(entry: &NotificationEntry) {
    let marker = if entry.read { " " } else { "●" };
    println!(
        "{} {} {} [{}] {}",
        marker,
        kind_icon(entry.kind),
        entry.created_at.format("%Y-%m-%d %H:%M:%S"),
        entry.id,
        entry.title
    );
    println!("      {}", entry.message);
    if let Some(target) = &entry.action_target {
        println!("      -> {}", target);
    }
}

fn kind_icon(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Info => "ℹ️ ",
        NotificationKind::Success => "✅",
        NotificationKind::Warning => "⚠️ ",
        NotificationKind::Error => "❌",
    }
}
