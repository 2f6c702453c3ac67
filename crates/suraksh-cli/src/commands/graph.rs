use super::context::{AppContext, ContextOptions};
use anyhow::{Context, Result};
use std::path::Path;
use suraksh_core::backend::{GraphData, GraphExport, IntelligenceBackend};
use suraksh_core::navigation::Route;

/// Prints the full graph, or the neighbourhood of `entity` when given.
pub async fn show(
    options: &ContextOptions,
    entity: Option<&str>,
    depth: u32,
    limit: u32,
    json: bool,
) -> Result<()> {
    let ctx = AppContext::new(options, Route::Graph)?;
    ctx.require_session().await?;

    let data = match entity {
        Some(name) => ctx.api.entity_graph(name, depth).await?,
        None => ctx.api.full_graph(limit).await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        print_graph(&data);
    }
    Ok(())
}

/// Exports nodes and edges as JSON to `output`, or to stdout.
pub async fn export(
    options: &ContextOptions,
    export: &GraphExport,
    output: Option<&Path>,
) -> Result<()> {
    let ctx = AppContext::new(options, Route::Graph)?;
    ctx.require_session().await?;

    let data = ctx.api.export_graph(export).await?;
    let body = serde_json::to_string_pretty(&data)?;
    match output {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Exported {} nodes and {} edges to {}",
                data.nodes.len(),
                data.edges.len(),
                path.display()
            );
        }
        None => println!("{}", body),
    }
    Ok(())
}

pub(crate) fn print_graph(data: &GraphData) {
    if data.is_empty() {
        println!("The knowledge graph is empty. Ingest a document to populate it.");
        return;
    }

    println!("{} nodes, {} edges", data.nodes.len(), data.edges.len());
    for node in &data.nodes {
        match &node.kind {
            Some(kind) => println!("  [{}] {} ({})", kind, node.label, node.id),
            None => println!("  {} ({})", node.label, node.id),
        }
    }
    for edge in &data.edges {
        println!("  {} -[{}]-> {}", edge.source, edge.relation, edge.target);
    }
}
