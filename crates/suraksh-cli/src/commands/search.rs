use super::context::{AppContext, ContextOptions};
use anyhow::Result;
use suraksh_core::backend::IntelligenceBackend;
use suraksh_core::navigation::Route;

pub async fn search(options: &ContextOptions, query: &str, top_k: u32, json: bool) -> Result<()> {
    let ctx = AppContext::new(options, Route::Search)?;
    ctx.require_session().await?;

    let result = ctx.api.search(query, top_k).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", result.answer);
    if !result.entities_found.is_empty() {
        println!();
        println!("Entities: {}", result.entities_found.join(", "));
    }
    let path = &result.graph_path;
    if path.path_found {
        println!("Path ({} hops): {}", path.path_length, path.entities.join(" -> "));
    }
    if !result.reasoning.is_empty() {
        println!("Reasoning: {}", result.reasoning);
    }
    Ok(())
}

pub async fn deep_search(
    options: &ContextOptions,
    query: &str,
    top_k: u32,
    json: bool,
) -> Result<()> {
    let ctx = AppContext::new(options, Route::DeepSearch)?;
    ctx.require_session().await?;

    let result = ctx.api.deep_search(query, top_k).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if let Some(error) = &result.error {
        eprintln!("⚠️  {}", error);
    }
    println!("{}", result.answer);
    if !result.source_summary.is_empty() {
        println!();
        println!("Sources:");
        for source in &result.source_summary {
            let pages = source
                .pages
                .iter()
                .map(|page| page.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            match source.confidence {
                Some(confidence) => println!(
                    "  {} (pages {}, confidence {:.0}%)",
                    source.filename,
                    pages,
                    confidence * 100.0
                ),
                None => println!("  {} (pages {})", source.filename, pages),
            }
        }
    }
    Ok(())
}
