use super::context::{AppContext, ContextOptions};
use anyhow::{Context, Result, bail};
use std::io::Read;
use std::path::Path;
use suraksh_core::backend::{IntelligenceBackend, TextIngest};
use suraksh_core::navigation::Route;

pub async fn files(options: &ContextOptions, json: bool) -> Result<()> {
    let ctx = AppContext::new(options, Route::Vault)?;
    ctx.require_session().await?;

    let listing = ctx.api.list_files().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    if listing.files.is_empty() {
        println!("The vault is empty.");
        return Ok(());
    }

    println!("{:<38} {:>10}  {:<5} {:<20} NAME", "ID", "SIZE", "LEVEL", "UPLOADED");
    for file in &listing.files {
        println!(
            "{:<38} {:>10}  {:<5} {:<20} {}",
            file.id,
            human_size(file.size),
            file.clearance_level,
            file.uploaded_at.chars().take(19).collect::<String>(),
            file.filename
        );
    }
    println!("{} file(s)", listing.total);
    Ok(())
}

pub async fn upload(options: &ContextOptions, path: &Path, ingest: bool) -> Result<()> {
    let ctx = AppContext::new(options, Route::Vault)?;
    ctx.require_session().await?;

    let content =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .context("Upload path has no file name")?;

    if !ingest {
        let file = ctx.api.upload_file(&file_name, content).await?;
        println!("📄 Uploaded {} as {}", file.filename, file.file_id);
        return Ok(());
    }

    println!("⏳ Uploading and ingesting {}...", file_name);
    let outcome = ctx.ingestion().upload_and_ingest(&file_name, content).await?;
    print_ingest(&outcome.report);
    println!("   file id: {}", outcome.file.file_id);
    Ok(())
}

pub async fn ingest(options: &ContextOptions, file_id: &str, name: Option<&str>) -> Result<()> {
    let ctx = AppContext::new(options, Route::Vault)?;
    ctx.require_session().await?;

    println!("⏳ Ingesting {}...", file_id);
    let report = ctx.ingestion().ingest(file_id, name.unwrap_or(file_id)).await?;
    print_ingest(&report);
    Ok(())
}

/// Ingests text given inline or read from `from_file` (`-` for stdin).
pub async fn ingest_text(
    options: &ContextOptions,
    text: Option<String>,
    from_file: Option<&Path>,
    request: TextIngest,
) -> Result<()> {
    let text = match (text, from_file) {
        (Some(text), None) => text,
        (None, Some(path)) if path == Path::new("-") => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            buffer
        }
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (Some(_), Some(_)) => bail!("Pass the text inline or with --from-file, not both"),
        (None, None) => bail!("Nothing to ingest: pass the text or --from-file"),
    };

    let ctx = AppContext::new(options, Route::Vault)?;
    ctx.require_session().await?;

    let request = TextIngest { text, ..request };
    println!("⏳ Ingesting {}...", request.display_name());
    let report = ctx.ingestion().ingest_text(&request).await?;
    print_ingest(&report);
    println!("   source id: {}", report.source_id);
    Ok(())
}

pub async fn delete(options: &ContextOptions, file_id: &str) -> Result<()> {
    let ctx = AppContext::new(options, Route::Vault)?;
    ctx.require_session().await?;

    ctx.api.delete_file(file_id).await?;
    println!("🗑  Deleted {}", file_id);
    Ok(())
}

pub async fn download(options: &ContextOptions, file_id: &str, output: &Path) -> Result<()> {
    let ctx = AppContext::new(options, Route::Vault)?;
    ctx.require_session().await?;

    let content = ctx.api.download_file(file_id).await?;
    std::fs::write(output, &content)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Saved {} ({})", output.display(), human_size(content.len() as u64));
    Ok(())
}

fn print_ingest(report: &suraksh_core::backend::IngestReport) {
    println!(
        "✅ Ingestion {}: {} entities, {} relations, {} chunks",
        report.status, report.entities_extracted, report.relations_extracted, report.chunks_created
    );
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::human_size;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }
}
