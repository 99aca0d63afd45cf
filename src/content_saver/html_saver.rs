use anyhow::{Context, Result};
use std::path::Path;

use super::page_dir::PageDirs;

/// Write the rendered document to `index.html`, replacing any earlier snapshot.
pub async fn write_html(dirs: &PageDirs, content: &str) -> Result<()> {
    let path = dirs.html_path();
    write_utf8(&path, content).await
}

async fn write_utf8(path: &Path, content: &str) -> Result<()> {
    tokio::fs::write(path, content.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    log::debug!(target: "sitemirror::crawl", "Saved HTML snapshot to {}", path.display());
    Ok(())
}
