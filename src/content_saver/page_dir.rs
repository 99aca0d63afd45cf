//! Per-page mirror directories.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::utils::{HTML_FILE_NAME, MEDIA_DIR_NAME};

/// Directories belonging to one mirrored page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDirs {
    /// `<storage root>/<path token>/`
    pub page_dir: PathBuf,
    /// `<storage root>/<path token>/media/`
    pub media_dir: PathBuf,
}

impl PageDirs {
    /// Location of the page's HTML snapshot
    #[must_use]
    pub fn html_path(&self) -> PathBuf {
        self.page_dir.join(HTML_FILE_NAME)
    }
}

/// Create `<storage_root>/<path_token>/media/`, including parents.
///
/// Succeeds when the directories already exist, which is the normal case
/// for distinct URLs sharing a path token.
pub async fn prepare_page_dir(storage_root: &Path, path_token: &str) -> Result<PageDirs> {
    let page_dir = storage_root.join(path_token);
    let media_dir = page_dir.join(MEDIA_DIR_NAME);

    tokio::fs::create_dir_all(&media_dir)
        .await
        .with_context(|| format!("Failed to create page directory {}", media_dir.display()))?;

    Ok(PageDirs {
        page_dir,
        media_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_page_and_media_dirs_idempotently() {
        let root = tempfile::tempdir().unwrap();

        let first = prepare_page_dir(root.path(), "news").await.unwrap();
        let second = prepare_page_dir(root.path(), "news").await.unwrap();

        assert_eq!(first, second);
        assert!(first.page_dir.is_dir());
        assert!(first.media_dir.is_dir());
        assert_eq!(first.media_dir, root.path().join("news").join("media"));
        assert_eq!(first.html_path(), root.path().join("news").join("index.html"));
    }
}
