//! Image persistence for a page's `media/` directory.

use anyhow::{Context, Result};
use std::future::Future;
use std::path::Path;
use url::Url;
use xxhash_rust::xxh3::xxh3_64;

use crate::utils::IMAGE_EXTENSIONS;

/// What happened to one image response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSaveOutcome {
    /// Body was read and written
    Saved,
    /// A non-empty file of the same name was already present
    AlreadyPresent,
}

/// True when a response is a successfully served image (status 200 and an
/// image extension on the URL path, compared case-insensitively).
#[must_use]
pub fn is_capturable_image(url: &str, status: u16) -> bool {
    if status != 200 {
        return false;
    }

    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let path = parsed.path().to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Local file name for an image URL.
///
/// Uses the last path segment. When that is empty a name is synthesized
/// from a hash of the full URL with a `.png` extension; the extension may
/// not match the real format.
#[must_use]
pub fn media_file_name(url: &str) -> String {
    let basename = Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .unwrap_or_default();

    if basename.is_empty() {
        format!("res_{:016x}.png", xxh3_64(url.as_bytes()))
    } else {
        basename
    }
}

/// Write an image into `media_dir` unless a non-empty file of that name exists.
///
/// `load_body` is only awaited when the write actually happens.
pub async fn save_media_if_absent<F, Fut>(
    media_dir: &Path,
    file_name: &str,
    load_body: F,
) -> Result<MediaSaveOutcome>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<u8>>>,
{
    let path = media_dir.join(file_name);

    if let Ok(metadata) = tokio::fs::metadata(&path).await
        && metadata.is_file()
        && metadata.len() > 0
    {
        return Ok(MediaSaveOutcome::AlreadyPresent);
    }

    let bytes = load_body()
        .await
        .with_context(|| format!("Failed to read body for {file_name}"))?;

    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(MediaSaveOutcome::Saved)
}
