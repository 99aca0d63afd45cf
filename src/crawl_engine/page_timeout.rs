//! Timeout utilities for page operations
//!
//! Wraps render-session calls with `tokio::time::timeout` so a stalled
//! navigation turns into a `RenderTimeout` instead of a hung task.

use std::future::Future;
use std::time::Duration;

use super::crawl_types::PageError;
use crate::renderer::RenderFailure;

/// Run a render operation with an explicit deadline.
///
/// # Returns
/// * `Ok(T)` - Operation completed successfully
/// * `Err(PageError::RenderTimeout)` - The deadline passed first
/// * `Err(PageError::RenderError)` - The operation itself failed
pub async fn with_page_timeout<F, T>(operation: F, timeout: Duration) -> Result<T, PageError>
where
    F: Future<Output = Result<T, RenderFailure>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result.map_err(PageError::from),
        Err(_) => Err(PageError::RenderTimeout(timeout)),
    }
}
