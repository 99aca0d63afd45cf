//! Registry of pages already claimed by a task.

use dashmap::DashSet;
use std::sync::Arc;

use crate::utils::url_utils::NormalizedKey;

/// Concurrent set of normalized keys, shared by every task of one run.
///
/// Cloning shares the underlying set.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    keys: Arc<DashSet<NormalizedKey>>,
}

impl VisitedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key` if absent. Returns `true` only for the call that inserted it.
    ///
    /// Check and insert happen under one shard lock, so concurrent callers
    /// with the same key get exactly one `true`.
    pub fn try_mark_visited(&self, key: NormalizedKey) -> bool {
        self.keys.insert(key)
    }

    #[must_use]
    pub fn contains(&self, key: &NormalizedKey) -> bool {
        self.keys.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
