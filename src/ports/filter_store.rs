use std::sync::Arc;

use async_trait::async_trait;

use crate::core::filter::ManagedFilter;

/// FilterStore defines the port for the concurrent registry of live filter instances
///
/// Entries are keyed by filter identity. Implementations must allow concurrent access to
/// unrelated identities without serialising on a single lock, and a `put` must never expose
/// a partially constructed instance to readers.
#[async_trait]
pub trait FilterStore: Send + Sync + 'static {
    /// Look up the filter registered under `identity`
    async fn get(&self, identity: &str) -> Option<Arc<ManagedFilter>>;

    /// Register `filter` under `identity`, replacing any previous entry
    async fn put(&self, identity: &str, filter: Arc<ManagedFilter>);

    /// Remove and return the filter registered under `identity`
    async fn remove(&self, identity: &str) -> Option<Arc<ManagedFilter>>;

    /// Number of registered filters
    fn len(&self) -> usize;

    /// Whether the store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every registered filter
    async fn all_filters(&self) -> Vec<Arc<ManagedFilter>>;
}
