use std::sync::Arc;

use async_trait::async_trait;
use scc::HashMap;

use crate::{core::filter::ManagedFilter, ports::filter_store::FilterStore};

/// In-process filter store backed by a concurrent `scc::HashMap`.
#[derive(Default)]
pub struct InMemoryFilterStore {
    filters: HashMap<String, Arc<ManagedFilter>>,
}

impl InMemoryFilterStore {
    pub fn new() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }
}

#[async_trait]
impl FilterStore for InMemoryFilterStore {
    async fn get(&self, identity: &str) -> Option<Arc<ManagedFilter>> {
        self.filters
            .get_async(identity)
            .await
            .map(|entry| entry.get().clone())
    }

    async fn put(&self, identity: &str, filter: Arc<ManagedFilter>) {
        let _ = self
            .filters
            .upsert_async(identity.to_string(), filter)
            .await;
    }

    async fn remove(&self, identity: &str) -> Option<Arc<ManagedFilter>> {
        self.filters
            .remove_async(identity)
            .await
            .map(|(_, filter)| filter)
    }

    fn len(&self) -> usize {
        self.filters.len()
    }

    async fn all_filters(&self) -> Vec<Arc<ManagedFilter>> {
        let mut filters = Vec::with_capacity(self.filters.len());
        let filters_ref = &mut filters;
        self.filters
            .iter_async(|_, filter| {
                filters_ref.push(filter.clone());
                true
            })
            .await;
        filters
    }
}
