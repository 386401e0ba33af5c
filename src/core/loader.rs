//! Dynamic filter loader and per-type filter cache.
//!
//! The `FilterLoader` compiles filters on demand through an injected
//! [`DynamicCodeCompiler`], detects source changes (recorded source text for
//! text loads, last-modified timestamps for file loads) and evicts stale
//! instances from the [`FilterStore`] so the next lookup rebuilds them. It
//! also serves filters grouped by type and sorted by order, caching each group
//! until a filter of that type is inserted or evicted.
//!
//! Writers mutate the store first and invalidate the cached group second. A rebuild that
//! overlaps a write notices the bumped cache generation and withdraws the group it cached, so
//! a stale group can be served to the racing reader but is never kept.
//!
//! All internal caches are `scc` maps so unrelated identities never contend
//! on a shared lock. Concurrent loads of the same identity may compile more
//! than once; the store slot always ends up holding one complete instance.
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::SystemTime,
};

use scc::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    core::filter::{ManagedFilter, compare_by_order},
    core::filter_file::FilterFile,
    metrics,
    ports::{
        compiler::{CompileError, CompiledArtifact, DynamicCodeCompiler},
        filter_factory::{FactoryError, FilterFactory},
        filter_store::FilterStore,
    },
};

/// Errors raised while loading a filter
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LoaderError {
    /// Error when the compiler rejects a filter source
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Error when the factory cannot instantiate a compiled filter
    #[error(transparent)]
    Instantiate(#[from] FactoryError),
}

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Ordered filters sharing one filter type.
pub type FilterGroup = Arc<Vec<Arc<ManagedFilter>>>;

/// Compiles, caches and groups filters. Construct once and share by reference (or `Arc`).
pub struct FilterLoader {
    compiler: Arc<dyn DynamicCodeCompiler>,
    factory: Arc<dyn FilterFactory>,
    store: Arc<dyn FilterStore>,
    filter_class_last_modified: HashMap<String, SystemTime>,
    filter_class_code: HashMap<String, String>,
    filter_check: HashSet<String>,
    filters_by_type_cache: HashMap<String, FilterGroup>,
    cache_generation: AtomicU64,
}

impl FilterLoader {
    /// Create a loader over the given collaborators.
    pub fn new(
        compiler: Arc<dyn DynamicCodeCompiler>,
        factory: Arc<dyn FilterFactory>,
        store: Arc<dyn FilterStore>,
    ) -> Self {
        Self {
            compiler,
            factory,
            store,
            filter_class_last_modified: HashMap::new(),
            filter_class_code: HashMap::new(),
            filter_check: HashSet::new(),
            filters_by_type_cache: HashMap::new(),
            cache_generation: AtomicU64::new(0),
        }
    }

    /// The store this loader registers filters in.
    pub fn store(&self) -> &Arc<dyn FilterStore> {
        &self.store
    }

    /// Resolve the filter named `name` from source text.
    ///
    /// The first lookup of a name always evicts whatever the store holds for it so a fresh
    /// compile happens. Later lookups evict only when `code` differs from the source recorded
    /// by the previous lookup. A stored instance is returned as is; otherwise the source is
    /// compiled and instantiated. The new instance is **not** registered in the store, use
    /// [`register_filter`](Self::register_filter) for that. Returns `None` when the
    /// compiled definition is abstract.
    pub async fn load_from_source(
        &self,
        code: &str,
        name: &str,
    ) -> LoaderResult<Option<Arc<ManagedFilter>>> {
        let first_lookup = self.filter_check.insert_async(name.to_string()).await.is_ok();
        let changed = self
            .filter_class_code
            .read_async(name, |_, recorded| recorded != code)
            .await
            .unwrap_or(true);

        if first_lookup || changed {
            info!(filter = name, "Reloading filter code");
            self.evict(name).await;
        }

        let _ = self
            .filter_class_code
            .upsert_async(name.to_string(), code.to_string())
            .await;

        if let Some(filter) = self.store.get(name).await {
            return Ok(Some(filter));
        }

        let artifact = self.compiler.compile(code, name)?;
        self.instantiate(artifact.as_ref())
    }

    /// Load the filter defined by `file` and register it in the store.
    ///
    /// Returns `true` when a filter was (re)compiled and registered by this call, `false` when
    /// the store already held an up-to-date instance or the file defines an abstract filter.
    pub async fn load_from_file(&self, file: &FilterFile) -> LoaderResult<bool> {
        let identity = file.identity();
        let current = file.last_modified();

        let modified = self
            .filter_class_last_modified
            .read_async(&identity, |_, recorded| *recorded != current)
            .await
            .unwrap_or(false);
        if modified {
            debug!(filter = %identity, "Filter file modified, reloading");
            self.evict(&identity).await;
        }

        if self.store.get(&identity).await.is_some() {
            return Ok(false);
        }

        let artifact = self.compiler.compile_file(file)?;
        let Some(filter) = self.instantiate(artifact.as_ref())? else {
            return Ok(false);
        };

        self.register_filter(&identity, filter).await;
        let _ = self
            .filter_class_last_modified
            .upsert_async(identity.clone(), current)
            .await;
        info!(filter = %identity, "Filter registered from file");
        Ok(true)
    }

    /// Filters of `filter_type`, sorted by ascending order.
    ///
    /// Built by scanning the store on first access and served from cache until a filter of
    /// this type is inserted or evicted through the loader. Filters with equal order keep the
    /// relative position they had in the store snapshot.
    pub async fn filters_by_type(&self, filter_type: &str) -> FilterGroup {
        if let Some(group) = self
            .filters_by_type_cache
            .read_async(filter_type, |_, group| group.clone())
            .await
        {
            return group;
        }

        let generation = self.cache_generation.load(Ordering::SeqCst);
        let mut filters: Vec<Arc<ManagedFilter>> = self
            .store
            .all_filters()
            .await
            .into_iter()
            .filter(|filter| filter.filter_type() == filter_type)
            .collect();
        filters.sort_by(|a, b| compare_by_order(a, b));

        debug!(
            filter_type,
            count = filters.len(),
            "Rebuilt filter group"
        );

        let group = Arc::new(filters);
        let _ = self
            .filters_by_type_cache
            .insert_async(filter_type.to_string(), group.clone())
            .await;

        if self.cache_generation.load(Ordering::SeqCst) != generation {
            // A writer ran during the rebuild; the snapshot may predate it
            let _ = self
                .filters_by_type_cache
                .remove_if_async(filter_type, |cached| Arc::ptr_eq(cached, &group))
                .await;
        }
        group
    }

    /// Total number of filters in the store.
    pub fn total_filter_count(&self) -> usize {
        self.store.len()
    }

    /// Register an instance under `identity` and drop the cached group of its type.
    pub async fn register_filter(&self, identity: &str, filter: Arc<ManagedFilter>) {
        let filter_type = filter.filter_type().to_string();
        self.store.put(identity, filter).await;
        self.invalidate_type(&filter_type).await;
    }

    /// Remove the filter under `identity` and drop the cached group of its type.
    pub async fn remove_filter(&self, identity: &str) -> Option<Arc<ManagedFilter>> {
        self.evict(identity).await
    }

    async fn evict(&self, identity: &str) -> Option<Arc<ManagedFilter>> {
        let removed = self.store.remove(identity).await?;
        self.invalidate_type(removed.filter_type()).await;
        Some(removed)
    }

    async fn invalidate_type(&self, filter_type: &str) {
        self.cache_generation.fetch_add(1, Ordering::SeqCst);
        if self
            .filters_by_type_cache
            .remove_async(filter_type)
            .await
            .is_some()
        {
            debug!(filter_type, "Invalidated filter group");
        }
    }

    fn instantiate(
        &self,
        artifact: &dyn CompiledArtifact,
    ) -> LoaderResult<Option<Arc<ManagedFilter>>> {
        if !artifact.is_instantiable() {
            debug!(artifact = artifact.name(), "Skipping abstract filter");
            return Ok(None);
        }

        let filter = Arc::new(ManagedFilter::new(self.factory.instantiate(artifact)?));
        metrics::record_filter_load(filter.implementation_name(), filter.filter_type());
        Ok(Some(filter))
    }
}
