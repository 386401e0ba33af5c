//! zuul-filters - the filter-chain engine of an edge gateway.
//!
//! The crate dynamically loads, caches, groups and executes request-processing units
//! ("filters") implementing pre-routing, routing, post-routing and error handling behaviour.
//! Filters whose source changes are evicted and rebuilt on the next lookup without restarting
//! the process, filters of one type are served in a deterministic order, and every filter runs
//! isolated so that its failure or disablement never reaches the caller as a fault.
//!
//! # Quick Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use zuul_filters::{
//!     adapters::{
//!         DefaultFilterFactory, InMemoryFilterStore, InMemoryPropertySource,
//!         MetricsUsageNotifier, NativeFilterCompiler, TracingTracer,
//!     },
//!     core::{FilterLoader, FilterProcessor, FilterRuntime},
//! };
//!
//! # #[tokio::main] async fn main() -> eyre::Result<()> {
//! let loader = Arc::new(FilterLoader::new(
//!     Arc::new(NativeFilterCompiler::new()),
//!     Arc::new(DefaultFilterFactory),
//!     Arc::new(InMemoryFilterStore::new()),
//! ));
//! let runtime = FilterRuntime::new(
//!     Arc::new(InMemoryPropertySource::new()),
//!     Arc::new(TracingTracer),
//! );
//! let processor = FilterProcessor::new(loader, runtime, Arc::new(MetricsUsageNotifier::new()));
//! let report = processor.run_filters("pre").await;
//! assert!(report.failures().next().is_none());
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! Engine logic lives in `core`. Everything the engine consumes from its host (compiler,
//! factory, store, dynamic properties, tracer, usage notifier) is a trait in `ports`, with
//! default implementations in `adapters`. No global state is involved: the loader and runtime
//! are explicit context objects built from injected collaborators.
//!
//! # Error Handling
//! Load-time failures (compilation, instantiation) surface as [`core::LoaderError`] from the
//! loader. Run-time failures of filter bodies never propagate; they become
//! [`core::FilterResult::Failed`].
//!
//! # Concurrency & Data Structures
//! Shared maps are `scc::HashMap`s, and per-filter disable bindings are `arc_swap` cells, so
//! request threads calling into the engine concurrently never serialise on a global lock.
pub mod config;
pub mod metrics;
pub mod ports;
pub mod tracing_setup;

pub mod adapters;
pub mod core;

pub use crate::{
    core::{
        ExecutionStatus, Filter, FilterFile, FilterLoader, FilterProcessor, FilterResult,
        FilterRuntime, ManagedFilter,
    },
    ports::{
        DynamicCodeCompiler, FilterFactory, FilterStore, FilterUsageNotifier, PropertySource,
        Tracer,
    },
};
