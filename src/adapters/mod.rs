pub mod filter_directory;
pub mod memory_store;
pub mod native_compiler;
pub mod property_source;
pub mod tracer;
pub mod usage_notifier;

/// Re-export commonly used types from adapters
pub use filter_directory::{FilterDirectoryPoller, ScanReport};
pub use memory_store::InMemoryFilterStore;
pub use native_compiler::{DefaultFilterFactory, FilterBlueprint, NativeFilterCompiler};
pub use property_source::InMemoryPropertySource;
pub use tracer::{NoopTracer, TracingTracer};
pub use usage_notifier::MetricsUsageNotifier;
