pub mod compiler;
pub mod filter_factory;
pub mod filter_store;
pub mod property_source;
pub mod tracer;
pub mod usage_notifier;

pub use compiler::{CompileError, CompileResult, CompiledArtifact, DynamicCodeCompiler};
pub use filter_factory::{FactoryError, FactoryResult, FilterFactory};
pub use filter_store::FilterStore;
pub use property_source::{DynamicBooleanProperty, PropertySource};
pub use tracer::{TraceSpan, Tracer};
pub use usage_notifier::FilterUsageNotifier;
