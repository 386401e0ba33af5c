pub mod filter;
pub mod filter_file;
pub mod loader;
pub mod processor;
pub mod result;
pub mod runtime;

pub use filter::{Filter, ManagedFilter, compare_by_order};
pub use filter_file::FilterFile;
pub use loader::{FilterGroup, FilterLoader, LoaderError, LoaderResult};
pub use processor::{ChainReport, FilterExecution, FilterProcessor};
pub use result::{ExecutionStatus, FilterPayload, FilterResult};
pub use runtime::{FilterRuntime, TRACE_PREFIX};
