use std::{any::Any, fmt};

use thiserror::Error;

use crate::core::filter_file::FilterFile;

/// Error type for filter compilation
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CompileError {
    /// Error when the source does not define a usable filter
    #[error("Failed to compile filter '{name}': {message}")]
    InvalidSource { name: String, message: String },

    /// Error when no filter is known under the requested name
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    /// Error when reading a filter file fails
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Output of a compiler, ready to be handed to a
/// [`FilterFactory`](super::filter_factory::FilterFactory).
pub trait CompiledArtifact: Send + Sync + fmt::Debug + 'static {
    /// Name of the compiled filter definition
    fn name(&self) -> &str;

    /// Whether the factory can produce an instance; abstract definitions report false
    fn is_instantiable(&self) -> bool;

    /// Access to the concrete artifact type for factories that downcast
    fn as_any(&self) -> &dyn Any;
}

/// DynamicCodeCompiler defines the port for turning filter sources into artifacts
pub trait DynamicCodeCompiler: Send + Sync + 'static {
    /// Compile filter source text
    ///
    /// # Arguments
    /// * `code` - The filter source
    /// * `name` - The name the filter is loaded under
    fn compile(&self, code: &str, name: &str) -> CompileResult<Box<dyn CompiledArtifact>>;

    /// Compile the filter defined by a file
    fn compile_file(&self, file: &FilterFile) -> CompileResult<Box<dyn CompiledArtifact>>;
}
