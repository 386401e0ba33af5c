use thiserror::Error;

use crate::{core::filter::Filter, ports::compiler::CompiledArtifact};

/// Error type for filter instantiation
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FactoryError {
    /// Error when the factory does not understand the artifact type
    #[error("Unsupported artifact '{0}'")]
    UnsupportedArtifact(String),

    /// Error when an abstract artifact is handed to the factory
    #[error("Artifact '{0}' is not instantiable")]
    NotInstantiable(String),
}

/// Result type for filter instantiation
pub type FactoryResult<T> = Result<T, FactoryError>;

/// FilterFactory defines the port for creating filter instances from compiled artifacts
pub trait FilterFactory: Send + Sync + 'static {
    /// Create a new filter instance
    fn instantiate(&self, artifact: &dyn CompiledArtifact) -> FactoryResult<Box<dyn Filter>>;
}
