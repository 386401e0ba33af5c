//! Natively linked filter definitions.
//!
//! Rust filters are compiled ahead of time, so "compiling" a filter at runtime means
//! resolving a registered constructor. [`NativeFilterCompiler`] keeps a registry of
//! [`FilterBlueprint`]s, resolved by filter name for source loads and by file stem for file
//! loads. [`DefaultFilterFactory`] turns a blueprint into a fresh instance.
use std::{any::Any, fmt, sync::Arc};

use scc::HashMap;
use tracing::debug;

use crate::{
    core::{filter::Filter, filter_file::FilterFile},
    ports::{
        compiler::{CompileError, CompileResult, CompiledArtifact, DynamicCodeCompiler},
        filter_factory::{FactoryError, FactoryResult, FilterFactory},
    },
};

type Constructor = Arc<dyn Fn() -> Box<dyn Filter> + Send + Sync>;

/// A named filter definition; abstract blueprints have no constructor.
#[derive(Clone)]
pub struct FilterBlueprint {
    name: String,
    constructor: Option<Constructor>,
}

impl FilterBlueprint {
    /// Blueprint producing a new instance from `constructor` each time it is instantiated.
    pub fn new<F, C>(name: impl Into<String>, constructor: C) -> Self
    where
        F: Filter,
        C: Fn() -> F + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            constructor: Some(Arc::new(move || Box::new(constructor()) as Box<dyn Filter>)),
        }
    }

    /// Blueprint for a definition that cannot be instantiated on its own.
    pub fn abstract_definition(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructor: None,
        }
    }

    /// Build a new instance, or `None` for abstract definitions.
    pub fn build(&self) -> Option<Box<dyn Filter>> {
        self.constructor.as_ref().map(|constructor| constructor())
    }
}

impl fmt::Debug for FilterBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterBlueprint")
            .field("name", &self.name)
            .field("abstract", &self.constructor.is_none())
            .finish()
    }
}

impl CompiledArtifact for FilterBlueprint {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_instantiable(&self) -> bool {
        self.constructor.is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Compiler resolving filters from a registry of natively linked blueprints.
#[derive(Default)]
pub struct NativeFilterCompiler {
    blueprints: HashMap<String, FilterBlueprint>,
}

impl NativeFilterCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a blueprint under its name.
    pub fn register(&self, blueprint: FilterBlueprint) {
        debug!(blueprint = %blueprint.name, "Registering filter blueprint");
        let _ = self.blueprints.upsert_sync(blueprint.name.clone(), blueprint);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(self, blueprint: FilterBlueprint) -> Self {
        self.register(blueprint);
        self
    }

    fn resolve(&self, name: &str) -> CompileResult<Box<dyn CompiledArtifact>> {
        self.blueprints
            .read_sync(name, |_, blueprint| blueprint.clone())
            .map(|blueprint| Box::new(blueprint) as Box<dyn CompiledArtifact>)
            .ok_or_else(|| CompileError::UnknownFilter(name.to_string()))
    }
}

impl DynamicCodeCompiler for NativeFilterCompiler {
    fn compile(&self, _code: &str, name: &str) -> CompileResult<Box<dyn CompiledArtifact>> {
        self.resolve(name)
    }

    fn compile_file(&self, file: &FilterFile) -> CompileResult<Box<dyn CompiledArtifact>> {
        self.resolve(&file.file_stem())
    }
}

/// Factory instantiating [`FilterBlueprint`] artifacts.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFilterFactory;

impl FilterFactory for DefaultFilterFactory {
    fn instantiate(&self, artifact: &dyn CompiledArtifact) -> FactoryResult<Box<dyn Filter>> {
        let blueprint = artifact
            .as_any()
            .downcast_ref::<FilterBlueprint>()
            .ok_or_else(|| FactoryError::UnsupportedArtifact(artifact.name().to_string()))?;
        blueprint
            .build()
            .ok_or_else(|| FactoryError::NotInstantiable(blueprint.name.clone()))
    }
}
