//! The filter capability and the live instance wrapper held by the store.
//!
//! Implementors write a [`Filter`]; the loader wraps every instance it produces in a
//! [`ManagedFilter`], which owns the per-instance state the engine needs (the lazily
//! resolved disablement binding) without burdening implementors with it.
use std::{cmp::Ordering, fmt, sync::Arc};

use arc_swap::ArcSwapOption;

use crate::{
    core::result::FilterPayload,
    ports::property_source::{DynamicBooleanProperty, PropertySource},
};

/// Conventional filter types. Any other string is a valid type too.
pub mod types {
    /// Pre-routing filters.
    pub const PRE: &str = "pre";
    /// Filters that route the request to an origin.
    pub const ROUTE: &str = "route";
    /// Post-routing filters.
    pub const POST: &str = "post";
    /// Error handling filters.
    pub const ERROR: &str = "error";
    /// Filters producing static responses.
    pub const STATIC: &str = "static";
}

/// Behavioural contract of a request-processing filter.
pub trait Filter: Send + Sync + 'static {
    /// Classification used to group filters invoked together, see [`types`].
    fn filter_type(&self) -> &str;

    /// Priority within the filter type; lower values run first. Orders need not be unique
    /// or sequential.
    fn filter_order(&self) -> i32;

    /// Static filters carry no per-request state. Informational only.
    fn is_static(&self) -> bool {
        true
    }

    /// Whether [`run`](Filter::run) should be invoked for the current request.
    fn should_run(&self) -> bool;

    /// The filter body.
    fn run(&self) -> eyre::Result<FilterPayload>;

    /// Unqualified name of the implementing type, e.g. `AuthFilter`.
    fn implementation_name(&self) -> &str {
        simple_type_name(std::any::type_name::<Self>())
    }

    /// Name of the property that disables this filter:
    /// `zuul.<implementation name>.<filter type>.disable`.
    fn disable_property_key(&self) -> String {
        format!(
            "zuul.{}.{}.disable",
            self.implementation_name(),
            self.filter_type()
        )
    }
}

/// Strip the module path and any generic arguments from a `std::any::type_name` string.
pub fn simple_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Comparator ordering filters by ascending [`Filter::filter_order`].
pub fn compare_by_order(a: &ManagedFilter, b: &ManagedFilter) -> Ordering {
    a.filter_order().cmp(&b.filter_order())
}

/// A live filter instance as owned by the filter store.
pub struct ManagedFilter {
    inner: Box<dyn Filter>,
    disabled_ref: ArcSwapOption<DynamicBooleanProperty>,
}

impl ManagedFilter {
    pub fn new(inner: Box<dyn Filter>) -> Self {
        Self {
            inner,
            disabled_ref: ArcSwapOption::empty(),
        }
    }

    /// Wrap a concrete filter and share it.
    pub fn shared<F: Filter>(filter: F) -> Arc<Self> {
        Arc::new(Self::new(Box::new(filter)))
    }

    pub fn filter_type(&self) -> &str {
        self.inner.filter_type()
    }

    pub fn filter_order(&self) -> i32 {
        self.inner.filter_order()
    }

    pub fn is_static(&self) -> bool {
        self.inner.is_static()
    }

    pub fn should_run(&self) -> bool {
        self.inner.should_run()
    }

    pub fn run(&self) -> eyre::Result<FilterPayload> {
        self.inner.run()
    }

    pub fn implementation_name(&self) -> &str {
        self.inner.implementation_name()
    }

    pub fn disable_property_key(&self) -> String {
        self.inner.disable_property_key()
    }

    /// The wrapped filter.
    pub fn inner(&self) -> &dyn Filter {
        self.inner.as_ref()
    }

    /// Binding to this instance's disable property.
    ///
    /// The binding is resolved against `properties` on first use and reused afterwards.
    /// Concurrent first calls may each resolve a handle; the first one stored wins and all
    /// callers get that one.
    pub fn disabled_binding(&self, properties: &dyn PropertySource) -> Arc<DynamicBooleanProperty> {
        if let Some(binding) = self.disabled_ref.load_full() {
            return binding;
        }

        let resolved = Arc::new(properties.boolean_property(&self.disable_property_key(), false));
        let unset: Option<Arc<DynamicBooleanProperty>> = None;
        let previous = self
            .disabled_ref
            .compare_and_swap(&unset, Some(resolved.clone()));

        match &*previous {
            Some(existing) => existing.clone(),
            None => resolved,
        }
    }

    /// Whether the disable property is currently set. The value is read live on every call.
    pub fn is_disabled(&self, properties: &dyn PropertySource) -> bool {
        self.disabled_binding(properties).get()
    }

    /// The already resolved disablement binding, if any.
    pub fn resolved_binding(&self) -> Option<Arc<DynamicBooleanProperty>> {
        self.disabled_ref.load_full()
    }
}

impl fmt::Debug for ManagedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedFilter")
            .field("name", &self.implementation_name())
            .field("type", &self.filter_type())
            .field("order", &self.filter_order())
            .finish()
    }
}
