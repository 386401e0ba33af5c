use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// Live, externally updatable boolean bound to one property key.
///
/// Handles are cheap to clone; every clone observes the same underlying value, so a property
/// source can flip a flag after the handle was handed out and readers see it on their next
/// [`get`](DynamicBooleanProperty::get).
#[derive(Clone)]
pub struct DynamicBooleanProperty {
    name: Arc<str>,
    value: Arc<AtomicBool>,
}

impl DynamicBooleanProperty {
    /// Create a handle with its own backing value.
    pub fn new(name: impl Into<Arc<str>>, initial: bool) -> Self {
        Self::with_value(name, Arc::new(AtomicBool::new(initial)))
    }

    /// Create a handle over a shared backing value owned by a property source.
    pub fn with_value(name: impl Into<Arc<str>>, value: Arc<AtomicBool>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Current value of the property.
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    /// Update the value seen by every clone of this handle.
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Release);
    }

    /// The property key this handle is bound to.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for DynamicBooleanProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicBooleanProperty")
            .field("name", &self.name)
            .field("value", &self.get())
            .finish()
    }
}

/// PropertySource defines the port for the dynamic configuration backing filter disable flags
pub trait PropertySource: Send + Sync + 'static {
    /// Resolve a live boolean handle for `key`
    ///
    /// # Arguments
    /// * `key` - The property key, e.g. `zuul.AuthFilter.pre.disable`
    /// * `default` - Value to report while the property is unset
    fn boolean_property(&self, key: &str, default: bool) -> DynamicBooleanProperty;
}
