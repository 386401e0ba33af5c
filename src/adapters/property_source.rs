use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use scc::HashMap;
use tracing::info;

use crate::{
    config::models::EngineConfig,
    ports::property_source::{DynamicBooleanProperty, PropertySource},
};

/// In-process property source with live updates.
///
/// Every handle issued for a key shares one backing value, so [`set`](Self::set) is observed
/// by filters that resolved their disable binding long before the update.
#[derive(Default)]
pub struct InMemoryPropertySource {
    values: HashMap<String, Arc<AtomicBool>>,
}

impl InMemoryPropertySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the disable flags listed in the engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        let source = Self::new();
        for key in &config.disabled_filters {
            source.set(key, true);
        }
        source
    }

    /// Set `key` to `value`, creating the property if needed.
    pub fn set(&self, key: &str, value: bool) {
        info!(property = key, value, "Updating property");
        self.slot(key, value).store(value, Ordering::Release);
    }

    /// Current value of `key`, if it was ever set or resolved.
    pub fn get(&self, key: &str) -> Option<bool> {
        self.values
            .read_sync(key, |_, value| value.load(Ordering::Acquire))
    }

    fn slot(&self, key: &str, initial: bool) -> Arc<AtomicBool> {
        if let Some(existing) = self.values.read_sync(key, |_, value| value.clone()) {
            return existing;
        }

        self.values
            .entry_sync(key.to_string())
            .or_insert_with(|| Arc::new(AtomicBool::new(initial)))
            .get()
            .clone()
    }
}

impl PropertySource for InMemoryPropertySource {
    fn boolean_property(&self, key: &str, default: bool) -> DynamicBooleanProperty {
        DynamicBooleanProperty::with_value(key, self.slot(key, default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_property_uses_default() {
        let source = InMemoryPropertySource::new();
        let property = source.boolean_property("zuul.Auth.pre.disable", false);
        assert!(!property.get());
        assert_eq!(source.get("zuul.Auth.pre.disable"), Some(false));
    }

    #[test]
    fn test_set_is_visible_through_issued_handles() {
        let source = InMemoryPropertySource::new();
        let property = source.boolean_property("zuul.Auth.pre.disable", false);

        source.set("zuul.Auth.pre.disable", true);
        assert!(property.get());

        source.set("zuul.Auth.pre.disable", false);
        assert!(!property.get());
    }

    #[test]
    fn test_concurrent_resolution_shares_one_value() {
        let source = Arc::new(InMemoryPropertySource::new());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let source = source.clone();
                std::thread::spawn(move || source.boolean_property("zuul.Auth.pre.disable", false))
            })
            .collect();
        let handles: Vec<DynamicBooleanProperty> = threads
            .into_iter()
            .map(|thread| thread.join().unwrap())
            .collect();

        source.set("zuul.Auth.pre.disable", true);
        assert!(handles.iter().all(DynamicBooleanProperty::get));
    }

    #[test]
    fn test_from_config_seeds_disabled_filters() {
        let config = EngineConfig {
            disabled_filters: vec!["zuul.Auth.pre.disable".to_string()],
            ..EngineConfig::default()
        };
        let source = InMemoryPropertySource::from_config(&config);

        assert!(source.boolean_property("zuul.Auth.pre.disable", false).get());
        assert!(!source.boolean_property("zuul.Other.pre.disable", false).get());
    }
}
