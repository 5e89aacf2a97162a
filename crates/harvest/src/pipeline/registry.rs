use std::collections::BTreeMap;

use super::error::PipelineError;
use super::plugin::ProcessorPlugin;
use super::plugins::{DropIfFieldEmpty, FieldCoverageAnalytics, PassThrough};

type PluginFactory = Box<dyn Fn() -> Box<dyn ProcessorPlugin>>;

/// Maps plugin names to constructors.
///
/// Built explicitly and handed to the runner, so tests can assemble their own.
#[derive(Default)]
pub struct PluginRegistry {
    factories: BTreeMap<String, PluginFactory>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with `pass_through`, `drop_if_field_empty` and
    /// `field_coverage_analytics`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert("pass_through", || Box::new(PassThrough));
        registry.insert("drop_if_field_empty", || Box::new(DropIfFieldEmpty));
        registry.insert("field_coverage_analytics", || {
            Box::new(FieldCoverageAnalytics)
        });
        registry
    }

    fn insert<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn ProcessorPlugin> + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Registers (or replaces) a plugin constructor under `name`.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), PipelineError>
    where
        F: Fn() -> Box<dyn ProcessorPlugin> + 'static,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(PipelineError::EmptyPluginName);
        }
        self.insert(name, factory);
        Ok(())
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn ProcessorPlugin>, PipelineError> {
        let factory =
            self.factories
                .get(name.trim())
                .ok_or_else(|| PipelineError::UnknownPlugin {
                    name: name.to_string(),
                    known: self.names().join(", "),
                })?;
        Ok(factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name.trim())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}
