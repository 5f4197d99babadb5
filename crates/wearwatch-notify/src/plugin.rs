use crate::error::{NotifyError, Result};
use crate::OutputSink;
use serde_json::Value;
use std::collections::HashMap;

/// Factory for [`OutputSink`]s built from a JSON config blob.
pub trait SinkPlugin: Send + Sync {
    /// Plugin type name, matched against the `type` key of a sink config.
    fn name(&self) -> &str;

    fn validate_config(&self, config: &Value) -> Result<()>;

    fn create_sink(&self, instance_id: &str, config: &Value) -> Result<Box<dyn OutputSink>>;
}

/// Registry of available [`SinkPlugin`]s.
///
/// # Examples
///
/// ```
/// use wearwatch_notify::plugin::SinkRegistry;
///
/// let registry = SinkRegistry::default();
/// assert!(registry.has_plugin("log"));
/// assert!(registry.has_plugin("jsonl"));
/// assert!(!registry.has_plugin("nonexistent"));
/// ```
pub struct SinkRegistry {
    plugins: HashMap<String, Box<dyn SinkPlugin>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    pub fn register(&mut self, plugin: Box<dyn SinkPlugin>) {
        let name = plugin.name().to_string();
        self.plugins.insert(name, plugin);
    }

    pub fn create_sink(
        &self,
        type_name: &str,
        instance_id: &str,
        config: &Value,
    ) -> Result<Box<dyn OutputSink>> {
        let plugin = self
            .plugins
            .get(type_name)
            .ok_or_else(|| NotifyError::UnknownSinkType(type_name.to_string()))?;
        plugin.validate_config(config)?;
        plugin.create_sink(instance_id, config)
    }

    pub fn has_plugin(&self, type_name: &str) -> bool {
        self.plugins.contains_key(type_name)
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::channels::log::LogPlugin));
        registry.register(Box::new(crate::channels::jsonl::JsonlPlugin));
        registry
    }
}
