use crate::config::OutputConfig;
use anyhow::Context;
use wearwatch_notify::manager::Dispatcher;
use wearwatch_notify::plugin::SinkRegistry;
use wearwatch_notify::routing::SinkRoute;

/// Builds one sink per `[[output.sinks]]` entry, each routed by its minimum level.
pub fn build_dispatcher(config: &OutputConfig, registry: &SinkRegistry) -> anyhow::Result<Dispatcher> {
    let mut sinks = Vec::with_capacity(config.sinks.len());
    let mut routes = Vec::with_capacity(config.sinks.len());
    for (index, sink) in config.sinks.iter().enumerate() {
        let instance_id = format!("{}-{index}", sink.sink_type);
        let created = registry
            .create_sink(&sink.sink_type, &instance_id, &sink.config)
            .with_context(|| {
                format!(
                    "Invalid output sink #{index} ({}); available types: {}",
                    sink.sink_type,
                    registry.plugin_names().join(", ")
                )
            })?;
        tracing::info!(sink = %instance_id, min_level = %sink.min_level, "Output sink configured");
        sinks.push(created);
        routes.push(SinkRoute {
            min_level: sink.min_level,
            sink_index: index,
        });
    }
    Ok(Dispatcher::new(sinks, routes))
}
