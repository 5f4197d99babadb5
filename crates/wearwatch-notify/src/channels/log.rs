use crate::error::{NotifyError, Result};
use crate::plugin::SinkPlugin;
use crate::OutputSink;
use async_trait::async_trait;
use serde_json::Value;
use wearwatch_common::types::{AlertLevel, OutputEvent};

/// Writes one structured tracing line per event.
pub struct LogSink {
    instance_id: String,
}

impl LogSink {
    pub fn new(instance_id: &str) -> Self {
        Self {
            instance_id: instance_id.to_string(),
        }
    }
}

#[async_trait]
impl OutputSink for LogSink {
    async fn send(&self, event: &OutputEvent) -> Result<()> {
        let sink = self.instance_id.as_str();
        match event {
            OutputEvent::Alert(alert) if alert.level >= AlertLevel::Critical => {
                tracing::warn!(
                    sink,
                    id = %alert.id,
                    component = %alert.component,
                    level = %alert.level,
                    "{}",
                    alert.message
                );
            }
            OutputEvent::Alert(alert) => {
                tracing::info!(
                    sink,
                    id = %alert.id,
                    component = %alert.component,
                    level = %alert.level,
                    "{}",
                    alert.message
                );
            }
            OutputEvent::AlertCleared { id, .. } => {
                tracing::info!(sink, id = %id, "Alert cleared");
            }
            OutputEvent::WearReport(report) => {
                tracing::info!(
                    sink,
                    overall_health = report.wear_state.overall_health,
                    runtime_hours = report.wear_state.runtime_hours,
                    active_alerts = report.alert_summary.total,
                    "Wear report"
                );
            }
            OutputEvent::ForecastReport(report) => {
                tracing::info!(
                    sink,
                    predictions = report.all_predictions.len(),
                    overall_health = report.overall_health,
                    estimated_cost = report.cost_estimate.total_estimated.average,
                    "Forecast report"
                );
            }
        }
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "log"
    }
}

pub struct LogPlugin;

impl SinkPlugin for LogPlugin {
    fn name(&self) -> &str {
        "log"
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        if config.is_null() || config.is_object() {
            Ok(())
        } else {
            Err(NotifyError::InvalidConfig(
                "log sink config must be a table".to_string(),
            ))
        }
    }

    fn create_sink(&self, instance_id: &str, _config: &Value) -> Result<Box<dyn OutputSink>> {
        Ok(Box::new(LogSink::new(instance_id)))
    }
}
