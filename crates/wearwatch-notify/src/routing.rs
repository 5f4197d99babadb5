use wearwatch_common::types::{AlertLevel, OutputEvent};

/// Sends alerts at or above `min_level` to the sink at `sink_index`.
/// Snapshots and clear notices always pass.
pub struct SinkRoute {
    pub min_level: AlertLevel,
    pub sink_index: usize,
}

impl SinkRoute {
    pub fn should_send(&self, event: &OutputEvent) -> bool {
        match event.alert_level() {
            Some(level) => level >= self.min_level,
            None => true,
        }
    }
}
