//! Alert engine for vehicle telemetry and wear state.
//!
//! Registered [`AlertRule`] implementations turn a single input (an engine
//! sample, an environment sample or a wear snapshot) into alert candidates.
//! The [`engine::AlertEngine`] rate-limits candidates per `(component, level)`
//! key, assigns ids and keeps the active map and the history log.

pub mod engine;
pub mod rules;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use wearwatch_common::types::{AlertLevel, EngineSample, EnvironmentSample, WearSnapshot};

/// What a rule is evaluated against.
#[derive(Debug, Clone, Copy)]
pub enum AlertInput<'a> {
    Engine(&'a EngineSample),
    Environment(&'a EnvironmentSample),
    Wear(&'a WearSnapshot),
}

/// An alert a rule would like to raise, before cooldown and id assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCandidate {
    pub component: String,
    pub level: AlertLevel,
    pub message: String,
    pub data: BTreeMap<String, f64>,
}

impl AlertCandidate {
    pub fn new(component: impl Into<String>, level: AlertLevel, message: String) -> Self {
        Self {
            component: component.into(),
            level,
            message,
            data: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }
}

/// A rule that inspects one input and proposes zero or more alerts.
///
/// Rules ignore inputs they do not understand. Deduplication is the
/// engine's job, not the rule's.
pub trait AlertRule: Send + Sync {
    /// Short identifier used in logs (e.g. `"engine-rpm"`).
    fn name(&self) -> &str;

    fn evaluate(&self, input: AlertInput<'_>) -> Vec<AlertCandidate>;
}
