use crate::{AlertCandidate, AlertInput, AlertRule};
use wearwatch_common::types::{AlertLevel, ComponentStatus};

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Raises one alert per component whose status is not `good`.
pub struct ComponentHealthRule;

impl AlertRule for ComponentHealthRule {
    fn name(&self) -> &str {
        "component-health"
    }

    fn evaluate(&self, input: AlertInput<'_>) -> Vec<AlertCandidate> {
        let AlertInput::Wear(snapshot) = input else {
            return Vec::new();
        };
        snapshot
            .components
            .values()
            .filter_map(|view| {
                let name = view.name.as_str();
                let health = view.health_score;
                let (level, message) = match view.status {
                    ComponentStatus::Good => return None,
                    ComponentStatus::Failure => (
                        AlertLevel::Emergency,
                        format!(
                            "{} FAILURE! Health {health:.0}%. Immediate service required.",
                            name.to_uppercase()
                        ),
                    ),
                    ComponentStatus::Critical => (
                        AlertLevel::Critical,
                        format!(
                            "{} in critical condition. Health {health:.0}%. Schedule service.",
                            capitalize(name)
                        ),
                    ),
                    ComponentStatus::Warning => (
                        AlertLevel::Warning,
                        format!("{} needs attention. Health {health:.0}%.", capitalize(name)),
                    ),
                };
                Some(AlertCandidate::new(name, level, message).with("health_score", health))
            })
            .collect()
    }
}

/// Raises maintenance alerts when a countdown runs out or gets close.
pub struct MaintenanceDueRule {
    pub due_soon_hours: f64,
}

impl Default for MaintenanceDueRule {
    fn default() -> Self {
        Self {
            due_soon_hours: 10.0,
        }
    }
}

impl AlertRule for MaintenanceDueRule {
    fn name(&self) -> &str {
        "maintenance-due"
    }

    fn evaluate(&self, input: AlertInput<'_>) -> Vec<AlertCandidate> {
        let AlertInput::Wear(snapshot) = input else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for view in snapshot.components.values() {
            let name = view.name.as_str();
            let hours = view.hours_until_maintenance;
            if hours <= 0.0 {
                out.push(
                    AlertCandidate::new(
                        name,
                        AlertLevel::Critical,
                        format!("{} maintenance overdue. Schedule service immediately.", capitalize(name)),
                    )
                    .with("hours_overdue", hours.abs()),
                );
            } else if hours < self.due_soon_hours {
                out.push(
                    AlertCandidate::new(
                        name,
                        AlertLevel::Warning,
                        format!("{} maintenance due in {hours:.1} hours.", capitalize(name)),
                    )
                    .with("hours_until_maintenance", hours),
                );
            }
        }
        out
    }
}
