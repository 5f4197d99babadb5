pub mod telemetry;
pub mod wear;

use crate::AlertRule;
use wearwatch_common::thresholds::Thresholds;

/// The built-in rule set, parameterized by the configured thresholds.
pub fn default_rules(thresholds: &Thresholds) -> Vec<Box<dyn AlertRule>> {
    vec![
        Box::new(telemetry::RpmRule::from(&thresholds.engine)),
        Box::new(telemetry::CoolantRule::from(&thresholds.engine)),
        Box::new(telemetry::FuelRule::from(&thresholds.fuel)),
        Box::new(telemetry::VibrationRule::from(&thresholds.brakes)),
        Box::new(telemetry::TirePressureRule::from(&thresholds.tires)),
        Box::new(telemetry::AmbientHeatRule::from(&thresholds.battery)),
        Box::new(wear::ComponentHealthRule),
        Box::new(wear::MaintenanceDueRule::default()),
    ]
}
