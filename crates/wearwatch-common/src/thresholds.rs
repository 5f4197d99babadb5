//! Component thresholds and maintenance intervals shared by the wear model,
//! the forecaster and the alert rules.
//!
//! Every struct deserializes from a partial TOML table; missing keys keep the
//! built-in defaults.

use crate::types::Component;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub engine: EngineThresholds,
    pub brakes: BrakeThresholds,
    pub transmission: TransmissionThresholds,
    pub battery: BatteryThresholds,
    pub tires: TireThresholds,
    pub fuel: FuelThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineThresholds {
    pub rpm_max: f64,
    pub rpm_critical: f64,
    pub coolant_temp_warning: f64,
    pub coolant_temp_critical: f64,
    /// Throttle percentage above which the engine accrues aggressive-use stress.
    pub throttle_stress: f64,
    /// Throttle percentage counted as a high-throttle event by the forecaster.
    pub throttle_event: f64,
}

impl Default for EngineThresholds {
    fn default() -> Self {
        Self {
            rpm_max: 6500.0,
            rpm_critical: 7000.0,
            coolant_temp_warning: 100.0,
            coolant_temp_critical: 110.0,
            throttle_stress: 80.0,
            throttle_event: 85.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrakeThresholds {
    pub vibration_warning: f64,
    pub vibration_critical: f64,
    /// Speed drop (km/h) between consecutive engine samples that counts as hard braking.
    pub hard_braking_speed_drop: f64,
    /// Looser speed drop used for the forecaster's hard-braking event counter.
    pub hard_braking_event_drop: f64,
}

impl Default for BrakeThresholds {
    fn default() -> Self {
        Self {
            vibration_warning: 5.0,
            vibration_critical: 8.0,
            hard_braking_speed_drop: 20.0,
            hard_braking_event_drop: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionThresholds {
    pub rpm_speed_ratio_warning: f64,
    pub high_load_throttle: f64,
    pub high_load_rpm: f64,
}

impl Default for TransmissionThresholds {
    fn default() -> Self {
        Self {
            rpm_speed_ratio_warning: 100.0,
            high_load_throttle: 70.0,
            high_load_rpm: 4000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryThresholds {
    pub temp_min: f64,
    pub temp_max: f64,
}

impl Default for BatteryThresholds {
    fn default() -> Self {
        Self {
            temp_min: -10.0,
            temp_max: 45.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TireThresholds {
    pub pressure_min: f64,
    pub pressure_max: f64,
    pub vibration_warning: f64,
    pub high_speed: f64,
}

impl Default for TireThresholds {
    fn default() -> Self {
        Self {
            pressure_min: 95.0,
            pressure_max: 110.0,
            vibration_warning: 6.0,
            high_speed: 120.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelThresholds {
    pub low: f64,
    pub critical: f64,
}

impl Default for FuelThresholds {
    fn default() -> Self {
        Self {
            low: 15.0,
            critical: 5.0,
        }
    }
}

/// Service intervals, in operating hours, restored by a maintenance reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceIntervals {
    pub oil_change: f64,
    pub brake_inspection: f64,
    pub transmission_service: f64,
    pub tire_rotation: f64,
    pub battery_check: f64,
}

impl Default for MaintenanceIntervals {
    fn default() -> Self {
        Self {
            oil_change: 250.0,
            brake_inspection: 500.0,
            transmission_service: 1000.0,
            tire_rotation: 300.0,
            battery_check: 400.0,
        }
    }
}

impl MaintenanceIntervals {
    pub fn hours_for(&self, component: Component) -> f64 {
        match component {
            Component::Engine => self.oil_change,
            Component::Brakes => self.brake_inspection,
            Component::Transmission => self.transmission_service,
            Component::Tires => self.tire_rotation,
            Component::Battery => self.battery_check,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_table_keeps_defaults() {
        let t: Thresholds = serde_json::from_str(r#"{"engine": {"rpm_max": 6000}}"#).unwrap();
        assert_eq!(t.engine.rpm_max, 6000.0);
        assert_eq!(t.engine.rpm_critical, 7000.0);
        assert_eq!(t.tires.pressure_min, 95.0);
    }

    #[test]
    fn maintenance_interval_per_component() {
        let m = MaintenanceIntervals::default();
        assert_eq!(m.hours_for(Component::Engine), 250.0);
        assert_eq!(m.hours_for(Component::Battery), 400.0);
    }
}
