//! Instantaneous rules over single engine or environment samples.
//!
//! Each rule checks its most severe band first, so one sample yields at most
//! one candidate per rule.

use crate::{AlertCandidate, AlertInput, AlertRule};
use wearwatch_common::thresholds::{
    BatteryThresholds, BrakeThresholds, EngineThresholds, FuelThresholds, TireThresholds,
};
use wearwatch_common::types::AlertLevel;

pub struct RpmRule {
    pub warning: f64,
    pub emergency: f64,
}

impl From<&EngineThresholds> for RpmRule {
    fn from(t: &EngineThresholds) -> Self {
        Self {
            warning: t.rpm_max,
            emergency: t.rpm_critical,
        }
    }
}

impl AlertRule for RpmRule {
    fn name(&self) -> &str {
        "engine-rpm"
    }

    fn evaluate(&self, input: AlertInput<'_>) -> Vec<AlertCandidate> {
        let AlertInput::Engine(sample) = input else {
            return Vec::new();
        };
        let rpm = sample.rpm;
        let candidate = if rpm > self.emergency {
            AlertCandidate::new(
                "engine",
                AlertLevel::Emergency,
                format!("Critical RPM: {rpm:.0} RPM. Risk of engine damage."),
            )
            .with("threshold", self.emergency)
        } else if rpm > self.warning {
            AlertCandidate::new(
                "engine",
                AlertLevel::Warning,
                format!("High RPM: {rpm:.0} RPM. Reduce engine speed."),
            )
            .with("threshold", self.warning)
        } else {
            return Vec::new();
        };
        vec![candidate.with("rpm", rpm)]
    }
}

pub struct CoolantRule {
    pub warning: f64,
    pub emergency: f64,
}

impl From<&EngineThresholds> for CoolantRule {
    fn from(t: &EngineThresholds) -> Self {
        Self {
            warning: t.coolant_temp_warning,
            emergency: t.coolant_temp_critical,
        }
    }
}

impl AlertRule for CoolantRule {
    fn name(&self) -> &str {
        "engine-coolant"
    }

    fn evaluate(&self, input: AlertInput<'_>) -> Vec<AlertCandidate> {
        let AlertInput::Engine(sample) = input else {
            return Vec::new();
        };
        let temp = sample.coolant_temp;
        let candidate = if temp > self.emergency {
            AlertCandidate::new(
                "engine",
                AlertLevel::Emergency,
                format!("Engine overheating: coolant at {temp:.1}°C. Stop the vehicle."),
            )
            .with("threshold", self.emergency)
        } else if temp > self.warning {
            AlertCandidate::new(
                "engine",
                AlertLevel::Warning,
                format!("Coolant temperature high: {temp:.1}°C. Overheating risk, monitor closely."),
            )
            .with("threshold", self.warning)
        } else {
            return Vec::new();
        };
        vec![candidate.with("coolant_temp", temp)]
    }
}

pub struct FuelRule {
    pub low: f64,
    pub critical: f64,
}

impl From<&FuelThresholds> for FuelRule {
    fn from(t: &FuelThresholds) -> Self {
        Self {
            low: t.low,
            critical: t.critical,
        }
    }
}

impl AlertRule for FuelRule {
    fn name(&self) -> &str {
        "fuel-level"
    }

    fn evaluate(&self, input: AlertInput<'_>) -> Vec<AlertCandidate> {
        let AlertInput::Engine(sample) = input else {
            return Vec::new();
        };
        let fuel = sample.fuel_level;
        // Critical is checked first; a critically low tank is not also "low".
        let candidate = if fuel < self.critical {
            AlertCandidate::new(
                "fuel",
                AlertLevel::Critical,
                format!("Fuel critically low: {fuel:.0}%. Risk of running out."),
            )
            .with("threshold", self.critical)
        } else if fuel < self.low {
            AlertCandidate::new(
                "fuel",
                AlertLevel::Warning,
                format!("Low fuel: {fuel:.0}%. Refuel soon."),
            )
            .with("threshold", self.low)
        } else {
            return Vec::new();
        };
        vec![candidate.with("fuel_level", fuel)]
    }
}

pub struct VibrationRule {
    pub warning: f64,
    pub critical: f64,
}

impl From<&BrakeThresholds> for VibrationRule {
    fn from(t: &BrakeThresholds) -> Self {
        Self {
            warning: t.vibration_warning,
            critical: t.vibration_critical,
        }
    }
}

impl AlertRule for VibrationRule {
    fn name(&self) -> &str {
        "brakes-vibration"
    }

    fn evaluate(&self, input: AlertInput<'_>) -> Vec<AlertCandidate> {
        let AlertInput::Environment(sample) = input else {
            return Vec::new();
        };
        let vibration = sample.vibration;
        let candidate = if vibration > self.critical {
            AlertCandidate::new(
                "brakes",
                AlertLevel::Critical,
                format!("Critical vibration: {vibration:.1}. Inspect brakes and tires."),
            )
            .with("threshold", self.critical)
        } else if vibration > self.warning {
            AlertCandidate::new(
                "brakes",
                AlertLevel::Warning,
                format!("High vibration: {vibration:.1}. Possible brake wear."),
            )
            .with("threshold", self.warning)
        } else {
            return Vec::new();
        };
        vec![candidate.with("vibration", vibration)]
    }
}

pub struct TirePressureRule {
    pub min: f64,
    pub max: f64,
}

impl From<&TireThresholds> for TirePressureRule {
    fn from(t: &TireThresholds) -> Self {
        Self {
            min: t.pressure_min,
            max: t.pressure_max,
        }
    }
}

impl AlertRule for TirePressureRule {
    fn name(&self) -> &str {
        "tires-pressure"
    }

    fn evaluate(&self, input: AlertInput<'_>) -> Vec<AlertCandidate> {
        let AlertInput::Environment(sample) = input else {
            return Vec::new();
        };
        let pressure = sample.pressure;
        let candidate = if pressure < self.min {
            AlertCandidate::new(
                "tires",
                AlertLevel::Warning,
                format!("Low tire pressure: {pressure:.1} kPa. Inspect tires."),
            )
            .with("threshold", self.min)
        } else if pressure > self.max {
            AlertCandidate::new(
                "tires",
                AlertLevel::Warning,
                format!("High tire pressure: {pressure:.1} kPa. Adjust pressure."),
            )
            .with("threshold", self.max)
        } else {
            return Vec::new();
        };
        vec![candidate.with("pressure", pressure)]
    }
}

pub struct AmbientHeatRule {
    pub max: f64,
}

impl From<&BatteryThresholds> for AmbientHeatRule {
    fn from(t: &BatteryThresholds) -> Self {
        Self { max: t.temp_max }
    }
}

impl AlertRule for AmbientHeatRule {
    fn name(&self) -> &str {
        "battery-ambient-heat"
    }

    fn evaluate(&self, input: AlertInput<'_>) -> Vec<AlertCandidate> {
        match input {
            AlertInput::Environment(sample) if sample.temperature > self.max => {
                let temp = sample.temperature;
                vec![AlertCandidate::new(
                    "battery",
                    AlertLevel::Info,
                    format!("High ambient temperature: {temp:.1}°C. May affect the battery."),
                )
                .with("temperature", temp)
                .with("threshold", self.max)]
            }
            _ => Vec::new(),
        }
    }
}
