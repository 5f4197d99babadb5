//! Cumulative wear model.
//!
//! Each sample turns threshold violations into an instantaneous stress score per
//! component. Stress integrates over the elapsed time since the previous sample
//! of the same stream and is normalized into a wear percentage.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use wearwatch_common::thresholds::{MaintenanceIntervals, Thresholds};
use wearwatch_common::types::{
    round_to, Component, ComponentStatus, ComponentWearView, EngineSample, EnvironmentSample,
    WearSnapshot,
};

/// Stress-seconds per wear percentage point for mechanical components.
pub const MECHANICAL_NORMALIZATION: f64 = 36_000.0;
/// Battery stress accrues per sample rather than per second, hence the smaller scale.
pub const BATTERY_NORMALIZATION: f64 = 1_000.0;
pub const BATTERY_STRESS_PER_SAMPLE: f64 = 0.1;
pub const HARD_BRAKING_PENALTY: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct ComponentWearState {
    pub name: Component,
    pub wear_percentage: f64,
    pub health_score: f64,
    pub accumulated_stress: f64,
    pub hours_until_maintenance: f64,
    pub last_maintenance: Option<DateTime<Utc>>,
}

impl ComponentWearState {
    fn new(name: Component, hours_until_maintenance: f64) -> Self {
        Self {
            name,
            wear_percentage: 0.0,
            health_score: 100.0,
            accumulated_stress: 0.0,
            hours_until_maintenance,
            last_maintenance: None,
        }
    }

    fn normalization(&self) -> f64 {
        match self.name {
            Component::Battery => BATTERY_NORMALIZATION,
            _ => MECHANICAL_NORMALIZATION,
        }
    }

    /// Adds stress and recomputes wear and health. Negative input is ignored.
    fn accumulate(&mut self, stress: f64) {
        if stress > 0.0 && stress.is_finite() {
            self.accumulated_stress += stress;
        }
        self.wear_percentage = (self.accumulated_stress / self.normalization()).clamp(0.0, 100.0);
        self.health_score = (100.0 - self.wear_percentage).clamp(0.0, 100.0);
    }

    pub fn status(&self) -> ComponentStatus {
        ComponentStatus::from_health(self.health_score)
    }

    pub fn view(&self) -> ComponentWearView {
        ComponentWearView {
            name: self.name,
            wear_percentage: round_to(self.wear_percentage, 2),
            health_score: round_to(self.health_score, 2),
            accumulated_stress: round_to(self.accumulated_stress, 2),
            hours_until_maintenance: round_to(self.hours_until_maintenance, 1),
            last_maintenance: self.last_maintenance,
            status: self.status(),
        }
    }
}

/// Seconds spent beyond a threshold, per condition.
#[derive(Debug, Clone, Default)]
pub struct ExposureTotals {
    pub high_rpm_seconds: f64,
    pub overheating_seconds: f64,
    pub high_vibration_seconds: f64,
    pub pressure_anomaly_seconds: f64,
}

pub struct WearTracker {
    thresholds: Thresholds,
    intervals: MaintenanceIntervals,
    components: BTreeMap<Component, ComponentWearState>,
    last_engine: Option<EngineSample>,
    /// Latest engine timestamp seen; late samples never move it backwards.
    last_engine_at: Option<DateTime<Utc>>,
    last_environment_at: Option<DateTime<Utc>>,
    hard_braking_count: u64,
    runtime_hours: f64,
    exposure: ExposureTotals,
}

fn elapsed_secs(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match previous {
        // Clock skew or reordering never subtracts wear.
        Some(prev) => ((now - prev).num_milliseconds() as f64 / 1000.0).max(0.0),
        None => 0.0,
    }
}

fn latest(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    previous.map_or(now, |prev| prev.max(now))
}

impl WearTracker {
    pub fn new(thresholds: Thresholds, intervals: MaintenanceIntervals) -> Self {
        let components = Component::ALL
            .iter()
            .map(|&c| (c, ComponentWearState::new(c, intervals.hours_for(c))))
            .collect();
        Self {
            thresholds,
            intervals,
            components,
            last_engine: None,
            last_engine_at: None,
            last_environment_at: None,
            hard_braking_count: 0,
            runtime_hours: 0.0,
            exposure: ExposureTotals::default(),
        }
    }

    /// Engine/OBD sample: engine and transmission stress, hard braking,
    /// runtime and maintenance countdowns.
    pub fn process_engine(&mut self, sample: &EngineSample) {
        let dt = elapsed_secs(self.last_engine_at, sample.timestamp);
        let dt_hours = dt / 3600.0;
        self.runtime_hours += dt_hours;

        let engine_stress = self.engine_stress(sample, dt);
        self.component_mut(Component::Engine).accumulate(engine_stress * dt);

        let transmission_stress = self.transmission_stress(sample);
        self.component_mut(Component::Transmission)
            .accumulate(transmission_stress * dt);

        if let Some(prev) = &self.last_engine {
            if prev.speed - sample.speed > self.thresholds.brakes.hard_braking_speed_drop {
                self.hard_braking_count += 1;
                tracing::debug!(
                    from = prev.speed,
                    to = sample.speed,
                    count = self.hard_braking_count,
                    "Hard braking detected"
                );
            }
        }

        for state in self.components.values_mut() {
            state.hours_until_maintenance = (state.hours_until_maintenance - dt_hours).max(0.0);
        }

        self.last_engine = Some(sample.clone());
        self.last_engine_at = Some(latest(self.last_engine_at, sample.timestamp));
    }

    /// Environment sample: brakes, tires and battery.
    pub fn process_environment(&mut self, sample: &EnvironmentSample) {
        let dt = elapsed_secs(self.last_environment_at, sample.timestamp);

        let brakes = &self.thresholds.brakes;
        let mut brake_stress = 0.0;
        if sample.vibration > brakes.vibration_warning {
            self.exposure.high_vibration_seconds += dt;
            brake_stress += 0.4;
        }
        if sample.vibration > brakes.vibration_critical {
            brake_stress += 0.6;
        }
        let braking_penalty = self.hard_braking_count as f64 * HARD_BRAKING_PENALTY;
        self.component_mut(Component::Brakes)
            .accumulate(brake_stress * dt + braking_penalty);

        let tire_stress = self.tire_stress(sample, dt);
        self.component_mut(Component::Tires).accumulate(tire_stress * dt);

        let battery = &self.thresholds.battery;
        let battery_stress =
            if sample.temperature < battery.temp_min || sample.temperature > battery.temp_max {
                BATTERY_STRESS_PER_SAMPLE
            } else {
                0.0
            };
        self.component_mut(Component::Battery).accumulate(battery_stress);

        self.last_environment_at = Some(latest(self.last_environment_at, sample.timestamp));
    }

    fn engine_stress(&mut self, sample: &EngineSample, dt: f64) -> f64 {
        let t = &self.thresholds.engine;
        let mut stress = 0.0;
        if sample.rpm > t.rpm_max {
            self.exposure.high_rpm_seconds += dt;
            stress += 0.5;
        }
        if sample.rpm > t.rpm_critical {
            stress += 0.5;
        }
        if sample.coolant_temp > t.coolant_temp_warning {
            self.exposure.overheating_seconds += dt;
            stress += 0.3;
        }
        if sample.coolant_temp > t.coolant_temp_critical {
            stress += 0.7;
        }
        if sample.throttle > t.throttle_stress {
            stress += 0.2;
        }
        stress
    }

    fn transmission_stress(&self, sample: &EngineSample) -> f64 {
        let t = &self.thresholds.transmission;
        let mut stress = 0.0;
        // Ratio is undefined while stationary.
        if sample.speed > 0.0 && sample.rpm / sample.speed > t.rpm_speed_ratio_warning {
            stress += 0.5;
        }
        if sample.throttle > t.high_load_throttle && sample.rpm > t.high_load_rpm {
            stress += 0.3;
        }
        stress
    }

    fn tire_stress(&mut self, sample: &EnvironmentSample, dt: f64) -> f64 {
        let t = &self.thresholds.tires;
        let mut stress = 0.0;
        if sample.pressure < t.pressure_min || sample.pressure > t.pressure_max {
            self.exposure.pressure_anomaly_seconds += dt;
            stress += 0.4;
        }
        if sample.vibration > t.vibration_warning {
            stress += 0.3;
        }
        let last_speed = self.last_engine.as_ref().map(|s| s.speed).unwrap_or(0.0);
        if last_speed > t.high_speed {
            stress += 0.3;
        }
        stress
    }

    fn component_mut(&mut self, component: Component) -> &mut ComponentWearState {
        self.components
            .entry(component)
            .or_insert_with(|| ComponentWearState::new(component, self.intervals.hours_for(component)))
    }

    /// Restores the maintenance countdown to its configured interval.
    pub fn reset_maintenance(&mut self, component: Component, now: DateTime<Utc>) {
        let hours = self.intervals.hours_for(component);
        let state = self.component_mut(component);
        state.hours_until_maintenance = hours;
        state.last_maintenance = Some(now);
        tracing::info!(component = %component, hours, "Maintenance counter reset");
    }

    pub fn component(&self, component: Component) -> Option<&ComponentWearState> {
        self.components.get(&component)
    }

    pub fn health(&self, component: Component) -> f64 {
        self.components
            .get(&component)
            .map(|c| c.health_score)
            .unwrap_or(100.0)
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentWearState> {
        self.components.values()
    }

    pub fn overall_health(&self) -> f64 {
        if self.components.is_empty() {
            return 100.0;
        }
        let sum: f64 = self.components.values().map(|c| c.health_score).sum();
        round_to(sum / self.components.len() as f64, 2)
    }

    pub fn runtime_hours(&self) -> f64 {
        self.runtime_hours
    }

    pub fn hard_braking_count(&self) -> u64 {
        self.hard_braking_count
    }

    pub fn exposure(&self) -> &ExposureTotals {
        &self.exposure
    }

    pub fn snapshot(&self) -> WearSnapshot {
        WearSnapshot {
            components: self
                .components
                .iter()
                .map(|(&name, state)| (name, state.view()))
                .collect(),
            runtime_hours: round_to(self.runtime_hours, 2),
            overall_health: self.overall_health(),
        }
    }
}
