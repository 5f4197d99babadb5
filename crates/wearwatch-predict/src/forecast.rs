use crate::history::{MetricHistory, DEFAULT_CAPACITY, DEFAULT_TREND_WINDOW};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wearwatch_common::thresholds::{MaintenanceIntervals, Thresholds};
use wearwatch_common::types::{
    Component, ComponentForecast, EngineSample, EnvironmentSample, EventCounters, ForecastSummary,
    HealthProjection, Prediction, RiskDistribution, RiskLevel, TrendDirection,
};

pub const DEFAULT_HEALTH_CAPACITY: usize = 500;
/// Degradation assumed when the health trend is unknown or flat.
pub const DEGRADATION_FLOOR_PER_HOUR: f64 = 0.1;
pub const REMAINING_LIFE_SENTINEL_HOURS: f64 = 10_000.0;
/// Number of samples averaged by the predictors.
pub(crate) const RECENT_WINDOW: usize = 100;
const TOP_RISKS: usize = 3;

/// Raw metrics retained by the forecaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Rpm,
    Speed,
    CoolantTemp,
    Throttle,
    FuelLevel,
    Temperature,
    Pressure,
    Humidity,
    Vibration,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::Rpm,
        Metric::Speed,
        Metric::CoolantTemp,
        Metric::Throttle,
        Metric::FuelLevel,
        Metric::Temperature,
        Metric::Pressure,
        Metric::Humidity,
        Metric::Vibration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Rpm => "rpm",
            Metric::Speed => "speed",
            Metric::CoolantTemp => "coolant_temp",
            Metric::Throttle => "throttle",
            Metric::FuelLevel => "fuel_level",
            Metric::Temperature => "temperature",
            Metric::Pressure => "pressure",
            Metric::Humidity => "humidity",
            Metric::Vibration => "vibration",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecasterConfig {
    pub history_capacity: usize,
    pub health_history_capacity: usize,
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            health_history_capacity: DEFAULT_HEALTH_CAPACITY,
        }
    }
}

/// Trend-based forecaster over raw metric and component health histories.
pub struct TrendForecaster {
    pub(crate) thresholds: Thresholds,
    pub(crate) intervals: MaintenanceIntervals,
    pub(crate) history: BTreeMap<Metric, MetricHistory>,
    pub(crate) health_history: BTreeMap<Component, MetricHistory>,
    pub(crate) counters: EventCounters,
    last_speed: Option<f64>,
    first_seen: Option<DateTime<Utc>>,
    last_seen: Option<DateTime<Utc>>,
}

/// Maps a health slope (points per sample) to a trend direction.
pub fn trend_from_slope(slope: Option<f64>) -> TrendDirection {
    match slope {
        Some(s) if s < -0.5 => TrendDirection::CriticalDegradation,
        Some(s) if s < -0.1 => TrendDirection::Degrading,
        Some(s) if s > 0.1 => TrendDirection::Improving,
        _ => TrendDirection::Stable,
    }
}

/// Hours until `current` reaches `threshold` at `rate` units per second.
///
/// `None` when the threshold is already crossed or the rate points away from it.
pub fn hours_to_threshold(
    current: f64,
    threshold: f64,
    rate: Option<f64>,
    increasing: bool,
) -> Option<f64> {
    let rate = rate.filter(|r| *r != 0.0 && r.is_finite())?;
    let seconds = if increasing {
        if current >= threshold || rate <= 0.0 {
            return None;
        }
        (threshold - current) / rate
    } else {
        if current <= threshold || rate >= 0.0 {
            return None;
        }
        (current - threshold) / rate.abs()
    };
    Some((seconds / 3600.0).max(0.0))
}

impl TrendForecaster {
    pub fn new(config: ForecasterConfig, thresholds: Thresholds, intervals: MaintenanceIntervals) -> Self {
        let history = Metric::ALL
            .iter()
            .map(|&m| (m, MetricHistory::new(config.history_capacity)))
            .collect();
        let health_history = Component::ALL
            .iter()
            .map(|&c| (c, MetricHistory::new(config.health_history_capacity)))
            .collect();
        Self {
            thresholds,
            intervals,
            history,
            health_history,
            counters: EventCounters::default(),
            last_speed: None,
            first_seen: None,
            last_seen: None,
        }
    }

    fn touch(&mut self, ts: DateTime<Utc>) {
        self.first_seen = Some(self.first_seen.map_or(ts, |f| f.min(ts)));
        self.last_seen = Some(self.last_seen.map_or(ts, |l| l.max(ts)));
    }

    fn push(&mut self, metric: Metric, value: f64, ts: DateTime<Utc>) {
        if let Some(h) = self.history.get_mut(&metric) {
            h.add(value, ts);
        }
    }

    pub fn record_engine(&mut self, sample: &EngineSample) {
        let ts = sample.timestamp;
        self.touch(ts);
        self.push(Metric::Rpm, sample.rpm, ts);
        self.push(Metric::Speed, sample.speed, ts);
        self.push(Metric::CoolantTemp, sample.coolant_temp, ts);
        self.push(Metric::Throttle, sample.throttle, ts);
        self.push(Metric::FuelLevel, sample.fuel_level, ts);

        let engine = &self.thresholds.engine;
        if sample.rpm > engine.rpm_max {
            self.counters.high_rpm_events += 1;
        }
        if sample.coolant_temp > engine.coolant_temp_warning {
            self.counters.overheating_events += 1;
        }
        if sample.throttle > engine.throttle_event {
            self.counters.high_throttle_events += 1;
        }
        if let Some(prev) = self.last_speed {
            if prev - sample.speed > self.thresholds.brakes.hard_braking_event_drop {
                self.counters.hard_braking_events += 1;
            }
        }
        self.last_speed = Some(sample.speed);
    }

    pub fn record_environment(&mut self, sample: &EnvironmentSample) {
        let ts = sample.timestamp;
        self.touch(ts);
        self.push(Metric::Temperature, sample.temperature, ts);
        self.push(Metric::Pressure, sample.pressure, ts);
        self.push(Metric::Humidity, sample.humidity, ts);
        self.push(Metric::Vibration, sample.vibration, ts);

        if sample.vibration > self.thresholds.brakes.vibration_warning {
            self.counters.high_vibration_events += 1;
        }
        let tires = &self.thresholds.tires;
        if sample.pressure < tires.pressure_min || sample.pressure > tires.pressure_max {
            self.counters.pressure_anomaly_events += 1;
        }
    }

    pub fn record_health(&mut self, component: Component, health: f64, ts: DateTime<Utc>) {
        if let Some(h) = self.health_history.get_mut(&component) {
            h.add(health, ts);
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<&MetricHistory> {
        self.history.get(&metric)
    }

    pub fn health_history(&self, component: Component) -> Option<&MetricHistory> {
        self.health_history.get(&component)
    }

    pub fn event_counters(&self) -> &EventCounters {
        &self.counters
    }

    /// Hours spanned by the samples seen so far.
    pub fn runtime_hours(&self) -> f64 {
        match (self.first_seen, self.last_seen) {
            (Some(first), Some(last)) => {
                ((last - first).num_milliseconds() as f64 / 3_600_000.0).max(0.0)
            }
            _ => 0.0,
        }
    }

    pub(crate) fn average(&self, metric: Metric, count: usize) -> Option<f64> {
        self.history.get(&metric)?.average(Some(count))
    }

    pub(crate) fn slope(&self, metric: Metric) -> Option<f64> {
        self.history.get(&metric)?.trend_slope(DEFAULT_TREND_WINDOW)
    }

    pub(crate) fn rate(&self, metric: Metric) -> Option<f64> {
        self.history.get(&metric)?.rate_of_change()
    }

    pub(crate) fn latest(&self, metric: Metric) -> Option<f64> {
        self.history.get(&metric)?.latest().map(|p| p.value)
    }

    pub(crate) fn samples(&self, metric: Metric) -> usize {
        self.history.get(&metric).map_or(0, |h| h.len())
    }

    pub fn predictions_for(&self, component: Component, now: DateTime<Utc>) -> Vec<Prediction> {
        match component {
            Component::Engine => self.predict_engine_issues(now),
            Component::Brakes => self.predict_brake_issues(now),
            Component::Tires => self.predict_tire_issues(now),
            Component::Transmission => self.predict_transmission_issues(now),
            Component::Battery => self.predict_battery_issues(now),
        }
    }

    fn risk_factors(&self, component: Component) -> Vec<String> {
        let c = &self.counters;
        let mut factors = Vec::new();
        match component {
            Component::Engine => {
                if c.high_rpm_events > 10 {
                    factors.push("Frequent high-RPM use".to_string());
                }
                if c.overheating_events > 5 {
                    factors.push("Overheating episodes".to_string());
                }
            }
            Component::Brakes => {
                if c.hard_braking_events > 20 {
                    factors.push("Frequent hard braking".to_string());
                }
                if c.high_vibration_events > 10 {
                    factors.push("Elevated vibration detected".to_string());
                }
            }
            Component::Tires => {
                if c.pressure_anomaly_events > 10 {
                    factors.push("Pressure anomalies".to_string());
                }
                if self.average(Metric::Speed, 50).is_some_and(|s| s > 110.0) {
                    factors.push("High average speed".to_string());
                }
            }
            Component::Transmission => {
                if c.high_throttle_events > 20 {
                    factors.push("Aggressive driving".to_string());
                }
            }
            Component::Battery => {
                if self
                    .average(Metric::Temperature, 50)
                    .is_some_and(|t| t > 40.0 || t < 0.0)
                {
                    factors.push("Extreme ambient temperature".to_string());
                }
            }
        }
        factors
    }

    /// Health projection, remaining life and predictions for one component.
    ///
    /// Does not record `current_health`; call [`record_health`](Self::record_health) for that.
    pub fn forecast(&self, component: Component, current_health: f64, now: DateTime<Utc>) -> ComponentForecast {
        let health_slope = self
            .health_history
            .get(&component)
            .and_then(|h| h.trend_slope(DEFAULT_TREND_WINDOW));
        let history_len = self.health_history.get(&component).map_or(0, |h| h.len());

        let degradation_per_hour = match health_slope {
            Some(s) if s != 0.0 => s.abs() * 3600.0 / history_len.max(1) as f64,
            _ => DEGRADATION_FLOOR_PER_HOUR,
        };
        let project = |hours: f64| (current_health - degradation_per_hour * hours).max(0.0);
        let remaining = if degradation_per_hour > 0.0 {
            current_health / degradation_per_hour
        } else {
            REMAINING_LIFE_SENTINEL_HOURS
        };

        ComponentForecast {
            name: component,
            current_health,
            forecast: HealthProjection {
                health_in_1h: project(1.0),
                health_in_24h: project(24.0),
                health_in_7d: project(168.0),
            },
            estimated_remaining_life_hours: remaining,
            trend: trend_from_slope(health_slope),
            risk_factors: self.risk_factors(component),
            predictions: self.predictions_for(component, now),
        }
    }

    /// Every component's predictions, most severe first.
    pub fn all_predictions(&self, now: DateTime<Utc>) -> Vec<Prediction> {
        let mut all: Vec<Prediction> = Component::ALL
            .iter()
            .flat_map(|&c| self.predictions_for(c, now))
            .collect();
        // Stable sort keeps per-component order within a risk level.
        all.sort_by(|a, b| b.risk_level.cmp(&a.risk_level));
        all
    }

    pub fn summary(&self, now: DateTime<Utc>) -> ForecastSummary {
        let all = self.all_predictions(now);
        let mut distribution = RiskDistribution::default();
        for p in &all {
            match p.risk_level {
                RiskLevel::Critical => distribution.critical += 1,
                RiskLevel::High => distribution.high += 1,
                RiskLevel::Moderate => distribution.moderate += 1,
                RiskLevel::Low => distribution.low += 1,
            }
        }
        ForecastSummary {
            total_predictions: all.len(),
            risk_distribution: distribution,
            event_counters: self.counters.clone(),
            data_points_collected: self
                .history
                .iter()
                .map(|(m, h)| (m.as_str().to_string(), h.len()))
                .collect(),
            runtime_hours: wearwatch_common::types::round_to(self.runtime_hours(), 2),
            highest_risk_predictions: all.into_iter().take(TOP_RISKS).collect(),
        }
    }
}
