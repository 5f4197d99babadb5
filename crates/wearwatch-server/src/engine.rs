use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use wearwatch_alert::engine::AlertEngine;
use wearwatch_alert::rules::default_rules;
use wearwatch_common::types::{
    Alert, AlertLevel, AlertSummary, Component, CostSummary, EngineSample, EnvironmentSample,
    ForecastReport, MaintenanceSchedule, WearReport,
};
use wearwatch_predict::forecast::ForecasterConfig;
use wearwatch_predict::{CostEstimator, TrendForecaster, WearTracker};

/// Processing statistics reported by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineStats {
    pub engine_samples: u64,
    pub environment_samples: u64,
    pub alerts_raised: u64,
    pub wear_reports: u64,
    pub forecast_reports: u64,
    pub outputs_published: u64,
    pub outputs_dropped: u64,
    pub uptime_secs: i64,
}

/// Owns every piece of mutable analytics state.
///
/// All methods are synchronous; the coordinator serializes access by owning
/// the context on a single task.
pub struct EngineContext {
    wear: WearTracker,
    forecaster: TrendForecaster,
    alerts: AlertEngine,
    costs: CostEstimator,
    stats: EngineStats,
    started_at: DateTime<Utc>,
}

impl EngineContext {
    pub fn new(config: &ServerConfig, started_at: DateTime<Utc>) -> Self {
        let forecaster_config = ForecasterConfig {
            history_capacity: config.engine.history_capacity,
            health_history_capacity: config.engine.health_history_capacity,
        };
        Self {
            wear: WearTracker::new(config.thresholds.clone(), config.maintenance.clone()),
            forecaster: TrendForecaster::new(
                forecaster_config,
                config.thresholds.clone(),
                config.maintenance.clone(),
            ),
            alerts: AlertEngine::new(default_rules(&config.thresholds), config.engine.cooldown_secs),
            costs: CostEstimator::new(config.engine.labor_rate),
            stats: EngineStats::default(),
            started_at,
        }
    }

    /// Updates wear and metric history, then evaluates the telemetry rules.
    pub fn ingest_engine(&mut self, sample: &EngineSample, now: DateTime<Utc>) -> Vec<Alert> {
        self.wear.process_engine(sample);
        self.forecaster.record_engine(sample);
        self.stats.engine_samples += 1;
        let raised = self.alerts.evaluate_engine(sample, now);
        self.stats.alerts_raised += raised.len() as u64;
        raised
    }

    pub fn ingest_environment(&mut self, sample: &EnvironmentSample, now: DateTime<Utc>) -> Vec<Alert> {
        self.wear.process_environment(sample);
        self.forecaster.record_environment(sample);
        self.stats.environment_samples += 1;
        let raised = self.alerts.evaluate_environment(sample, now);
        self.stats.alerts_raised += raised.len() as u64;
        raised
    }

    pub fn wear_report(&self, now: DateTime<Utc>) -> WearReport {
        WearReport {
            timestamp: now,
            wear_state: self.wear.snapshot(),
            alert_summary: self.alerts.summary(),
            active_alerts: self.alerts.active_alerts(),
        }
    }

    /// Periodic wear cycle: evaluates the wear rules, then captures the report
    /// so it already includes any alert raised here.
    pub fn wear_tick(&mut self, now: DateTime<Utc>) -> (Vec<Alert>, WearReport) {
        let snapshot = self.wear.snapshot();
        let raised = self.alerts.evaluate_wear(&snapshot, now);
        self.stats.alerts_raised += raised.len() as u64;
        self.stats.wear_reports += 1;
        (raised, self.wear_report(now))
    }

    /// Forecast snapshot over the current state. Records nothing.
    pub fn forecast_report(&self, now: DateTime<Utc>) -> ForecastReport {
        let health: BTreeMap<Component, f64> = Component::ALL
            .iter()
            .map(|&c| (c, self.wear.health(c)))
            .collect();
        let component_forecasts = health
            .iter()
            .map(|(&c, &h)| (c, self.forecaster.forecast(c, h, now)))
            .collect();
        let all_predictions = self.forecaster.all_predictions(now);
        let cost_estimate = self
            .costs
            .estimate_from_predictions(&all_predictions, &health, now);

        ForecastReport {
            timestamp: now,
            component_forecasts,
            all_predictions,
            summary: self.forecaster.summary(now),
            overall_health: self.wear.overall_health(),
            cost_estimate,
        }
    }

    /// Periodic forecast cycle: samples every component's health into the
    /// forecaster before building the report.
    pub fn forecast_tick(&mut self, now: DateTime<Utc>) -> ForecastReport {
        for component in Component::ALL {
            let health = self.wear.health(component);
            self.forecaster.record_health(component, health, now);
        }
        self.stats.forecast_reports += 1;
        self.forecast_report(now)
    }

    pub fn alert_summary(&self) -> AlertSummary {
        self.alerts.summary()
    }

    pub fn active_alerts(&self, level: Option<AlertLevel>) -> Vec<Alert> {
        match level {
            Some(level) => self.alerts.alerts_by_level(level),
            None => self.alerts.active_alerts(),
        }
    }

    pub fn alert_history_len(&self) -> usize {
        self.alerts.history_len()
    }

    pub fn acknowledge(&mut self, id: &str) -> bool {
        self.alerts.acknowledge(id)
    }

    pub fn clear(&mut self, id: &str) -> Option<Alert> {
        self.alerts.clear(id)
    }

    pub fn reset_maintenance(&mut self, component: Component, now: DateTime<Utc>) {
        self.wear.reset_maintenance(component, now);
    }

    pub fn cost_from_alerts(&self, now: DateTime<Utc>) -> CostSummary {
        self.costs
            .estimate_from_alerts(&self.alerts.active_alerts(), now)
    }

    pub fn cost_from_wear(&self, now: DateTime<Utc>) -> CostSummary {
        self.costs.estimate_from_wear_state(&self.wear.snapshot(), now)
    }

    pub fn maintenance_schedule(&self) -> MaintenanceSchedule {
        self.costs.maintenance_schedule()
    }

    pub fn stats(&self, now: DateTime<Utc>) -> EngineStats {
        EngineStats {
            uptime_secs: (now - self.started_at).num_seconds().max(0),
            ..self.stats.clone()
        }
    }
}
