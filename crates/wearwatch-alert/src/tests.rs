use crate::engine::{AlertEngine, DEFAULT_COOLDOWN_SECS};
use crate::rules::default_rules;
use crate::rules::telemetry::{FuelRule, RpmRule};
use crate::rules::wear::{ComponentHealthRule, MaintenanceDueRule};
use crate::{AlertInput, AlertRule};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use wearwatch_common::thresholds::Thresholds;
use wearwatch_common::types::*;

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn make_engine() -> AlertEngine {
    AlertEngine::new(default_rules(&Thresholds::default()), DEFAULT_COOLDOWN_SECS)
}

fn obd(rpm: f64, coolant: f64, fuel: f64) -> EngineSample {
    EngineSample {
        timestamp: t0(),
        rpm,
        speed: 50.0,
        coolant_temp: coolant,
        throttle: 0.0,
        fuel_level: fuel,
    }
}

fn sensors(temperature: f64, pressure: f64, vibration: f64) -> EnvironmentSample {
    EnvironmentSample {
        timestamp: t0(),
        temperature,
        pressure,
        humidity: 50.0,
        vibration,
    }
}

fn wear_view(name: Component, health: f64, hours: f64) -> ComponentWearView {
    ComponentWearView {
        name,
        wear_percentage: 100.0 - health,
        health_score: health,
        accumulated_stress: 0.0,
        hours_until_maintenance: hours,
        last_maintenance: None,
        status: ComponentStatus::from_health(health),
    }
}

fn snapshot(views: Vec<ComponentWearView>) -> WearSnapshot {
    let components: BTreeMap<Component, ComponentWearView> =
        views.into_iter().map(|v| (v.name, v)).collect();
    WearSnapshot {
        components,
        runtime_hours: 0.0,
        overall_health: 100.0,
    }
}

#[test]
fn critical_rpm_raises_one_emergency() {
    let mut engine = make_engine();
    let alerts = engine.evaluate_engine(&obd(7200.0, 90.0, 80.0), t0());
    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.level, AlertLevel::Emergency);
    assert_eq!(alert.component, "engine");
    assert!(alert.message.contains("RPM"));
    assert_eq!(alert.data["rpm"], 7200.0);
    assert!(!alert.acknowledged);
}

#[test]
fn high_rpm_is_a_warning() {
    let rule = RpmRule::from(&Thresholds::default().engine);
    let sample = obd(6800.0, 90.0, 80.0);
    let candidates = rule.evaluate(AlertInput::Engine(&sample));
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].level, AlertLevel::Warning);
}

#[test]
fn overheating_raises_one_emergency() {
    let mut engine = make_engine();
    let alerts = engine.evaluate_engine(&obd(0.0, 115.0, 80.0), t0());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Emergency);
    assert!(alerts[0].message.to_lowercase().contains("overheating"));
}

#[test]
fn critically_low_fuel_raises_one_critical() {
    let mut engine = make_engine();
    let alerts = engine.evaluate_engine(&obd(800.0, 90.0, 3.0), t0());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Critical);
    assert_eq!(alerts[0].component, "fuel");
}

#[test]
fn low_fuel_is_a_warning() {
    let rule = FuelRule::from(&Thresholds::default().fuel);
    let sample = obd(800.0, 90.0, 12.0);
    let candidates = rule.evaluate(AlertInput::Engine(&sample));
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].level, AlertLevel::Warning);
}

#[test]
fn normal_telemetry_raises_nothing() {
    let mut engine = make_engine();
    assert!(engine.evaluate_engine(&obd(2500.0, 90.0, 60.0), t0()).is_empty());
    assert!(engine
        .evaluate_environment(&sensors(25.0, 101.0, 1.0), t0())
        .is_empty());
    assert_eq!(engine.history_len(), 0);
}

#[test]
fn cooldown_suppresses_same_key() {
    let mut engine = make_engine();
    let sample = obd(7200.0, 90.0, 80.0);

    assert_eq!(engine.evaluate_engine(&sample, t0()).len(), 1);
    assert!(engine
        .evaluate_engine(&sample, t0() + Duration::seconds(10))
        .is_empty());
    assert!(engine
        .evaluate_engine(&sample, t0() + Duration::seconds(29))
        .is_empty());

    let later = engine.evaluate_engine(&sample, t0() + Duration::seconds(31));
    assert_eq!(later.len(), 1);
    assert_eq!(engine.history_len(), 2);
    assert_eq!(engine.summary().total, 2);
}

#[test]
fn cooldown_boundary_is_suppressed() {
    let mut engine = make_engine();
    let sample = obd(7200.0, 90.0, 80.0);
    assert_eq!(engine.evaluate_engine(&sample, t0()).len(), 1);
    assert!(engine
        .evaluate_engine(&sample, t0() + Duration::seconds(30))
        .is_empty());
    assert_eq!(
        engine
            .evaluate_engine(&sample, t0() + Duration::milliseconds(30_001))
            .len(),
        1
    );
}

#[test]
fn huge_cooldown_is_clamped() {
    let mut engine = AlertEngine::new(default_rules(&Thresholds::default()), u64::MAX);
    let sample = obd(7200.0, 90.0, 80.0);
    assert_eq!(engine.evaluate_engine(&sample, t0()).len(), 1);
    assert!(engine
        .evaluate_engine(&sample, t0() + Duration::days(365 * 100))
        .is_empty());
}

#[test]
fn cooldown_is_per_level() {
    let mut engine = make_engine();
    assert_eq!(engine.evaluate_engine(&obd(7200.0, 90.0, 80.0), t0()).len(), 1);
    // Same component, different level.
    let warn = engine.evaluate_engine(&obd(6800.0, 90.0, 80.0), t0() + Duration::seconds(1));
    assert_eq!(warn.len(), 1);
    assert_eq!(warn[0].level, AlertLevel::Warning);
}

#[test]
fn same_sample_shares_cooldown_key() {
    let mut engine = make_engine();
    let alerts = engine.evaluate_engine(&obd(7200.0, 115.0, 80.0), t0());
    // RPM and coolant both map to (engine, emergency).
    assert_eq!(alerts.len(), 1);
}

#[test]
fn environment_rules() {
    let mut engine = make_engine();
    let alerts = engine.evaluate_environment(&sensors(50.0, 90.0, 9.0), t0());
    let mut keys: Vec<(String, AlertLevel)> = alerts
        .iter()
        .map(|a| (a.component.clone(), a.level))
        .collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            ("battery".to_string(), AlertLevel::Info),
            ("brakes".to_string(), AlertLevel::Critical),
            ("tires".to_string(), AlertLevel::Warning),
        ]
    );
}

#[test]
fn wear_status_alerts() {
    let rule = ComponentHealthRule;
    let snap = snapshot(vec![
        wear_view(Component::Engine, 95.0, 200.0),
        wear_view(Component::Brakes, 60.0, 200.0),
        wear_view(Component::Tires, 30.0, 200.0),
        wear_view(Component::Battery, 10.0, 200.0),
    ]);
    let candidates = rule.evaluate(AlertInput::Wear(&snap));
    let levels: Vec<(String, AlertLevel)> = candidates
        .iter()
        .map(|c| (c.component.clone(), c.level))
        .collect();
    assert_eq!(
        levels,
        vec![
            ("brakes".to_string(), AlertLevel::Warning),
            ("tires".to_string(), AlertLevel::Critical),
            ("battery".to_string(), AlertLevel::Emergency),
        ]
    );
    assert!(candidates[2].message.starts_with("BATTERY FAILURE"));
}

#[test]
fn maintenance_due_alerts() {
    let rule = MaintenanceDueRule::default();
    let snap = snapshot(vec![
        wear_view(Component::Engine, 100.0, 0.0),
        wear_view(Component::Brakes, 100.0, 5.0),
        wear_view(Component::Tires, 100.0, 50.0),
    ]);
    let candidates = rule.evaluate(AlertInput::Wear(&snap));
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].component, "engine");
    assert_eq!(candidates[0].level, AlertLevel::Critical);
    assert_eq!(candidates[1].component, "brakes");
    assert_eq!(candidates[1].level, AlertLevel::Warning);
}

#[test]
fn rules_ignore_foreign_inputs() {
    let rule = RpmRule::from(&Thresholds::default().engine);
    let sample = sensors(25.0, 101.0, 20.0);
    assert!(rule.evaluate(AlertInput::Environment(&sample)).is_empty());
    let snap = snapshot(vec![wear_view(Component::Engine, 10.0, 0.0)]);
    assert!(rule.evaluate(AlertInput::Wear(&snap)).is_empty());
}

#[test]
fn acknowledge_and_clear_lifecycle() {
    let mut engine = make_engine();
    let alerts = engine.evaluate_engine(&obd(7200.0, 90.0, 3.0), t0());
    assert_eq!(alerts.len(), 2);
    let id = alerts[0].id.clone();

    assert_eq!(engine.summary().unacknowledged, 2);
    assert!(engine.acknowledge(&id));
    assert!(engine.get(&id).unwrap().acknowledged);
    let summary = engine.summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.unacknowledged, 1);
    assert_eq!(summary.by_level.emergency, 1);
    assert_eq!(summary.by_level.critical, 1);

    assert!(engine.clear(&id).is_some());
    assert!(engine.clear(&id).is_none());
    assert!(!engine.acknowledge(&id));
    assert_eq!(engine.summary().total, 1);
    // History keeps cleared alerts.
    assert_eq!(engine.history_len(), 2);
    assert_eq!(engine.alerts_by_level(AlertLevel::Critical).len(), 1);
    assert!(engine.alerts_by_level(AlertLevel::Emergency).is_empty());
}

#[test]
fn ids_are_unique_and_sequential() {
    let mut engine = make_engine();
    let first = engine.evaluate_engine(&obd(7200.0, 90.0, 80.0), t0());
    let second = engine.evaluate_engine(&obd(7200.0, 90.0, 80.0), t0() + Duration::seconds(60));
    assert_eq!(first[0].id, "ALT-1700000000-0001");
    assert_eq!(second[0].id, "ALT-1700000060-0002");
}
