use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use wearwatch_common::types::{
    AlertLevel, Component, EngineReading, EnvironmentReading, OutputEvent,
};
use wearwatch_notify::error::Result as NotifyResult;
use wearwatch_notify::manager::output_queue;
use wearwatch_notify::plugin::{SinkPlugin, SinkRegistry};
use wearwatch_notify::OutputSink;
use wearwatch_server::config::{ServerConfig, SinkConfig};
use wearwatch_server::coordinator::{Cadence, CoordinatorError, CoordinatorHandle, PredictiveCoordinator};
use wearwatch_server::engine::EngineStats;
use wearwatch_server::output::build_dispatcher;

fn quiet_config() -> ServerConfig {
    // Timers far enough out that only explicit publishes happen during a test.
    ServerConfig {
        wear_publish_interval_secs: 3600,
        forecast_publish_interval_secs: 3600,
        ..ServerConfig::default()
    }
}

fn start(
    config: &ServerConfig,
    queue: usize,
) -> (
    CoordinatorHandle,
    mpsc::Receiver<OutputEvent>,
    tokio::task::JoinHandle<EngineStats>,
) {
    let (publisher, rx) = output_queue(queue);
    let (coordinator, handle) = PredictiveCoordinator::new(config, publisher);
    let task = tokio::spawn(coordinator.run());
    (handle, rx, task)
}

fn engine(rpm: f64, coolant: f64, fuel: f64) -> EngineReading {
    EngineReading {
        rpm: Some(rpm),
        speed: Some(60.0),
        coolant_temp: Some(coolant),
        throttle: Some(20.0),
        fuel_level: Some(fuel),
        ..Default::default()
    }
}

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn drain(rx: &mut mpsc::Receiver<OutputEvent>) -> Vec<OutputEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn critical_rpm_publishes_one_emergency_alert() {
    let (handle, mut rx, _task) = start(&quiet_config(), 64);

    handle.ingest_engine(engine(7200.0, 90.0, 80.0)).await.unwrap();
    handle.ingest_engine(engine(7200.0, 90.0, 80.0)).await.unwrap();
    let summary = handle.alert_summary().await.unwrap();

    // Second reading is inside the cooldown window.
    assert_eq!(summary.total, 1);
    assert_eq!(summary.by_level.emergency, 1);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    match &events[0] {
        OutputEvent::Alert(alert) => {
            assert_eq!(alert.level, AlertLevel::Emergency);
            assert_eq!(alert.component, "engine");
            assert!(alert.id.starts_with("ALT-"));
        }
        other => panic!("unexpected {}", other.kind()),
    }
}

#[tokio::test]
async fn critically_low_fuel_is_one_critical_alert() {
    let (handle, _rx, _task) = start(&quiet_config(), 64);
    handle.ingest_engine(engine(2000.0, 90.0, 3.0)).await.unwrap();

    let alerts = handle.active_alerts(None).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Critical);
    assert_eq!(alerts[0].component, "fuel");
    assert!(handle
        .active_alerts(Some(AlertLevel::Warning))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn acknowledge_and_clear_publish_lifecycle() {
    let (handle, mut rx, _task) = start(&quiet_config(), 64);
    handle
        .ingest_environment(EnvironmentReading {
            vibration: Some(9.0),
            ..Default::default()
        })
        .await
        .unwrap();

    let alerts = handle.active_alerts(None).await.unwrap();
    assert_eq!(alerts.len(), 1);
    let id = alerts[0].id.clone();

    assert!(handle.acknowledge(&id).await.unwrap());
    assert_eq!(handle.alert_summary().await.unwrap().unacknowledged, 0);
    assert!(handle.clear(&id).await.unwrap());
    assert!(!handle.clear(&id).await.unwrap());
    assert!(!handle.acknowledge("ALT-0-0000").await.unwrap());
    assert_eq!(handle.alert_summary().await.unwrap().total, 0);

    let kinds: Vec<&str> = drain(&mut rx).iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec!["alert", "alert_cleared"]);
}

#[tokio::test]
async fn wear_publish_reports_all_components() {
    let (handle, mut rx, _task) = start(&quiet_config(), 64);
    handle.ingest_engine(engine(3000.0, 90.0, 70.0)).await.unwrap();
    handle.publish_now(Cadence::Wear).await.unwrap();

    let events = drain(&mut rx);
    let report = events
        .iter()
        .find_map(|e| match e {
            OutputEvent::WearReport(r) => Some(r),
            _ => None,
        })
        .expect("wear report published");
    assert_eq!(report.wear_state.components.len(), 5);
    assert!(report.wear_state.overall_health > 99.0);

    let stats = handle.stats().await.unwrap();
    assert_eq!(stats.engine_samples, 1);
    assert_eq!(stats.wear_reports, 1);
    assert_eq!(stats.forecast_reports, 0);
}

#[tokio::test]
async fn forecast_query_sees_coolant_trend_without_publishing() {
    let (handle, mut rx, _task) = start(&quiet_config(), 256);
    for i in 0..30 {
        let mut reading = engine(2500.0, 86.0 + i as f64 * 0.6, 70.0);
        reading.timestamp = Some(t0() + Duration::seconds(i));
        handle.ingest_engine(reading).await.unwrap();
    }

    let forecast = handle.forecast().await.unwrap();
    assert!(forecast
        .all_predictions
        .iter()
        .any(|p| p.component == Component::Engine && p.problem_type == "overheating"));
    assert_eq!(forecast.component_forecasts.len(), 5);
    assert!(forecast.cost_estimate.repair_count >= 1);
    assert_eq!(forecast.summary.data_points_collected["coolant_temp"], 30);

    let published: Vec<&str> = drain(&mut rx).iter().map(|e| e.kind()).collect();
    assert!(!published.contains(&"forecast_report"));

    handle.publish_now(Cadence::Forecast).await.unwrap();
    let published: Vec<&str> = drain(&mut rx).iter().map(|e| e.kind()).collect();
    assert_eq!(published, vec!["forecast_report"]);
    assert_eq!(handle.stats().await.unwrap().forecast_reports, 1);
}

#[tokio::test]
async fn maintenance_reset_restores_interval() {
    let (handle, _rx, _task) = start(&quiet_config(), 64);
    for hours in [0, 2] {
        let mut reading = engine(2000.0, 90.0, 70.0);
        reading.timestamp = Some(t0() + Duration::hours(hours));
        handle.ingest_engine(reading).await.unwrap();
    }

    let before = handle.wear_state().await.unwrap();
    let engine_view = before.wear_state.component(Component::Engine).unwrap();
    assert_eq!(engine_view.hours_until_maintenance, 248.0);
    assert!(engine_view.last_maintenance.is_none());

    handle.reset_maintenance(Component::Engine).await.unwrap();
    let after = handle.wear_state().await.unwrap();
    let engine_view = after.wear_state.component(Component::Engine).unwrap();
    assert_eq!(engine_view.hours_until_maintenance, 250.0);
    assert!(engine_view.last_maintenance.is_some());
}

#[tokio::test]
async fn cost_queries() {
    let (handle, _rx, _task) = start(&quiet_config(), 64);
    let schedule = handle.maintenance_schedule().await.unwrap();
    assert_eq!(schedule.maintenance_items.len(), 5);
    assert_eq!(schedule.currency, "EUR");

    assert_eq!(handle.cost_from_wear().await.unwrap().repair_count, 0);

    handle.ingest_engine(engine(2000.0, 115.0, 80.0)).await.unwrap();
    let from_alerts = handle.cost_from_alerts().await.unwrap();
    assert_eq!(from_alerts.repair_count, 1);
    assert_eq!(from_alerts.repairs[0].problem_type, "overheating");
}

#[tokio::test]
async fn full_output_queue_drops_newest() {
    let (handle, mut rx, _task) = start(&quiet_config(), 1);
    // Critical RPM and critically low fuel: two alerts, room for one.
    handle.ingest_engine(engine(7200.0, 90.0, 3.0)).await.unwrap();

    let stats = handle.stats().await.unwrap();
    assert_eq!(stats.alerts_raised, 2);
    assert_eq!(stats.outputs_published, 1);
    assert_eq!(stats.outputs_dropped, 1);
    assert_eq!(drain(&mut rx).len(), 1);

    // Dropped outputs stay queryable.
    assert_eq!(handle.active_alerts(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn shutdown_drains_queued_samples() {
    let (handle, _rx, task) = start(&quiet_config(), 64);
    for _ in 0..50 {
        handle.ingest_engine(engine(2000.0, 90.0, 70.0)).await.unwrap();
    }
    handle
        .ingest_environment(EnvironmentReading::default())
        .await
        .unwrap();

    let stats = handle.shutdown().await.unwrap();
    assert_eq!(stats.engine_samples, 50);
    assert_eq!(stats.environment_samples, 1);

    let final_stats = task.await.unwrap();
    assert_eq!(final_stats.engine_samples, 50);
    assert!(matches!(
        handle.alert_summary().await,
        Err(CoordinatorError::Closed)
    ));
}

#[derive(Clone, Default)]
struct Capture {
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl OutputSink for Capture {
    async fn send(&self, event: &OutputEvent) -> NotifyResult<()> {
        self.seen.lock().unwrap().push(event.kind().to_string());
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "capture"
    }
}

struct CapturePlugin(Capture);

impl SinkPlugin for CapturePlugin {
    fn name(&self) -> &str {
        "capture"
    }

    fn validate_config(&self, _config: &serde_json::Value) -> NotifyResult<()> {
        Ok(())
    }

    fn create_sink(&self, _instance_id: &str, _config: &serde_json::Value) -> NotifyResult<Box<dyn OutputSink>> {
        Ok(Box::new(self.0.clone()))
    }
}

#[tokio::test]
async fn dispatcher_routes_by_min_level() {
    let capture = Capture::default();
    let seen = capture.seen.clone();
    let mut registry = SinkRegistry::default();
    registry.register(Box::new(CapturePlugin(capture)));

    let mut config = quiet_config();
    config.output.sinks = vec![SinkConfig {
        sink_type: "capture".into(),
        min_level: AlertLevel::Critical,
        config: serde_json::Value::Null,
    }];
    let dispatcher = build_dispatcher(&config.output, &registry).unwrap();
    assert_eq!(dispatcher.sink_count(), 1);

    let (publisher, rx) = output_queue(64);
    let dispatch_task = tokio::spawn(dispatcher.run(rx));
    let (coordinator, handle) = PredictiveCoordinator::new(&config, publisher);
    let task = tokio::spawn(coordinator.run());

    // Low fuel warning is filtered; critical RPM passes.
    handle.ingest_engine(engine(2000.0, 90.0, 12.0)).await.unwrap();
    handle.ingest_engine(engine(7200.0, 90.0, 12.0)).await.unwrap();
    handle.publish_now(Cadence::Wear).await.unwrap();
    handle.shutdown().await.unwrap();
    drop(handle);
    task.await.unwrap();
    dispatch_task.await.unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, vec!["alert", "wear_report"]);
}

#[tokio::test]
async fn unknown_sink_type_is_rejected() {
    let mut config = quiet_config();
    config.output.sinks[0].sink_type = "pager".into();
    let err = build_dispatcher(&config.output, &SinkRegistry::default())
        .err()
        .unwrap();
    let message = format!("{err:#}");
    assert!(message.contains("pager"));
    assert!(message.contains("available types: jsonl, log"));
}
