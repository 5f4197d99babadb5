use crate::channels::jsonl::JsonlSink;
use crate::error::{NotifyError, Result};
use crate::manager::{output_queue, Dispatcher};
use crate::plugin::SinkRegistry;
use crate::routing::SinkRoute;
use crate::OutputSink;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use wearwatch_common::types::{Alert, AlertLevel, OutputEvent};

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn alert(level: AlertLevel) -> OutputEvent {
    OutputEvent::Alert(Alert {
        id: format!("ALT-1700000000-{level}"),
        level,
        component: "engine".into(),
        message: "test".into(),
        timestamp: t0(),
        data: BTreeMap::new(),
        acknowledged: false,
    })
}

#[derive(Default, Clone)]
struct Recorder {
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl OutputSink for Recorder {
    async fn send(&self, event: &OutputEvent) -> Result<()> {
        let label = match event {
            OutputEvent::Alert(a) => format!("alert:{}", a.level),
            other => other.kind().to_string(),
        };
        self.seen.lock().unwrap().push(label);
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "recorder"
    }
}

struct Failing;

#[async_trait]
impl OutputSink for Failing {
    async fn send(&self, _event: &OutputEvent) -> Result<()> {
        Err(NotifyError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "boom",
        )))
    }

    fn sink_name(&self) -> &str {
        "failing"
    }
}

#[test]
fn route_filters_alerts_by_level() {
    let route = SinkRoute {
        min_level: AlertLevel::Critical,
        sink_index: 0,
    };
    assert!(!route.should_send(&alert(AlertLevel::Warning)));
    assert!(route.should_send(&alert(AlertLevel::Critical)));
    assert!(route.should_send(&alert(AlertLevel::Emergency)));
    assert!(route.should_send(&OutputEvent::AlertCleared {
        id: "x".into(),
        timestamp: t0(),
    }));
}

#[test]
fn registry_rejects_unknown_type() {
    let registry = SinkRegistry::default();
    assert_eq!(registry.plugin_names(), vec!["jsonl", "log"]);
    let err = registry
        .create_sink("carrier-pigeon", "p1", &serde_json::Value::Null)
        .err()
        .unwrap();
    assert!(matches!(err, NotifyError::UnknownSinkType(_)));
}

#[test]
fn registry_validates_config() {
    let registry = SinkRegistry::default();
    let bad = serde_json::json!({ "path": "" });
    assert!(registry.create_sink("jsonl", "j1", &bad).is_err());
    let not_a_table = serde_json::json!(42);
    assert!(registry.create_sink("log", "l1", &not_a_table).is_err());
    assert!(registry
        .create_sink("log", "l1", &serde_json::Value::Null)
        .is_ok());
}

#[test]
fn publisher_drops_newest_when_full() {
    let (publisher, mut rx) = output_queue(2);
    assert!(publisher.publish(alert(AlertLevel::Info)));
    assert!(publisher.publish(alert(AlertLevel::Warning)));
    assert!(!publisher.publish(alert(AlertLevel::Emergency)));

    let counters = publisher.counters();
    assert_eq!(counters.published(), 2);
    assert_eq!(counters.dropped(), 1);

    // The queued events are the two oldest.
    match rx.try_recv().unwrap() {
        OutputEvent::Alert(a) => assert_eq!(a.level, AlertLevel::Info),
        other => panic!("unexpected {}", other.kind()),
    }
    match rx.try_recv().unwrap() {
        OutputEvent::Alert(a) => assert_eq!(a.level, AlertLevel::Warning),
        other => panic!("unexpected {}", other.kind()),
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn dispatcher_routes_and_survives_sink_errors() {
    let recorder = Recorder::default();
    let seen = recorder.seen.clone();
    let dispatcher = Dispatcher::new(
        vec![Box::new(Failing), Box::new(recorder)],
        vec![
            SinkRoute {
                min_level: AlertLevel::Info,
                sink_index: 0,
            },
            SinkRoute {
                min_level: AlertLevel::Warning,
                sink_index: 1,
            },
        ],
    );

    let (publisher, rx) = output_queue(8);
    publisher.publish(alert(AlertLevel::Info));
    publisher.publish(alert(AlertLevel::Critical));
    publisher.publish(OutputEvent::AlertCleared {
        id: "ALT-1".into(),
        timestamp: t0(),
    });
    drop(publisher);

    dispatcher.run(rx).await;
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, vec!["alert:critical", "alert_cleared"]);
}

#[tokio::test]
async fn jsonl_sink_appends_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.jsonl");
    let sink = JsonlSink::open("j1", &path).unwrap();
    sink.send(&alert(AlertLevel::Warning)).await.unwrap();
    sink.send(&OutputEvent::AlertCleared {
        id: "ALT-1".into(),
        timestamp: t0(),
    })
    .await
    .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["type"], "alert");
    assert_eq!(lines[0]["level"], "warning");
    assert_eq!(lines[1]["type"], "alert_cleared");
}
