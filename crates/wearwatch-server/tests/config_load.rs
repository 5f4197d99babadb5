use std::io::Write;
use wearwatch_common::types::AlertLevel;
use wearwatch_server::config::ServerConfig;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn empty_file_uses_defaults() {
    let file = write_config("");
    let config = ServerConfig::load(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.wear_publish_interval_secs, 5);
    assert_eq!(config.forecast_publish_interval_secs, 15);
    assert_eq!(config.command_queue_capacity, 1024);
    assert_eq!(config.engine.history_capacity, 1000);
    assert_eq!(config.engine.health_history_capacity, 500);
    assert_eq!(config.engine.cooldown_secs, 30);
    assert_eq!(config.engine.labor_rate, 45.0);
    assert_eq!(config.thresholds.engine.rpm_critical, 7000.0);
    assert_eq!(config.thresholds.fuel.critical, 5.0);
    assert_eq!(config.maintenance.oil_change, 250.0);
    assert_eq!(config.output.queue_capacity, 256);
    assert_eq!(config.output.sinks.len(), 1);
    assert_eq!(config.output.sinks[0].sink_type, "log");
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let file = write_config(
        r#"
wear_publish_interval_secs = 2

[engine]
cooldown_secs = 60

[thresholds.engine]
rpm_max = 6000.0

[maintenance]
brake_inspection = 450.0

[[output.sinks]]
type = "jsonl"
min_level = "warning"

[output.sinks.config]
path = "/tmp/wearwatch.jsonl"
"#,
    );
    let config = ServerConfig::load(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.wear_publish_interval_secs, 2);
    assert_eq!(config.forecast_publish_interval_secs, 15);
    assert_eq!(config.engine.cooldown_secs, 60);
    assert_eq!(config.engine.labor_rate, 45.0);
    assert_eq!(config.thresholds.engine.rpm_max, 6000.0);
    assert_eq!(config.thresholds.engine.rpm_critical, 7000.0);
    assert_eq!(config.maintenance.brake_inspection, 450.0);
    assert_eq!(config.maintenance.oil_change, 250.0);

    assert_eq!(config.output.sinks.len(), 1);
    let sink = &config.output.sinks[0];
    assert_eq!(sink.sink_type, "jsonl");
    assert_eq!(sink.min_level, AlertLevel::Warning);
    assert_eq!(sink.config["path"], "/tmp/wearwatch.jsonl");
}

#[test]
fn invalid_file_is_an_error() {
    let file = write_config("wear_publish_interval_secs = \"soon\"");
    assert!(ServerConfig::load(file.path().to_str().unwrap()).is_err());
    assert!(ServerConfig::load("/nonexistent/wearwatch.toml").is_err());
}
