use serde::Deserialize;
use wearwatch_common::thresholds::{MaintenanceIntervals, Thresholds};
use wearwatch_common::types::AlertLevel;
use wearwatch_notify::manager::DEFAULT_QUEUE_CAPACITY;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_wear_publish_interval_secs")]
    pub wear_publish_interval_secs: u64,
    #[serde(default = "default_forecast_publish_interval_secs")]
    pub forecast_publish_interval_secs: u64,
    #[serde(default = "default_command_queue_capacity")]
    pub command_queue_capacity: usize,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub maintenance: MaintenanceIntervals,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_health_history_capacity")]
    pub health_history_capacity: usize,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_labor_rate")]
    pub labor_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            health_history_capacity: default_health_history_capacity(),
            cooldown_secs: default_cooldown_secs(),
            labor_rate: default_labor_rate(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkConfig>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_output_queue_capacity(),
            sinks: default_sinks(),
        }
    }
}

/// One `[[output.sinks]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    #[serde(rename = "type")]
    pub sink_type: String,
    #[serde(default = "default_min_level")]
    pub min_level: AlertLevel,
    #[serde(default)]
    pub config: serde_json::Value,
}

fn default_wear_publish_interval_secs() -> u64 {
    5
}

fn default_forecast_publish_interval_secs() -> u64 {
    15
}

fn default_command_queue_capacity() -> usize {
    1024
}

fn default_history_capacity() -> usize {
    wearwatch_predict::history::DEFAULT_CAPACITY
}

fn default_health_history_capacity() -> usize {
    wearwatch_predict::forecast::DEFAULT_HEALTH_CAPACITY
}

fn default_cooldown_secs() -> u64 {
    wearwatch_alert::engine::DEFAULT_COOLDOWN_SECS
}

fn default_labor_rate() -> f64 {
    wearwatch_predict::cost::DEFAULT_LABOR_RATE
}

fn default_output_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_min_level() -> AlertLevel {
    AlertLevel::Info
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![SinkConfig {
        sink_type: "log".to_string(),
        min_level: default_min_level(),
        config: serde_json::Value::Null,
    }]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            wear_publish_interval_secs: default_wear_publish_interval_secs(),
            forecast_publish_interval_secs: default_forecast_publish_interval_secs(),
            command_queue_capacity: default_command_queue_capacity(),
            engine: EngineConfig::default(),
            thresholds: Thresholds::default(),
            maintenance: MaintenanceIntervals::default(),
            output: OutputConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
