use crate::error::{NotifyError, Result};
use crate::plugin::SinkPlugin;
use crate::OutputSink;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use wearwatch_common::types::OutputEvent;

#[derive(Debug, Deserialize)]
struct JsonlConfig {
    /// Appended to when set; stdout otherwise.
    path: Option<PathBuf>,
}

/// Appends one JSON document per event.
pub struct JsonlSink {
    instance_id: String,
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl JsonlSink {
    pub fn stdout(instance_id: &str) -> Self {
        Self::with_writer(instance_id, Box::new(tokio::io::stdout()))
    }

    pub fn open(instance_id: &str, path: &std::path::Path) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self::with_writer(
            instance_id,
            Box::new(tokio::fs::File::from_std(file)),
        ))
    }

    pub fn with_writer(instance_id: &str, writer: Box<dyn AsyncWrite + Send + Unpin>) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            writer: Mutex::new(writer),
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }
}

#[async_trait]
impl OutputSink for JsonlSink {
    async fn send(&self, event: &OutputEvent) -> Result<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "jsonl"
    }
}

pub struct JsonlPlugin;

impl JsonlPlugin {
    fn parse(config: &Value) -> Result<JsonlConfig> {
        if config.is_null() {
            return Ok(JsonlConfig { path: None });
        }
        Ok(serde_json::from_value(config.clone())?)
    }
}

impl SinkPlugin for JsonlPlugin {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        let parsed = Self::parse(config)?;
        if parsed.path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(NotifyError::InvalidConfig(
                "jsonl sink path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn create_sink(&self, instance_id: &str, config: &Value) -> Result<Box<dyn OutputSink>> {
        let sink = match Self::parse(config)?.path {
            Some(path) => JsonlSink::open(instance_id, &path)?,
            None => JsonlSink::stdout(instance_id),
        };
        Ok(Box::new(sink))
    }
}
