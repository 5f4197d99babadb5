use crate::coordinator::{CoordinatorError, CoordinatorHandle};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use wearwatch_common::types::{EngineReading, EnvironmentReading};

/// One inbound JSON line, tagged by the stream it belongs to.
///
/// ```
/// use wearwatch_server::ingest::{parse_line, Inbound};
///
/// let line = r#"{"stream": "obd", "rpm": 3200, "speed": 80}"#;
/// assert!(matches!(parse_line(line), Ok(Inbound::Engine(_))));
/// ```
#[derive(Debug, Deserialize)]
#[serde(tag = "stream")]
pub enum Inbound {
    #[serde(rename = "obd", alias = "engine")]
    Engine(EngineReading),
    #[serde(rename = "sensors", alias = "environment")]
    Environment(EnvironmentReading),
}

pub fn parse_line(line: &str) -> serde_json::Result<Inbound> {
    serde_json::from_str(line)
}

/// Feeds JSON lines into the coordinator until EOF.
///
/// Malformed lines are logged and skipped. Returns the number of accepted
/// readings, or an error once the coordinator has gone away.
pub async fn forward_lines<R>(reader: R, handle: &CoordinatorHandle) -> Result<u64, CoordinatorError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut accepted = 0u64;
    let mut line_no = 0u64;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Input stream failed");
                break;
            }
        };
        line_no += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_line(trimmed) {
            Ok(Inbound::Engine(reading)) => handle.ingest_engine(reading).await?,
            Ok(Inbound::Environment(reading)) => handle.ingest_environment(reading).await?,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "Skipping malformed input line");
                continue;
            }
        }
        accepted += 1;
    }
    tracing::info!(accepted, lines = line_no, "Input stream closed");
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_tags() {
        match parse_line(r#"{"stream":"sensors","vibration":6.5}"#).unwrap() {
            Inbound::Environment(r) => {
                assert_eq!(r.vibration, Some(6.5));
                assert_eq!(r.pressure, None);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            parse_line(r#"{"stream":"engine"}"#).unwrap(),
            Inbound::Engine(_)
        ));
    }

    #[test]
    fn rejects_unknown_stream_and_garbage() {
        assert!(parse_line(r#"{"stream":"gps","lat":1.0}"#).is_err());
        assert!(parse_line(r#"{"rpm":3000}"#).is_err());
        assert!(parse_line("not json").is_err());
    }
}
