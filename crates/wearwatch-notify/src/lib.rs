//! Output side of the engine.
//!
//! The engine hands owned [`OutputEvent`]s to a bounded, non-blocking
//! [`manager::Publisher`]. A [`manager::Dispatcher`] task drains the queue and
//! delivers each event to the configured [`OutputSink`]s, filtered per sink by
//! alert level. Built-in sinks: `log` (structured tracing) and `jsonl`
//! (one JSON document per line, to a file or stdout).

pub mod channels;
pub mod error;
pub mod manager;
pub mod plugin;
pub mod routing;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use wearwatch_common::types::OutputEvent;

/// A destination for published alerts and snapshots.
///
/// Implementations are created by the matching [`plugin::SinkPlugin`].
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be written; the dispatcher
    /// logs it and moves on.
    async fn send(&self, event: &OutputEvent) -> error::Result<()>;

    /// Returns the sink type name (e.g. `"log"`, `"jsonl"`).
    fn sink_name(&self) -> &str;
}
