use crate::routing::SinkRoute;
use crate::OutputSink;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use wearwatch_common::types::OutputEvent;

pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Counters shared between the publisher and whoever reports statistics.
#[derive(Debug, Default)]
pub struct OutputCounters {
    published: AtomicU64,
    dropped: AtomicU64,
}

impl OutputCounters {
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Non-blocking handle the engine publishes through.
///
/// When the queue is full the new event is dropped and counted; the caller
/// never waits on a slow sink.
#[derive(Clone)]
pub struct Publisher {
    tx: mpsc::Sender<OutputEvent>,
    counters: Arc<OutputCounters>,
}

impl Publisher {
    /// Returns true when the event was queued.
    pub fn publish(&self, event: OutputEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => {
                self.counters.published.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(event)) => {
                let dropped = self.counters.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(kind = event.kind(), dropped, "Output queue full, event dropped");
                false
            }
            Err(TrySendError::Closed(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(kind = event.kind(), "Output queue closed, event dropped");
                false
            }
        }
    }

    pub fn counters(&self) -> Arc<OutputCounters> {
        self.counters.clone()
    }
}

/// Creates the bounded output queue.
pub fn output_queue(capacity: usize) -> (Publisher, mpsc::Receiver<OutputEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let publisher = Publisher {
        tx,
        counters: Arc::new(OutputCounters::default()),
    };
    (publisher, rx)
}

/// Drains the output queue into the configured sinks.
pub struct Dispatcher {
    sinks: Vec<Box<dyn OutputSink>>,
    routes: Vec<SinkRoute>,
}

impl Dispatcher {
    pub fn new(sinks: Vec<Box<dyn OutputSink>>, routes: Vec<SinkRoute>) -> Self {
        Self { sinks, routes }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Runs until every [`Publisher`] is dropped and the queue is empty.
    pub async fn run(self, mut rx: mpsc::Receiver<OutputEvent>) {
        tracing::info!(sinks = self.sinks.len(), "Output dispatcher started");
        let mut delivered = 0u64;
        while let Some(event) = rx.recv().await {
            self.dispatch(&event).await;
            delivered += 1;
        }
        tracing::info!(delivered, "Output dispatcher stopped");
    }

    pub async fn dispatch(&self, event: &OutputEvent) {
        for route in &self.routes {
            if !route.should_send(event) {
                continue;
            }
            let Some(sink) = self.sinks.get(route.sink_index) else {
                tracing::error!(index = route.sink_index, "Route points at a missing sink");
                continue;
            };
            if let Err(e) = sink.send(event).await {
                tracing::error!(
                    sink = sink.sink_name(),
                    kind = event.kind(),
                    error = %e,
                    "Failed to deliver output"
                );
            }
        }
    }
}
