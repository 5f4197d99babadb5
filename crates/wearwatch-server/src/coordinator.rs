use crate::config::ServerConfig;
use crate::engine::{EngineContext, EngineStats};
use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use wearwatch_common::types::{
    Alert, AlertLevel, AlertSummary, Component, CostSummary, EngineReading, EnvironmentReading,
    ForecastReport, MaintenanceSchedule, OutputEvent, WearReport,
};
use wearwatch_notify::manager::Publisher;

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("Coordinator: mailbox closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;

/// Which periodic report to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Wear,
    Forecast,
}

enum Command {
    Engine(EngineReading),
    Environment(EnvironmentReading),
    WearState(oneshot::Sender<WearReport>),
    Forecast(oneshot::Sender<ForecastReport>),
    AlertSummary(oneshot::Sender<AlertSummary>),
    ActiveAlerts(Option<AlertLevel>, oneshot::Sender<Vec<Alert>>),
    Acknowledge(String, oneshot::Sender<bool>),
    Clear(String, oneshot::Sender<bool>),
    ResetMaintenance(Component, oneshot::Sender<()>),
    CostFromAlerts(oneshot::Sender<CostSummary>),
    CostFromWear(oneshot::Sender<CostSummary>),
    MaintenanceSchedule(oneshot::Sender<MaintenanceSchedule>),
    Stats(oneshot::Sender<EngineStats>),
    PublishNow(Cadence, oneshot::Sender<()>),
    Shutdown(oneshot::Sender<EngineStats>),
}

/// Cloneable front end of the coordinator task.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| CoordinatorError::Closed)?;
        reply_rx.await.map_err(|_| CoordinatorError::Closed)
    }

    /// Queues an engine/OBD reading. Waits only while the mailbox is full.
    pub async fn ingest_engine(&self, reading: EngineReading) -> Result<()> {
        self.tx
            .send(Command::Engine(reading))
            .await
            .map_err(|_| CoordinatorError::Closed)
    }

    pub async fn ingest_environment(&self, reading: EnvironmentReading) -> Result<()> {
        self.tx
            .send(Command::Environment(reading))
            .await
            .map_err(|_| CoordinatorError::Closed)
    }

    pub async fn wear_state(&self) -> Result<WearReport> {
        self.request(Command::WearState).await
    }

    /// Current forecast, computed on demand and not published.
    pub async fn forecast(&self) -> Result<ForecastReport> {
        self.request(Command::Forecast).await
    }

    pub async fn alert_summary(&self) -> Result<AlertSummary> {
        self.request(Command::AlertSummary).await
    }

    pub async fn active_alerts(&self, level: Option<AlertLevel>) -> Result<Vec<Alert>> {
        self.request(|tx| Command::ActiveAlerts(level, tx)).await
    }

    pub async fn acknowledge(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.request(|tx| Command::Acknowledge(id, tx)).await
    }

    /// Removes an active alert and publishes an `alert_cleared` event.
    pub async fn clear(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.request(|tx| Command::Clear(id, tx)).await
    }

    pub async fn reset_maintenance(&self, component: Component) -> Result<()> {
        self.request(|tx| Command::ResetMaintenance(component, tx)).await
    }

    pub async fn cost_from_alerts(&self) -> Result<CostSummary> {
        self.request(Command::CostFromAlerts).await
    }

    pub async fn cost_from_wear(&self) -> Result<CostSummary> {
        self.request(Command::CostFromWear).await
    }

    pub async fn maintenance_schedule(&self) -> Result<MaintenanceSchedule> {
        self.request(Command::MaintenanceSchedule).await
    }

    pub async fn stats(&self) -> Result<EngineStats> {
        self.request(Command::Stats).await
    }

    /// Runs one publish cycle immediately, outside the timer cadence.
    pub async fn publish_now(&self, cadence: Cadence) -> Result<()> {
        self.request(|tx| Command::PublishNow(cadence, tx)).await
    }

    /// Stops the coordinator after every command already queued has been
    /// processed. Returns the final statistics.
    pub async fn shutdown(&self) -> Result<EngineStats> {
        self.request(Command::Shutdown).await
    }
}

/// Single-writer task that owns the [`EngineContext`].
///
/// Samples, queries and both publish timers are handled one at a time, so a
/// published report never observes a half-applied sample.
pub struct PredictiveCoordinator {
    context: EngineContext,
    publisher: Publisher,
    rx: mpsc::Receiver<Command>,
    wear_period: Duration,
    forecast_period: Duration,
}

impl PredictiveCoordinator {
    pub fn new(config: &ServerConfig, publisher: Publisher) -> (Self, CoordinatorHandle) {
        let (tx, rx) = mpsc::channel(config.command_queue_capacity.max(1));
        let coordinator = Self {
            context: EngineContext::new(config, Utc::now()),
            publisher,
            rx,
            wear_period: Duration::from_secs(config.wear_publish_interval_secs.max(1)),
            forecast_period: Duration::from_secs(config.forecast_publish_interval_secs.max(1)),
        };
        (coordinator, CoordinatorHandle { tx })
    }

    /// Runs until [`CoordinatorHandle::shutdown`] is called or every handle is dropped.
    pub async fn run(mut self) -> EngineStats {
        tracing::info!(
            wear_secs = self.wear_period.as_secs(),
            forecast_secs = self.forecast_period.as_secs(),
            "Predictive coordinator started"
        );

        let mut wear_tick = interval_at(Instant::now() + self.wear_period, self.wear_period);
        wear_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut forecast_tick =
            interval_at(Instant::now() + self.forecast_period, self.forecast_period);
        forecast_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown_reply = loop {
            tokio::select! {
                cmd = self.rx.recv() => match cmd {
                    Some(Command::Shutdown(reply)) => break Some(reply),
                    Some(cmd) => self.handle(cmd),
                    None => break None,
                },
                _ = wear_tick.tick() => self.publish_wear(),
                _ = forecast_tick.tick() => self.publish_forecast(),
            }
        };

        // Commands that were queued behind the shutdown request still run.
        self.rx.close();
        let mut drained = 0usize;
        while let Some(cmd) = self.rx.recv().await {
            match cmd {
                Command::Shutdown(reply) => {
                    let _ = reply.send(self.stats());
                }
                cmd => {
                    self.handle(cmd);
                    drained += 1;
                }
            }
        }

        let stats = self.stats();
        tracing::info!(
            drained,
            engine_samples = stats.engine_samples,
            environment_samples = stats.environment_samples,
            alerts = stats.alerts_raised,
            dropped = stats.outputs_dropped,
            "Predictive coordinator stopped"
        );
        if let Some(reply) = shutdown_reply {
            let _ = reply.send(stats.clone());
        }
        stats
    }

    fn handle(&mut self, cmd: Command) {
        let now = Utc::now();
        match cmd {
            Command::Engine(reading) => {
                let sample = reading.into_sample(now);
                let raised = self.context.ingest_engine(&sample, now);
                self.publish_alerts(raised);
            }
            Command::Environment(reading) => {
                let sample = reading.into_sample(now);
                let raised = self.context.ingest_environment(&sample, now);
                self.publish_alerts(raised);
            }
            Command::WearState(reply) => {
                let _ = reply.send(self.context.wear_report(now));
            }
            Command::Forecast(reply) => {
                let _ = reply.send(self.context.forecast_report(now));
            }
            Command::AlertSummary(reply) => {
                let _ = reply.send(self.context.alert_summary());
            }
            Command::ActiveAlerts(level, reply) => {
                let _ = reply.send(self.context.active_alerts(level));
            }
            Command::Acknowledge(id, reply) => {
                let _ = reply.send(self.context.acknowledge(&id));
            }
            Command::Clear(id, reply) => {
                let cleared = self.context.clear(&id).is_some();
                if cleared {
                    self.publisher.publish(OutputEvent::AlertCleared { id, timestamp: now });
                }
                let _ = reply.send(cleared);
            }
            Command::ResetMaintenance(component, reply) => {
                self.context.reset_maintenance(component, now);
                let _ = reply.send(());
            }
            Command::CostFromAlerts(reply) => {
                let _ = reply.send(self.context.cost_from_alerts(now));
            }
            Command::CostFromWear(reply) => {
                let _ = reply.send(self.context.cost_from_wear(now));
            }
            Command::MaintenanceSchedule(reply) => {
                let _ = reply.send(self.context.maintenance_schedule());
            }
            Command::Stats(reply) => {
                let _ = reply.send(self.stats());
            }
            Command::PublishNow(cadence, reply) => {
                match cadence {
                    Cadence::Wear => self.publish_wear(),
                    Cadence::Forecast => self.publish_forecast(),
                }
                let _ = reply.send(());
            }
            Command::Shutdown(reply) => {
                let _ = reply.send(self.stats());
            }
        }
    }

    fn publish_alerts(&self, alerts: Vec<Alert>) {
        for alert in alerts {
            self.publisher.publish(OutputEvent::Alert(alert));
        }
    }

    fn publish_wear(&mut self) {
        let (raised, report) = self.context.wear_tick(Utc::now());
        self.publish_alerts(raised);
        tracing::debug!(
            overall_health = report.wear_state.overall_health,
            active_alerts = report.active_alerts.len(),
            "Wear report"
        );
        self.publisher.publish(OutputEvent::WearReport(report));
    }

    fn publish_forecast(&mut self) {
        let report = self.context.forecast_tick(Utc::now());
        tracing::debug!(
            predictions = report.all_predictions.len(),
            estimated_cost = report.cost_estimate.total_estimated.average,
            "Forecast report"
        );
        self.publisher.publish(OutputEvent::ForecastReport(report));
    }

    fn stats(&self) -> EngineStats {
        let counters = self.publisher.counters();
        EngineStats {
            outputs_published: counters.published(),
            outputs_dropped: counters.dropped(),
            ..self.context.stats(Utc::now())
        }
    }
}
