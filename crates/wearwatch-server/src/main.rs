use anyhow::Result;
use tokio::io::BufReader;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use wearwatch_notify::plugin::SinkRegistry;
use wearwatch_server::config::ServerConfig;
use wearwatch_server::coordinator::PredictiveCoordinator;
use wearwatch_server::{ingest, output};

const DEFAULT_CONFIG_PATH: &str = "config/server.toml";

fn load_config(explicit: Option<&str>) -> Result<ServerConfig> {
    match explicit {
        Some(path) => ServerConfig::load(path),
        None if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
            ServerConfig::load(DEFAULT_CONFIG_PATH)
        }
        None => {
            tracing::info!(path = DEFAULT_CONFIG_PATH, "No config file, using built-in defaults");
            Ok(ServerConfig::default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wearwatch=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1).map(String::as_str))?;

    tracing::info!(
        wear_interval = config.wear_publish_interval_secs,
        forecast_interval = config.forecast_publish_interval_secs,
        sinks = config.output.sinks.len(),
        "Starting wearwatch server"
    );

    let dispatcher = output::build_dispatcher(&config.output, &SinkRegistry::default())?;
    if dispatcher.sink_count() == 0 {
        tracing::warn!("No output sinks configured, published events will be discarded");
    }
    let (publisher, output_rx) =
        wearwatch_notify::manager::output_queue(config.output.queue_capacity);
    let dispatcher_handle = tokio::spawn(dispatcher.run(output_rx));

    let (coordinator, handle) = PredictiveCoordinator::new(&config, publisher);
    let coordinator_handle = tokio::spawn(coordinator.run());

    let input_handle = handle.clone();
    let ingest_task = tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        ingest::forward_lines(stdin, &input_handle).await
    });

    tokio::select! {
        result = ingest_task => {
            match result {
                Ok(Ok(accepted)) => tracing::info!(accepted, "Input finished"),
                Ok(Err(e)) => tracing::error!(error = %e, "Input forwarding stopped"),
                Err(e) => tracing::error!(error = %e, "Input task panicked"),
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("Received shutdown signal");
        }
    }

    match handle.shutdown().await {
        Ok(stats) => tracing::info!(
            engine_samples = stats.engine_samples,
            environment_samples = stats.environment_samples,
            alerts = stats.alerts_raised,
            uptime_secs = stats.uptime_secs,
            "Engine drained"
        ),
        Err(e) => tracing::warn!(error = %e, "Coordinator already stopped"),
    }
    drop(handle);

    // The coordinator owns the only publisher; once it returns the dispatcher
    // drains what is left and exits.
    coordinator_handle.await?;
    dispatcher_handle.await?;

    tracing::info!("Server stopped");
    Ok(())
}
