use std::sync::Arc;

use anyhow::{Context, Result};
use time::OffsetDateTime;
use tokio::signal::unix::{SignalKind, signal};

use emergency_dashboard::{
    backend::HttpDashboardBackend,
    cli::config_path_from_args,
    config::{Config, config_modified_at},
    controller::{DashboardController, DashboardPorts, DashboardSettings, TracingRenderer},
    logging::init_tracing,
    notifications::StaticNotificationSource,
    storage::FileStorage,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config_path_from_args()?;
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let logging_guard = init_tracing(&config.logging).context("failed to initialize logging")?;

    let storage = FileStorage::open(&config.storage.path).with_context(|| {
        format!(
            "failed to open local storage at {}",
            config.storage.path.display()
        )
    })?;
    let backend =
        HttpDashboardBackend::new(&config.backend).context("failed to construct backend client")?;
    let feed_stamp = config_modified_at(&config_path).unwrap_or_else(|err| {
        tracing::warn!(target: "dashboard.main", error = %err, "config_mtime_unavailable");
        OffsetDateTime::now_utc()
    });
    let notifications =
        StaticNotificationSource::from_feed(&config.notifications.feed, feed_stamp);

    let controller = DashboardController::new(
        DashboardSettings::from_config(&config),
        DashboardPorts {
            backend: Arc::new(backend),
            notifications: Arc::new(notifications),
            storage: Arc::new(storage),
            renderer: Arc::new(TracingRenderer),
        },
    );
    controller.start();

    let mut sigint =
        signal(SignalKind::interrupt()).context("unable to listen for SIGINT (Ctrl+C)")?;
    let mut sigterm = signal(SignalKind::terminate()).context("unable to listen for SIGTERM")?;

    let signal_name = tokio::select! {
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
    };

    tracing::info!(
        target: "dashboard.main",
        signal = signal_name,
        run_id = logging_guard.run_id(),
        "shutdown_requested"
    );
    controller.stop().await;

    eprintln!("emergency dashboard stopped: received {signal_name}");
    Ok(())
}
