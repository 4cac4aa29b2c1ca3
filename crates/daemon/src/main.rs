// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keep Awake Daemon (kad)
//!
//! Holds a sleep inhibition through whichever backend is available.
//! `SIGUSR1` inhibits, `SIGUSR2` releases, `SIGINT`/`SIGTERM` stop the daemon.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;
mod policy;

use std::path::Path;

use ka_core::{Config, Notification};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::lifecycle::DaemonError;
use crate::policy::{FailureReporter, Report};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional positional argument overrides the configured reason
    let args: Vec<String> = std::env::args().collect();

    // Load configuration
    let config_path = Config::resolve_path()?;
    let config = Config::load(&config_path)?;
    let reason = args.get(1).cloned().unwrap_or_else(|| config.reason.clone());

    // Set up logging
    let _log_guard = setup_logging(&config)?;

    info!(config = %config_path.display(), "Starting kad");

    let daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigusr1 = signal(SignalKind::user_defined1())?;
    let mut sigusr2 = signal(SignalKind::user_defined2())?;

    // Subscribe before the first request so its outcome is seen
    let mut notifications = daemon.handle.notifications();
    let mut reporter = FailureReporter::new();

    if config.inhibit_on_start {
        daemon.handle.inhibit(reason.clone())?;
    }

    // Main event loop
    loop {
        tokio::select! {
            _ = sigusr1.recv() => {
                info!("Received SIGUSR1, inhibiting sleep");
                daemon.handle.inhibit(reason.clone())?;
            }

            _ = sigusr2.recv() => {
                info!("Received SIGUSR2, allowing sleep");
                daemon.handle.uninhibit()?;
            }

            result = notifications.recv() => match result {
                Ok(notification) => log_notification(&mut reporter, &notification),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "notification stream lagged");
                }
                Err(RecvError::Closed) => {
                    error!("runtime stopped unexpectedly");
                    break;
                }
            },

            // Graceful shutdown on SIGTERM
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            // Graceful shutdown on SIGINT
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
        }
    }

    daemon.shutdown().await?;
    info!("Daemon stopped");
    Ok(())
}

fn log_notification(reporter: &mut FailureReporter, notification: &Notification) {
    match notification {
        Notification::Status(status) => info!(
            inhibited = status.inhibited,
            backend = ?status.active_backend,
            "inhibition status changed"
        ),
        Notification::UninhibitFinished { success: false } => {
            warn!("could not release the sleep inhibition")
        }
        _ => {}
    }

    match reporter.observe(notification) {
        Some(Report::Failed) => error!("no backend could inhibit sleep"),
        Some(Report::StillFailing) => debug!("inhibit still failing"),
        Some(Report::Recovered) => info!("sleep inhibited again"),
        None => {}
    }
}

fn setup_logging(
    config: &Config,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, DaemonError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (file_layer, guard) = match &config.log_file {
        Some(path) => {
            let name = path
                .file_name()
                .ok_or_else(|| DaemonError::LogPath(path.clone()))?;
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or(Path::new("."));

            // Create log directory if needed
            std::fs::create_dir_all(dir)?;

            let file_appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}
