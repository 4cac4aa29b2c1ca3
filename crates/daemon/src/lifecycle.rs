// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use ka_adapters::{
    DisabledService, Login1Service, NameWatcher, PowerManagementService, ServiceError,
    SessionManager, SessionManagerService, TracedHandleService, TracedTokenService,
};
use ka_core::{BackendId, Config, ConfigError};
use ka_engine::{
    HandleInhibitor, Inhibitor, Runtime, RuntimeConfig, RuntimeDeps, RuntimeError, RuntimeHandle,
    TokenInhibitor,
};
use std::path::PathBuf;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use zbus::Connection;

/// Daemon errors
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("log file path has no file name: {0}")]
    LogPath(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which message bus a backend's service lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bus {
    Session,
    System,
}

impl Bus {
    pub fn of(backend: BackendId) -> Self {
        match backend {
            BackendId::GnomeSession | BackendId::MateSession | BackendId::PowerManagement => {
                Bus::Session
            }
            BackendId::Login1 => Bus::System,
        }
    }

    async fn connect(self) -> Option<Connection> {
        let result = match self {
            Bus::Session => Connection::session().await,
            Bus::System => Connection::system().await,
        };
        match result {
            Ok(conn) => Some(conn),
            Err(e) => {
                warn!(bus = ?self, error = %e, "could not connect to bus");
                None
            }
        }
    }
}

/// Well-known name whose owner provides the backend's service
pub fn service_name(backend: BackendId) -> &'static str {
    match backend {
        BackendId::GnomeSession => SessionManager::Gnome.bus_name(),
        BackendId::MateSession => SessionManager::Mate.bus_name(),
        BackendId::PowerManagement => PowerManagementService::BUS_NAME,
        BackendId::Login1 => Login1Service::BUS_NAME,
    }
}

/// Running daemon
pub struct Daemon {
    pub handle: RuntimeHandle,
    runtime: JoinHandle<()>,
    watchers: Vec<JoinHandle<()>>,
}

impl Daemon {
    /// Release the inhibition and stop every task
    pub async fn shutdown(self) -> Result<(), DaemonError> {
        info!("Shutting down daemon...");

        match self.handle.shutdown().await {
            Ok(()) => {}
            Err(RuntimeError::Stopped) => warn!("runtime had already stopped"),
            Err(e) => return Err(e.into()),
        }

        for watcher in &self.watchers {
            watcher.abort();
        }
        if let Err(e) = self.runtime.await {
            warn!(error = %e, "runtime task ended abnormally");
        }

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Connect to the buses, build every backend and start the runtime
pub async fn startup(config: &Config) -> Result<Daemon, DaemonError> {
    let session = Bus::Session.connect().await;
    let system = Bus::System.connect().await;

    let mut backends: Vec<Box<dyn Inhibitor>> = Vec::with_capacity(BackendId::COUNT);
    let mut watched = Vec::new();
    let mut unwatched = Vec::new();

    for backend in BackendId::ALL {
        let conn = match Bus::of(backend) {
            Bus::Session => session.as_ref(),
            Bus::System => system.as_ref(),
        };

        let live = match conn {
            _ if !config.is_enabled(backend) => {
                info!(%backend, "backend disabled by config");
                None
            }
            None => None,
            Some(conn) => match live_backend(backend, conn).await {
                Ok(slot) => Some((slot, conn.clone())),
                Err(e) => {
                    warn!(%backend, error = %e, "could not set up backend");
                    None
                }
            },
        };

        match live {
            Some((slot, conn)) => {
                backends.push(slot);
                watched.push((backend, NameWatcher::new(conn, service_name(backend))));
            }
            None => {
                backends.push(disabled_backend(backend));
                unwatched.push(backend);
            }
        }
    }

    let (runtime, handle) = Runtime::new(
        RuntimeDeps { backends },
        RuntimeConfig {
            app_id: config.app_id.clone(),
            ..RuntimeConfig::default()
        },
    )?;
    let runtime = tokio::spawn(runtime.run());

    // Backends without a watcher report once so startup can complete
    for backend in unwatched {
        handle.set_available(backend, false)?;
    }
    let watchers = watched
        .into_iter()
        .map(|(backend, watcher)| spawn_watcher(backend, watcher, handle.clone()))
        .collect();

    info!(app_id = %config.app_id, "Daemon started");

    Ok(Daemon {
        handle,
        runtime,
        watchers,
    })
}

async fn live_backend(
    backend: BackendId,
    conn: &Connection,
) -> Result<Box<dyn Inhibitor>, ServiceError> {
    let slot: Box<dyn Inhibitor> = match backend {
        BackendId::GnomeSession => {
            let service = SessionManagerService::new(conn, SessionManager::Gnome).await?;
            Box::new(TokenInhibitor::new(
                backend,
                TracedTokenService::new(backend, service),
            ))
        }
        BackendId::MateSession => {
            let service = SessionManagerService::new(conn, SessionManager::Mate).await?;
            Box::new(TokenInhibitor::new(
                backend,
                TracedTokenService::new(backend, service),
            ))
        }
        BackendId::PowerManagement => {
            let service = PowerManagementService::new(conn).await?;
            Box::new(TokenInhibitor::new(
                backend,
                TracedTokenService::new(backend, service),
            ))
        }
        BackendId::Login1 => {
            let service = Login1Service::new(conn).await?;
            Box::new(HandleInhibitor::new(
                backend,
                TracedHandleService::new(backend, service),
            ))
        }
    };
    Ok(slot)
}

fn disabled_backend(backend: BackendId) -> Box<dyn Inhibitor> {
    match backend {
        BackendId::Login1 => Box::new(HandleInhibitor::new(backend, DisabledService::new())),
        _ => Box::new(TokenInhibitor::new(backend, DisabledService::new())),
    }
}

fn spawn_watcher(
    backend: BackendId,
    watcher: NameWatcher,
    handle: RuntimeHandle,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let report = handle.clone();
        let result = watcher
            .watch(move |present| {
                if report.set_available(backend, present).is_err() {
                    tracing::debug!(%backend, "runtime stopped, presence change dropped");
                }
            })
            .await;
        if let Err(e) = result {
            warn!(%backend, error = %e, "presence watch failed");
        }
        // Without a watch there is no way to tell the service is there
        let _ = handle.set_available(backend, false);
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
