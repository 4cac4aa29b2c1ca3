// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime for the Keep Awake engine
//!
//! A single task owns the coordinator and every backend. Caller requests,
//! presence changes and call outcomes all arrive as [`Message`]s on one queue
//! and are handled one at a time, so no handler ever runs re-entrantly.

use crate::error::RuntimeError;
use crate::executor::{Backends, Executor};
use crate::inhibitor::{CallOutcome, Inhibitor};
use ka_core::{BackendId, Coordinator, Event, Notification, Request, Status};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Quiet polls before `run_until_idle` gives up waiting for more messages
const IDLE_ROUNDS: usize = 16;

/// Everything the event loop reacts to
#[derive(Debug)]
pub(crate) enum Message {
    Request(Request),
    Availability { backend: BackendId, available: bool },
    Finished { backend: BackendId, outcome: CallOutcome },
    Process,
    Shutdown(oneshot::Sender<()>),
}

/// Runtime settings
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Application name sent to the services with every inhibit call
    pub app_id: String,
    /// How long shutdown waits for the held lock to be released
    pub shutdown_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            app_id: "kad".to_string(),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

/// Runtime backend dependencies
pub struct RuntimeDeps {
    /// One backend per [`BackendId`], in priority order
    pub backends: Vec<Box<dyn Inhibitor>>,
}

/// Runtime that coordinates the backends
pub struct Runtime {
    coordinator: Coordinator,
    executor: Executor,
    rx: mpsc::UnboundedReceiver<Message>,
    shutdown_timeout: Duration,
}

/// Cloneable handle for talking to a running [`Runtime`]
#[derive(Clone)]
pub struct RuntimeHandle {
    tx: mpsc::UnboundedSender<Message>,
    status: watch::Receiver<Status>,
    notifications: broadcast::Sender<Notification>,
}

impl Runtime {
    /// Create a new runtime and the handle that drives it
    pub fn new(
        deps: RuntimeDeps,
        config: RuntimeConfig,
    ) -> Result<(Self, RuntimeHandle), RuntimeError> {
        let backends = Backends::new(deps.backends)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(Status::default());
        let (notifications, _) = broadcast::channel(64);

        let executor = Executor::new(
            config.app_id,
            backends,
            tx.clone(),
            status_tx,
            notifications.clone(),
        );
        let runtime = Self {
            coordinator: Coordinator::new(),
            executor,
            rx,
            shutdown_timeout: config.shutdown_timeout,
        };
        let handle = RuntimeHandle {
            tx,
            status,
            notifications,
        };
        Ok((runtime, handle))
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn backends(&self) -> &Backends {
        self.executor.backends()
    }

    /// Run until shut down through a [`RuntimeHandle`]
    ///
    /// Releases any held lock before returning. Backends are dropped with the
    /// runtime, which closes any handle that is still open.
    pub async fn run(mut self) {
        tracing::info!("runtime started");

        let mut waiters = Vec::new();
        while let Some(message) = self.rx.recv().await {
            if let Some(reply) = self.handle(message) {
                waiters.push(reply);
                break;
            }
        }

        self.release(&mut waiters).await;
        drop(self);

        tracing::info!("runtime stopped");
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }

    /// Handle the next queued message, waiting for one if needed.
    ///
    /// Returns false once a shutdown has been requested.
    pub async fn step(&mut self) -> bool {
        match self.rx.recv().await {
            Some(message) => match self.handle(message) {
                Some(reply) => {
                    let _ = reply.send(());
                    false
                }
                None => true,
            },
            None => false,
        }
    }

    /// Handle messages until the queue stays empty for a while.
    ///
    /// Lets spawned backend calls finish in between, so with services that
    /// answer immediately everything outstanding has settled on return.
    pub async fn run_until_idle(&mut self) {
        let mut quiet = 0;
        while quiet < IDLE_ROUNDS {
            match self.rx.try_recv() {
                Ok(message) => {
                    quiet = 0;
                    if let Some(reply) = self.handle(message) {
                        let _ = reply.send(());
                    }
                }
                Err(_) => {
                    quiet += 1;
                    tokio::task::yield_now().await;
                }
            }
        }
    }

    /// Handle one message. Returns the reply channel of a shutdown request.
    fn handle(&mut self, message: Message) -> Option<oneshot::Sender<()>> {
        let event = match message {
            Message::Request(request) => Event::Requested(request),
            Message::Availability { backend, available } => {
                let changed = self
                    .executor
                    .backends_mut()
                    .set_available(backend, available);
                if !changed && self.coordinator.is_ready() {
                    tracing::trace!(%backend, available, "presence unchanged");
                    return None;
                }
                Event::AvailabilityChanged { backend, available }
            }
            Message::Finished { backend, outcome } => {
                self.executor.backends_mut().finish(backend, outcome);
                Event::InhibitedChanged { backend }
            }
            Message::Process => Event::Process,
            Message::Shutdown(reply) => return Some(reply),
        };

        tracing::trace!(event = event.name(), "handling");
        let effects = self.coordinator.handle(event, self.executor.backends());
        self.executor.execute_all(effects);
        None
    }

    fn is_settled(&self) -> bool {
        self.coordinator.started().is_none()
            && self.coordinator.pending().is_none()
            && !self.executor.backends().any_busy()
    }

    /// Release the held lock before the backends go away
    async fn release(&mut self, waiters: &mut Vec<oneshot::Sender<()>>) {
        if !self.coordinator.is_ready() {
            return;
        }
        if !self.coordinator.inhibited() && self.is_settled() {
            return;
        }

        tracing::info!("releasing inhibition before shutdown");
        self.handle(Message::Request(Request::Uninhibit));

        let timeout = self.shutdown_timeout;
        let drain = async {
            while !self.is_settled() {
                match self.rx.recv().await {
                    Some(Message::Request(request)) => {
                        tracing::debug!(
                            request = request.name(),
                            "ignoring request during shutdown"
                        );
                    }
                    Some(message) => {
                        if let Some(reply) = self.handle(message) {
                            waiters.push(reply);
                        }
                    }
                    None => break,
                }
            }
        };
        if tokio::time::timeout(timeout, drain).await.is_err() {
            tracing::warn!(?timeout, "timed out releasing inhibition");
        }
    }
}

impl RuntimeHandle {
    fn send(&self, message: Message) -> Result<(), RuntimeError> {
        self.tx.send(message).map_err(|_| RuntimeError::Stopped)
    }

    /// Ask for sleep to be inhibited with `reason`
    pub fn inhibit(&self, reason: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(Message::Request(Request::inhibit(reason)))
    }

    /// Ask for sleep to be allowed again
    pub fn uninhibit(&self) -> Result<(), RuntimeError> {
        self.send(Message::Request(Request::Uninhibit))
    }

    /// Report whether a backend's service is reachable
    pub fn set_available(&self, backend: BackendId, available: bool) -> Result<(), RuntimeError> {
        self.send(Message::Availability { backend, available })
    }

    /// Observe `inhibited` and `active_backend`
    pub fn status(&self) -> watch::Receiver<Status> {
        self.status.clone()
    }

    /// Subscribe to every notification raised after this call
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Stop the runtime, releasing any held lock first
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (reply, done) = oneshot::channel();
        self.send(Message::Shutdown(reply))?;
        done.await.map_err(|_| RuntimeError::Stopped)
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
