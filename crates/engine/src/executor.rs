// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use crate::error::RuntimeError;
use crate::inhibitor::{CallOutcome, Completer, Inhibitor};
use crate::runtime::Message;
use ka_core::{BackendId, BackendStates, Effect, Notification, Status};
use tokio::sync::{broadcast, mpsc, watch};

/// The backend slots, one per [`BackendId`] in priority order
pub struct Backends {
    slots: Vec<Box<dyn Inhibitor>>,
}

impl Backends {
    /// Validate that `slots` holds exactly one backend per id, in priority order
    pub fn new(slots: Vec<Box<dyn Inhibitor>>) -> Result<Self, RuntimeError> {
        if slots.len() != BackendId::COUNT {
            return Err(RuntimeError::BackendCount {
                expected: BackendId::COUNT,
                actual: slots.len(),
            });
        }
        for (index, (slot, expected)) in slots.iter().zip(BackendId::ALL).enumerate() {
            if slot.id() != expected {
                return Err(RuntimeError::BackendOrder {
                    index,
                    expected,
                    actual: slot.id(),
                });
            }
        }
        Ok(Self { slots })
    }

    pub fn get(&self, backend: BackendId) -> &dyn Inhibitor {
        self.slots[backend.index()].as_ref()
    }

    pub fn get_mut(&mut self, backend: BackendId) -> &mut dyn Inhibitor {
        self.slots[backend.index()].as_mut()
    }

    /// Returns false if the presence did not change
    pub fn set_available(&mut self, backend: BackendId, available: bool) -> bool {
        self.get_mut(backend).set_available(available)
    }

    pub fn finish(&mut self, backend: BackendId, outcome: CallOutcome) {
        self.get_mut(backend).finish(outcome);
    }

    /// Any backend has a call outstanding
    pub fn any_busy(&self) -> bool {
        self.slots.iter().any(|slot| slot.busy())
    }
}

impl BackendStates for Backends {
    fn available(&self, backend: BackendId) -> bool {
        self.get(backend).available()
    }

    fn inhibited(&self, backend: BackendId) -> bool {
        self.get(backend).inhibited()
    }
}

/// Executes coordinator effects against the backends and observers
pub struct Executor {
    app_id: String,
    backends: Backends,
    tx: mpsc::UnboundedSender<Message>,
    status: watch::Sender<Status>,
    notifications: broadcast::Sender<Notification>,
}

impl Executor {
    pub(crate) fn new(
        app_id: String,
        backends: Backends,
        tx: mpsc::UnboundedSender<Message>,
        status: watch::Sender<Status>,
        notifications: broadcast::Sender<Notification>,
    ) -> Self {
        Self {
            app_id,
            backends,
            tx,
            status,
            notifications,
        }
    }

    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    pub fn backends_mut(&mut self) -> &mut Backends {
        &mut self.backends
    }

    /// Execute a single effect with tracing
    pub fn execute(&mut self, effect: Effect) {
        let span = tracing::debug_span!("effect", effect = effect.name());
        let _guard = span.enter();

        tracing::debug!(fields = ?effect.fields(), "executing");

        match effect {
            Effect::Inhibit { backend, reason } => {
                let done = Completer::new(backend, self.tx.clone());
                self.backends
                    .get_mut(backend)
                    .inhibit(&self.app_id, &reason, done);
            }
            Effect::Uninhibit { backend } => {
                let done = Completer::new(backend, self.tx.clone());
                self.backends.get_mut(backend).uninhibit(done);
            }
            Effect::ScheduleProcess => {
                if self.tx.send(Message::Process).is_err() {
                    tracing::warn!("event loop closed, processing pass dropped");
                }
            }
            Effect::Notify(notification) => {
                if let Notification::Status(status) = notification {
                    self.status.send_replace(status);
                }
                // Nobody listening is fine
                let _ = self.notifications.send(notification);
            }
        }
    }

    pub fn execute_all(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute(effect);
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
