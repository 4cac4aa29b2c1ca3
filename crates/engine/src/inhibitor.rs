// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backends that own a lock resource and talk to one remote service.
//!
//! An inhibitor never blocks the event loop. `inhibit` and `uninhibit` start
//! a call and return; the outcome is posted back to the loop through a
//! [`Completer`] and applied with [`Inhibitor::finish`]. Every started call
//! produces exactly one outcome.

use crate::runtime::Message;
use ka_adapters::{HandleService, ServiceError, TokenService};
use ka_core::{BackendId, Resource};
use tokio::sync::mpsc;

/// Result of one backend call
#[derive(Debug)]
pub enum CallOutcome {
    /// The service granted a lock. `Resource::Empty` means it answered without one.
    Acquired(Resource),
    Released,
    Failed(ServiceError),
}

impl CallOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            CallOutcome::Acquired(_) => "acquired",
            CallOutcome::Released => "released",
            CallOutcome::Failed(_) => "failed",
        }
    }
}

/// Posts the outcome of a call back to the event loop
#[derive(Debug, Clone)]
pub struct Completer {
    backend: BackendId,
    tx: mpsc::UnboundedSender<Message>,
}

impl Completer {
    pub(crate) fn new(backend: BackendId, tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { backend, tx }
    }

    pub fn finish(self, outcome: CallOutcome) {
        let backend = self.backend;
        if self.tx.send(Message::Finished { backend, outcome }).is_err() {
            // Any resource in the outcome is dropped (and so released) here
            tracing::debug!(%backend, "event loop gone, discarding call outcome");
        }
    }
}

/// One backend slot as the event loop sees it
pub trait Inhibitor: Send {
    fn id(&self) -> BackendId;

    /// A live connection to the service exists
    fn available(&self) -> bool;

    /// A lock resource is held
    fn inhibited(&self) -> bool;

    /// A call is outstanding
    fn busy(&self) -> bool;

    /// Record a presence change. Returns false if nothing changed.
    ///
    /// Losing the service drops any held resource.
    fn set_available(&mut self, available: bool) -> bool;

    /// Start acquiring a lock. No-op if one is already held.
    fn inhibit(&mut self, app: &str, reason: &str, done: Completer);

    /// Start releasing the held lock. No-op if none is held.
    fn uninhibit(&mut self, done: Completer);

    /// Apply the outcome of a call started by `inhibit` or `uninhibit`
    fn finish(&mut self, outcome: CallOutcome);
}

/// State shared by both backend shapes
#[derive(Debug)]
struct Slot {
    id: BackendId,
    available: bool,
    resource: Resource,
    busy: bool,
}

impl Slot {
    fn new(id: BackendId) -> Self {
        Self {
            id,
            available: false,
            resource: Resource::Empty,
            busy: false,
        }
    }

    fn set_available(&mut self, available: bool) -> bool {
        if self.available == available {
            return false;
        }
        self.available = available;
        if !available && self.resource.is_held() {
            let lost = self.resource.take();
            tracing::warn!(
                backend = %self.id,
                resource = lost.kind(),
                "service vanished, dropping its lock"
            );
        }
        true
    }

    /// Check the call preconditions shared by inhibit and uninhibit
    fn can_start(&self, call: &'static str) -> bool {
        if self.busy {
            tracing::warn!(backend = %self.id, call, "call already in flight, ignoring");
            return false;
        }
        true
    }

    fn finish(&mut self, outcome: CallOutcome) {
        let backend = self.id;
        if !self.busy {
            tracing::warn!(
                %backend,
                outcome = outcome.name(),
                "outcome without a call in flight"
            );
        }
        self.busy = false;

        match outcome {
            CallOutcome::Acquired(resource) if !resource.is_held() => {
                tracing::warn!(%backend, "service did not grant a lock");
            }
            CallOutcome::Acquired(resource) if !self.available => {
                tracing::warn!(
                    %backend,
                    resource = resource.kind(),
                    "lock granted after service vanished, discarding"
                );
            }
            CallOutcome::Acquired(resource) if self.resource.is_held() => {
                tracing::warn!(
                    %backend,
                    resource = resource.kind(),
                    "lock already held, discarding the new one"
                );
            }
            CallOutcome::Acquired(resource) => {
                tracing::info!(%backend, resource = resource.kind(), "lock acquired");
                self.resource = resource;
            }
            CallOutcome::Released => {
                tracing::info!(%backend, "lock released");
                self.resource = Resource::Empty;
            }
            CallOutcome::Failed(e) => {
                tracing::warn!(
                    %backend,
                    error = %e,
                    held = self.resource.is_held(),
                    "call failed"
                );
            }
        }
    }
}

/// Backend whose service grants numeric cookies
pub struct TokenInhibitor<S> {
    slot: Slot,
    service: S,
}

impl<S: TokenService> TokenInhibitor<S> {
    pub fn new(id: BackendId, service: S) -> Self {
        Self {
            slot: Slot::new(id),
            service,
        }
    }
}

impl<S: TokenService> Inhibitor for TokenInhibitor<S> {
    fn id(&self) -> BackendId {
        self.slot.id
    }

    fn available(&self) -> bool {
        self.slot.available
    }

    fn inhibited(&self) -> bool {
        self.slot.resource.is_held()
    }

    fn busy(&self) -> bool {
        self.slot.busy
    }

    fn set_available(&mut self, available: bool) -> bool {
        self.slot.set_available(available)
    }

    fn inhibit(&mut self, app: &str, reason: &str, done: Completer) {
        if self.slot.resource.is_held() {
            tracing::warn!(backend = %self.slot.id, "already inhibited, ignoring");
            return;
        }
        if !self.slot.can_start("inhibit") {
            return;
        }

        self.slot.busy = true;
        let service = self.service.clone();
        let app = app.to_string();
        let reason = reason.to_string();
        tokio::spawn(async move {
            let outcome = match service.inhibit(&app, &reason).await {
                Ok(cookie) => CallOutcome::Acquired(Resource::from_cookie(cookie)),
                Err(e) => CallOutcome::Failed(e),
            };
            done.finish(outcome);
        });
    }

    fn uninhibit(&mut self, done: Completer) {
        let Some(cookie) = self.slot.resource.token() else {
            tracing::warn!(backend = %self.slot.id, "not inhibited, ignoring uninhibit");
            return;
        };
        if !self.slot.can_start("uninhibit") {
            return;
        }

        self.slot.busy = true;
        let service = self.service.clone();
        tokio::spawn(async move {
            let outcome = match service.uninhibit(cookie).await {
                Ok(()) => CallOutcome::Released,
                Err(e) => CallOutcome::Failed(e),
            };
            done.finish(outcome);
        });
    }

    fn finish(&mut self, outcome: CallOutcome) {
        self.slot.finish(outcome);
    }
}

impl<S> Drop for TokenInhibitor<S> {
    fn drop(&mut self) {
        if let Some(cookie) = self.slot.resource.token() {
            // The service forgets the cookie once our bus connection closes
            tracing::warn!(backend = %self.slot.id, cookie, "dropped while holding a cookie");
        }
    }
}

/// Backend whose service grants an exclusive handle
pub struct HandleInhibitor<S> {
    slot: Slot,
    service: S,
}

impl<S: HandleService> HandleInhibitor<S> {
    pub fn new(id: BackendId, service: S) -> Self {
        Self {
            slot: Slot::new(id),
            service,
        }
    }
}

impl<S: HandleService> Inhibitor for HandleInhibitor<S> {
    fn id(&self) -> BackendId {
        self.slot.id
    }

    fn available(&self) -> bool {
        self.slot.available
    }

    fn inhibited(&self) -> bool {
        self.slot.resource.is_held()
    }

    fn busy(&self) -> bool {
        self.slot.busy
    }

    fn set_available(&mut self, available: bool) -> bool {
        self.slot.set_available(available)
    }

    fn inhibit(&mut self, app: &str, reason: &str, done: Completer) {
        if self.slot.resource.is_held() {
            tracing::warn!(backend = %self.slot.id, "already inhibited, ignoring");
            return;
        }
        if !self.slot.can_start("inhibit") {
            return;
        }

        self.slot.busy = true;
        let service = self.service.clone();
        let app = app.to_string();
        let reason = reason.to_string();
        tokio::spawn(async move {
            let outcome = match service.inhibit(&app, &reason).await {
                Ok(lease) => CallOutcome::Acquired(Resource::from_lease(lease)),
                Err(e) => CallOutcome::Failed(e),
            };
            done.finish(outcome);
        });
    }

    fn uninhibit(&mut self, done: Completer) {
        if !self.slot.resource.is_held() {
            tracing::warn!(backend = %self.slot.id, "not inhibited, ignoring uninhibit");
            return;
        }
        if !self.slot.can_start("uninhibit") {
            return;
        }

        // Closing the handle is the release; the outcome still goes through
        // the loop so completion is never reported inline
        drop(self.slot.resource.take());
        tracing::debug!(backend = %self.slot.id, "handle closed");
        self.slot.busy = true;
        done.finish(CallOutcome::Released);
    }

    fn finish(&mut self, outcome: CallOutcome) {
        self.slot.finish(outcome);
    }
}

#[cfg(test)]
#[path = "inhibitor_tests.rs"]
mod tests;
