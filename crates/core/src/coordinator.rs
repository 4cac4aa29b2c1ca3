// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inhibition coordinator state machine
//!
//! Presents one logical on/off inhibition over a priority-ordered list of
//! backends. Requests are coalesced into a single `pending` target; at most one
//! backend call is in flight (`started`) at any time. Processing of a new
//! request is never done inline: the coordinator asks for a deferred pass with
//! `Effect::ScheduleProcess` and picks the request up when the `Process` event
//! comes back around.
//!
//! The state machine performs no I/O. Backend state is read through
//! [`BackendStates`] and every side effect is returned as an [`Effect`].

use crate::backend::BackendId;
use crate::effect::{Effect, Event, Notification, Status};
use crate::request::Request;

/// Read access to the backends the coordinator drives
pub trait BackendStates {
    /// A live connection to the backend's service exists
    fn available(&self, backend: BackendId) -> bool;
    /// The backend currently holds a lock resource
    fn inhibited(&self, backend: BackendId) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for every backend to report its availability once
    Initializing,
    Ready,
}

/// The backend presently holding the inhibition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holder {
    pub backend: BackendId,
    pub reason: String,
}

/// A request with a call outstanding on `backend`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub request: Request,
    pub backend: BackendId,
}

#[derive(Debug)]
pub struct Coordinator {
    phase: Phase,
    reported: [bool; BackendId::COUNT],
    current: Option<Holder>,
    started: Option<InFlight>,
    pending: Option<Request>,
    process_scheduled: bool,
    /// Reason of the last inhibit request that ran out of backends
    retry_reason: Option<String>,
    status: Status,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            phase: Phase::Initializing,
            reported: [false; BackendId::COUNT],
            current: None,
            started: None,
            pending: None,
            process_scheduled: false,
            retry_reason: None,
            status: Status::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn current(&self) -> Option<&Holder> {
        self.current.as_ref()
    }

    pub fn started(&self) -> Option<&InFlight> {
        self.started.as_ref()
    }

    pub fn pending(&self) -> Option<&Request> {
        self.pending.as_ref()
    }

    pub fn inhibited(&self) -> bool {
        self.current.is_some()
    }

    pub fn active_backend(&self) -> Option<BackendId> {
        self.current.as_ref().map(|h| h.backend)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Handle an incoming event and return the effects it produced
    pub fn handle(&mut self, event: Event, backends: &impl BackendStates) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            Event::Requested(request) => self.request(request, &mut effects),
            Event::AvailabilityChanged { backend, available } => {
                self.on_availability_changed(backend, available, backends, &mut effects)
            }
            Event::InhibitedChanged { backend } => {
                self.on_inhibited_changed(backend, backends, &mut effects)
            }
            Event::Process => {
                self.process_scheduled = false;
                self.process(backends, &mut effects);
            }
        }

        self.sync_status(&mut effects);
        effects
    }

    fn request(&mut self, wanted: Request, effects: &mut Vec<Effect>) {
        self.retry_reason = None;

        let satisfied = match (&wanted, &self.current) {
            (Request::Inhibit { reason }, Some(holder)) => holder.reason == *reason,
            (Request::Inhibit { .. }, None) => false,
            (Request::Uninhibit, current) => current.is_none(),
        };
        if satisfied && self.started.is_none() && self.pending.is_none() {
            tracing::debug!(request = wanted.name(), "already satisfied");
            return;
        }

        if self.pending.as_ref() == Some(&wanted) {
            return;
        }

        if self.started.as_ref().is_some_and(|s| s.request == wanted) {
            // The in-flight call already heads where the caller wants to go
            if let Some(dropped) = self.pending.take() {
                tracing::debug!(dropped = dropped.name(), "cancelled queued request");
            }
            return;
        }

        if let Some(replaced) = self.pending.replace(wanted) {
            tracing::debug!(replaced = replaced.name(), "replaced queued request");
        }
        self.schedule(effects);
    }

    fn schedule(&mut self, effects: &mut Vec<Effect>) {
        if !self.process_scheduled {
            self.process_scheduled = true;
            effects.push(Effect::ScheduleProcess);
        }
    }

    /// Move `pending` into flight if nothing else is.
    ///
    /// Safe to call any number of times.
    fn process(&mut self, backends: &impl BackendStates, effects: &mut Vec<Effect>) {
        while self.phase == Phase::Ready && self.started.is_none() {
            let Some(next) = self.pending.take() else {
                return;
            };

            let request = match (next, &self.current) {
                (Request::Inhibit { reason }, Some(holder)) if holder.reason != reason => {
                    // Reason change: release first, the inhibit is reconsidered afterwards
                    tracing::info!(from = %holder.reason, to = %reason, "inhibit reason changed");
                    self.pending = Some(Request::Inhibit { reason });
                    Request::Uninhibit
                }
                (Request::Inhibit { reason }, Some(holder)) => {
                    let backend = holder.backend;
                    if backends.available(backend) && backends.inhibited(backend) {
                        tracing::debug!(%backend, "lock still held");
                        effects.push(Effect::Notify(Notification::InhibitFinished {
                            success: true,
                        }));
                        continue;
                    }
                    tracing::warn!(%backend, "active backend lost its lock");
                    self.current = None;
                    Request::Inhibit { reason }
                }
                (next, _) => next,
            };

            self.dispatch(request, None, backends, effects);
        }
    }

    /// Start `request` on a backend, or resolve it on the spot.
    ///
    /// An inhibit walks the backends in priority order beginning right after
    /// `after`, so a fallback never revisits a backend.
    fn dispatch(
        &mut self,
        request: Request,
        after: Option<BackendId>,
        backends: &impl BackendStates,
        effects: &mut Vec<Effect>,
    ) {
        match request {
            Request::Inhibit { reason } => {
                let candidate = BackendId::walk_from(after).find(|b| backends.available(*b));
                match candidate {
                    Some(backend) => {
                        tracing::info!(%backend, %reason, "requesting inhibit");
                        effects.push(Effect::Inhibit {
                            backend,
                            reason: reason.clone(),
                        });
                        self.started = Some(InFlight {
                            request: Request::Inhibit { reason },
                            backend,
                        });
                    }
                    None => {
                        tracing::warn!(%reason, "no backend could inhibit sleep");
                        self.retry_reason = Some(reason);
                        effects.push(Effect::Notify(Notification::InhibitFinished {
                            success: false,
                        }));
                    }
                }
            }
            Request::Uninhibit => match &self.current {
                Some(holder) => {
                    let backend = holder.backend;
                    tracing::info!(%backend, "requesting uninhibit");
                    effects.push(Effect::Uninhibit { backend });
                    self.started = Some(InFlight {
                        request: Request::Uninhibit,
                        backend,
                    });
                }
                None => {
                    tracing::debug!("uninhibit requested with no active backend");
                    effects.push(Effect::Notify(Notification::UninhibitFinished {
                        success: false,
                    }));
                }
            },
        }
    }

    fn on_inhibited_changed(
        &mut self,
        backend: BackendId,
        backends: &impl BackendStates,
        effects: &mut Vec<Effect>,
    ) {
        if self.phase == Phase::Initializing {
            tracing::debug!(%backend, "ignoring inhibited change during startup");
            return;
        }

        match self.started.take() {
            None => {
                tracing::warn!(%backend, "inhibited changed with no request in flight");
            }
            Some(flight) if flight.backend != backend => {
                tracing::warn!(
                    %backend,
                    expected = %flight.backend,
                    "inhibited changed on unexpected backend"
                );
                self.started = Some(flight);
            }
            Some(InFlight {
                request: Request::Inhibit { reason },
                backend,
            }) => {
                if backends.inhibited(backend) {
                    tracing::info!(%backend, %reason, "sleep inhibited");
                    self.retry_reason = None;
                    self.current = Some(Holder { backend, reason });
                    self.sync_status(effects);
                    effects.push(Effect::Notify(Notification::InhibitFinished {
                        success: true,
                    }));
                } else {
                    tracing::warn!(%backend, "inhibit failed, trying next backend");
                    self.dispatch(Request::Inhibit { reason }, Some(backend), backends, effects);
                }
            }
            Some(InFlight {
                request: Request::Uninhibit,
                backend,
            }) => {
                if backends.inhibited(backend) {
                    tracing::warn!(%backend, "uninhibit failed, lock still held");
                    effects.push(Effect::Notify(Notification::UninhibitFinished {
                        success: false,
                    }));
                } else {
                    tracing::info!(%backend, "sleep uninhibited");
                    self.current = None;
                    self.sync_status(effects);
                    effects.push(Effect::Notify(Notification::UninhibitFinished {
                        success: true,
                    }));
                }
            }
        }

        self.process(backends, effects);
    }

    fn on_availability_changed(
        &mut self,
        backend: BackendId,
        available: bool,
        backends: &impl BackendStates,
        effects: &mut Vec<Effect>,
    ) {
        if self.phase == Phase::Initializing {
            self.reported[backend.index()] = true;
            tracing::debug!(%backend, available, "backend reported");
            if self.reported.iter().all(|r| *r) {
                tracing::info!("all backends reported, coordinator ready");
                self.phase = Phase::Ready;
                self.process(backends, effects);
            }
            return;
        }

        if self.started.is_some() {
            // The in-flight call's completion drives recovery
            tracing::debug!(%backend, available, "availability changed while busy");
            return;
        }

        match self.current.clone() {
            Some(holder) => {
                if holder.backend == backend && !available {
                    tracing::warn!(%backend, "active backend vanished, migrating inhibit");
                    self.current = None;
                    self.sync_status(effects);
                }
                if self.pending.is_none() {
                    self.pending = Some(Request::Inhibit {
                        reason: holder.reason,
                    });
                }
                self.process(backends, effects);
            }
            None if available => {
                if let Some(reason) = self.retry_reason.take() {
                    tracing::info!(%backend, %reason, "backend appeared, retrying inhibit");
                    if self.pending.is_none() {
                        self.pending = Some(Request::Inhibit { reason });
                    }
                    self.process(backends, effects);
                }
            }
            None => {}
        }
    }

    fn sync_status(&mut self, effects: &mut Vec<Effect>) {
        let status = Status {
            inhibited: self.current.is_some(),
            active_backend: self.active_backend(),
        };
        if status != self.status {
            self.status = status;
            effects.push(Effect::Notify(Notification::Status(status)));
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
