// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events and effects for state machine orchestration

use crate::backend::BackendId;
use crate::request::Request;

/// Inputs to the coordinator state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A caller asked for a new target state
    Requested(Request),
    /// A backend's service appeared or vanished (also fired once at startup)
    AvailabilityChanged { backend: BackendId, available: bool },
    /// A backend finished an inhibit or uninhibit call
    InhibitedChanged { backend: BackendId },
    /// Deferred processing pass posted by `Effect::ScheduleProcess`
    Process,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Requested(Request::Inhibit { .. }) => "requested:inhibit",
            Event::Requested(Request::Uninhibit) => "requested:uninhibit",
            Event::AvailabilityChanged { .. } => "backend:availability",
            Event::InhibitedChanged { .. } => "backend:inhibited",
            Event::Process => "process",
        }
    }
}

/// Effects are side effects that the coordinator requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask a backend to acquire a lock
    Inhibit { backend: BackendId, reason: String },
    /// Ask a backend to release its lock
    Uninhibit { backend: BackendId },
    /// Post a `Process` event behind everything already queued
    ScheduleProcess,
    /// Tell observers about a change
    Notify(Notification),
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Inhibit { .. } => "inhibit",
            Effect::Uninhibit { .. } => "uninhibit",
            Effect::ScheduleProcess => "schedule_process",
            Effect::Notify(_) => "notify",
        }
    }

    /// Key/value pairs for structured logging
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Inhibit { backend, reason } => vec![
                ("backend", backend.to_string()),
                ("reason", reason.clone()),
            ],
            Effect::Uninhibit { backend } => vec![("backend", backend.to_string())],
            Effect::ScheduleProcess => vec![],
            Effect::Notify(notification) => vec![("notification", format!("{:?}", notification))],
        }
    }
}

/// Observable inhibition state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    pub inhibited: bool,
    pub active_backend: Option<BackendId>,
}

/// Notifications delivered to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// `inhibited` or `active_backend` changed
    Status(Status),
    /// An inhibit request resolved
    InhibitFinished { success: bool },
    /// An uninhibit request resolved
    UninhibitFinished { success: bool },
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
