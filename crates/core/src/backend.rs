// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend identifiers
//!
//! The enumeration order is the fallback priority order and never changes at
//! runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One backend slot, identified for the lifetime of the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendId {
    /// org.gnome.SessionManager (cookie)
    GnomeSession,
    /// org.mate.SessionManager (cookie)
    MateSession,
    /// org.freedesktop.PowerManagement.Inhibit (cookie)
    PowerManagement,
    /// org.freedesktop.login1.Manager (file descriptor)
    Login1,
}

impl BackendId {
    /// Number of backend slots
    pub const COUNT: usize = 4;

    /// All backends, highest priority first
    pub const ALL: [BackendId; Self::COUNT] = [
        BackendId::GnomeSession,
        BackendId::MateSession,
        BackendId::PowerManagement,
        BackendId::Login1,
    ];

    /// Position in the priority order (0 is tried first)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BackendId::GnomeSession => "gnome-session",
            BackendId::MateSession => "mate-session",
            BackendId::PowerManagement => "power-management",
            BackendId::Login1 => "login1",
        }
    }

    /// Backends in priority order, starting right after `after`.
    ///
    /// With `None` the walk starts at the highest priority backend.
    pub fn walk_from(after: Option<BackendId>) -> impl Iterator<Item = BackendId> {
        let start = after.map_or(0, |b| b.index() + 1);
        Self::ALL.into_iter().skip(start)
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for backend names that are not part of the enumeration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown backend: {0}")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendId {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| UnknownBackend(s.to_string()))
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
