// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! How the daemon surfaces inhibit outcomes.
//!
//! A failing inhibit is worth one error in the log, not one per retry. Only
//! the first failure of a streak is reported; the next success ends it.

use ka_core::Notification;

/// What to log for a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// First failure of a streak
    Failed,
    /// Another failure in the same streak
    StillFailing,
    /// Success after a streak of failures
    Recovered,
}

#[derive(Debug, Default)]
pub struct FailureReporter {
    failing: bool,
}

impl FailureReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_failing(&self) -> bool {
        self.failing
    }

    pub fn observe(&mut self, notification: &Notification) -> Option<Report> {
        match notification {
            Notification::InhibitFinished { success: false } => {
                let first = !self.failing;
                self.failing = true;
                Some(if first {
                    Report::Failed
                } else {
                    Report::StillFailing
                })
            }
            Notification::InhibitFinished { success: true } => {
                std::mem::take(&mut self.failing).then_some(Report::Recovered)
            }
            Notification::UninhibitFinished { .. } | Notification::Status(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
