// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ka_core::{BackendId, Status};
use yare::parameterized;

const FAILED: Notification = Notification::InhibitFinished { success: false };
const SUCCEEDED: Notification = Notification::InhibitFinished { success: true };

#[test]
fn only_first_failure_of_a_streak_is_reported() {
    let mut reporter = FailureReporter::new();

    assert_eq!(reporter.observe(&FAILED), Some(Report::Failed));
    assert_eq!(reporter.observe(&FAILED), Some(Report::StillFailing));
    assert_eq!(reporter.observe(&FAILED), Some(Report::StillFailing));
    assert!(reporter.is_failing());
}

#[test]
fn success_ends_the_streak() {
    let mut reporter = FailureReporter::new();
    reporter.observe(&FAILED);

    assert_eq!(reporter.observe(&SUCCEEDED), Some(Report::Recovered));
    assert!(!reporter.is_failing());
    assert_eq!(reporter.observe(&FAILED), Some(Report::Failed));
}

#[test]
fn success_without_streak_is_quiet() {
    let mut reporter = FailureReporter::new();

    assert_eq!(reporter.observe(&SUCCEEDED), None);
}

#[parameterized(
    uninhibit_ok = { Notification::UninhibitFinished { success: true } },
    uninhibit_failed = { Notification::UninhibitFinished { success: false } },
    status_idle = { Notification::Status(Status::default()) },
    status_active = {
        Notification::Status(Status { inhibited: true, active_backend: Some(BackendId::Login1) })
    },
)]
fn other_notifications_leave_the_streak_alone(notification: Notification) {
    let mut reporter = FailureReporter::new();
    reporter.observe(&FAILED);

    assert_eq!(reporter.observe(&notification), None);
    assert!(reporter.is_failing());
}
