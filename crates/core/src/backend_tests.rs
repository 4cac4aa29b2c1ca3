// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn priority_order_matches_enumeration_order() {
    let mut sorted = BackendId::ALL;
    sorted.sort();
    assert_eq!(sorted, BackendId::ALL);
    for (i, backend) in BackendId::ALL.iter().enumerate() {
        assert_eq!(backend.index(), i);
    }
}

#[test]
fn walk_from_none_visits_everything() {
    let walked: Vec<_> = BackendId::walk_from(None).collect();
    assert_eq!(walked, BackendId::ALL.to_vec());
}

#[test]
fn walk_only_skips_ahead() {
    let walked: Vec<_> = BackendId::walk_from(Some(BackendId::MateSession)).collect();
    assert_eq!(walked, vec![BackendId::PowerManagement, BackendId::Login1]);

    assert_eq!(BackendId::walk_from(Some(BackendId::Login1)).count(), 0);
}

#[parameterized(
    gnome = { "gnome-session", BackendId::GnomeSession },
    mate = { "mate-session", BackendId::MateSession },
    power = { "power-management", BackendId::PowerManagement },
    login = { "login1", BackendId::Login1 },
)]
fn name_round_trips(name: &str, expected: BackendId) {
    assert_eq!(name.parse::<BackendId>(), Ok(expected));
    assert_eq!(expected.to_string(), name);
}

#[test]
fn unknown_name_is_rejected() {
    let err = "upower".parse::<BackendId>().unwrap_err();
    assert_eq!(err.to_string(), "unknown backend: upower");
}
