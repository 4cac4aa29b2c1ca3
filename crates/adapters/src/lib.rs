// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the remote services that hold sleep inhibition locks

pub mod service;
pub mod traced;
pub mod watcher;

pub use service::{
    DisabledService, HandleService, Login1Service, PowerManagementService, ServiceError,
    SessionManager, SessionManagerService, TokenService,
};
pub use traced::{TracedHandleService, TracedTokenService};
pub use watcher::NameWatcher;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use service::{FakeHandleService, FakeLease, FakeTokenService, ServiceCall};
