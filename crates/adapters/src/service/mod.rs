// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote inhibition services
//!
//! Two shapes of service exist. Cookie services return a numeric token from
//! `inhibit` and need a matching `uninhibit` call. Descriptor services return
//! an exclusive handle; dropping it releases the lock without a round trip.

mod dbus;
mod disabled;

pub use dbus::{Login1Service, PowerManagementService, SessionManager, SessionManagerService};
pub use disabled::DisabledService;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHandleService, FakeLease, FakeTokenService, ServiceCall};

use async_trait::async_trait;
use ka_core::Lease;
use thiserror::Error;

/// Errors from remote service calls
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),
    #[error("cookie 0 is not a valid inhibit cookie")]
    InvalidCookie,
    #[error("call rejected: {0}")]
    Rejected(String),
    #[error("backend is disabled")]
    Disabled,
}

impl From<zbus::fdo::Error> for ServiceError {
    fn from(e: zbus::fdo::Error) -> Self {
        ServiceError::Dbus(e.into())
    }
}

/// Service that grants numeric inhibit cookies
#[async_trait]
pub trait TokenService: Clone + Send + Sync + 'static {
    /// Acquire a sleep lock; a zero cookie means the lock was not granted
    async fn inhibit(&self, app: &str, reason: &str) -> Result<u32, ServiceError>;

    /// Release the lock identified by `cookie`
    async fn uninhibit(&self, cookie: u32) -> Result<(), ServiceError>;
}

/// Service that grants an exclusive handle; the lock lives as long as the handle
#[async_trait]
pub trait HandleService: Clone + Send + Sync + 'static {
    async fn inhibit(&self, app: &str, reason: &str) -> Result<Box<dyn Lease>, ServiceError>;
}
