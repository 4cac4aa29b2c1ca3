// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service stand-in for backends that are switched off or unreachable.

use super::{HandleService, ServiceError, TokenService};
use async_trait::async_trait;
use ka_core::Lease;

/// Service that refuses every call.
///
/// Fills the slot of a backend that is disabled in the configuration or whose
/// bus could not be reached. Such a backend is never reported available, so
/// the coordinator does not call it in the first place.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledService;

impl DisabledService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TokenService for DisabledService {
    async fn inhibit(&self, _app: &str, _reason: &str) -> Result<u32, ServiceError> {
        Err(ServiceError::Disabled)
    }

    async fn uninhibit(&self, _cookie: u32) -> Result<(), ServiceError> {
        Err(ServiceError::Disabled)
    }
}

#[async_trait]
impl HandleService for DisabledService {
    async fn inhibit(&self, _app: &str, _reason: &str) -> Result<Box<dyn Lease>, ServiceError> {
        Err(ServiceError::Disabled)
    }
}

#[cfg(test)]
#[path = "disabled_tests.rs"]
mod tests;
