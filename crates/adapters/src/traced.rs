// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced service wrappers for consistent observability

use crate::service::{HandleService, ServiceError, TokenService};
use async_trait::async_trait;
use ka_core::{BackendId, Lease};
use tracing::Instrument;

/// Wrapper that adds tracing to any TokenService
#[derive(Clone)]
pub struct TracedTokenService<S> {
    backend: BackendId,
    inner: S,
}

impl<S> TracedTokenService<S> {
    pub fn new(backend: BackendId, inner: S) -> Self {
        Self { backend, inner }
    }
}

#[async_trait]
impl<S: TokenService> TokenService for TracedTokenService<S> {
    async fn inhibit(&self, app: &str, reason: &str) -> Result<u32, ServiceError> {
        let span = tracing::info_span!("token.inhibit", backend = %self.backend, app);

        async {
            tracing::info!(reason, "requesting cookie");

            let start = std::time::Instant::now();
            let result = self.inner.inhibit(app, reason).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(0) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "service answered with empty cookie"
                ),
                Ok(cookie) => tracing::info!(
                    cookie,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "cookie granted"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "inhibit failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn uninhibit(&self, cookie: u32) -> Result<(), ServiceError> {
        let span = tracing::info_span!("token.uninhibit", backend = %self.backend, cookie);

        async {
            // Precondition: zero is never a granted cookie
            if cookie == 0 {
                tracing::error!("refusing to release empty cookie");
                return Err(ServiceError::InvalidCookie);
            }

            let start = std::time::Instant::now();
            let result = self.inner.uninhibit(cookie).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => {
                    tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "cookie released")
                }
                Err(e) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "uninhibit failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any HandleService
#[derive(Clone)]
pub struct TracedHandleService<S> {
    backend: BackendId,
    inner: S,
}

impl<S> TracedHandleService<S> {
    pub fn new(backend: BackendId, inner: S) -> Self {
        Self { backend, inner }
    }
}

#[async_trait]
impl<S: HandleService> HandleService for TracedHandleService<S> {
    async fn inhibit(&self, app: &str, reason: &str) -> Result<Box<dyn Lease>, ServiceError> {
        let span = tracing::info_span!("handle.inhibit", backend = %self.backend, app);

        async {
            tracing::info!(reason, "requesting handle");

            let start = std::time::Instant::now();
            let result = self.inner.inhibit(app, reason).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(lease) => tracing::info!(
                    lease = ?lease,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "handle granted"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "inhibit failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
