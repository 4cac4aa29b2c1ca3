// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::service::{FakeHandleService, FakeTokenService, ServiceCall};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

// =============================================================================
// Precondition validation tests
// =============================================================================

#[tokio::test]
async fn traced_token_rejects_zero_cookie() {
    let fake = FakeTokenService::new();
    let traced = TracedTokenService::new(BackendId::GnomeSession, fake.clone());

    let result = traced.uninhibit(0).await;

    assert!(matches!(result, Err(ServiceError::InvalidCookie)));
    assert!(fake.calls().is_empty(), "inner service must not be called");
}

#[tokio::test]
async fn traced_token_passes_results_through() {
    let fake = FakeTokenService::new();
    let traced = TracedTokenService::new(BackendId::PowerManagement, fake.clone());

    let cookie = traced.inhibit("kad", "playing").await.unwrap();
    traced.uninhibit(cookie).await.unwrap();

    assert_eq!(
        fake.calls(),
        vec![
            ServiceCall::Inhibit {
                app: "kad".to_string(),
                reason: "playing".to_string()
            },
            ServiceCall::Uninhibit { cookie },
        ]
    );
}

// =============================================================================
// Tracing output verification tests
// =============================================================================

#[test]
fn traced_token_inhibit_logs_entry_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedTokenService::new(BackendId::MateSession, FakeTokenService::new());
        traced.inhibit("kad", "playing").await
    });

    assert_eq!(result.unwrap(), 1);
    assert!(
        logs.contains("token.inhibit"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("mate-session"),
        "Should log backend. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("requesting cookie"),
        "Should log entry message. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("cookie granted"),
        "Should log completion. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("elapsed_ms"),
        "Should log timing. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_token_logs_empty_cookie() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeTokenService::new();
        fake.grant_zero_cookie(true);
        let traced = TracedTokenService::new(BackendId::GnomeSession, fake);
        traced.inhibit("kad", "playing").await
    });

    assert_eq!(result.unwrap(), 0);
    assert!(
        logs.contains("empty cookie"),
        "Should warn about empty cookie. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_token_logs_release_failure() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedTokenService::new(BackendId::GnomeSession, FakeTokenService::new());
        traced.uninhibit(5).await
    });

    assert!(result.is_err());
    assert!(
        logs.contains("uninhibit failed"),
        "Should log release failure. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("unknown cookie 5"),
        "Should log the error. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_handle_logs_grant() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedHandleService::new(BackendId::Login1, FakeHandleService::new());
        traced.inhibit("kad", "playing").await
    });

    assert!(result.is_ok());
    assert!(
        logs.contains("handle.inhibit"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("handle granted"),
        "Should log completion. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_handle_logs_failure() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeHandleService::new();
        fake.fail_inhibit(true);
        let traced = TracedHandleService::new(BackendId::Login1, fake);
        traced.inhibit("kad", "playing").await
    });

    assert!(result.is_err());
    assert!(
        logs.contains("inhibit refused"),
        "Should log the error. Logs:\n{}",
        logs
    );
}
