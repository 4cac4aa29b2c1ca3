// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake inhibition services for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{HandleService, ServiceError, TokenService};
use async_trait::async_trait;
use ka_core::Lease;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Recorded service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Inhibit { app: String, reason: String },
    Uninhibit { cookie: u32 },
}

/// Lets a test keep calls in flight until it releases them
#[derive(Clone)]
struct Gate {
    open: Arc<watch::Sender<bool>>,
}

impl Gate {
    fn new() -> Self {
        let (open, _) = watch::channel(true);
        Self {
            open: Arc::new(open),
        }
    }

    fn set(&self, open: bool) {
        self.open.send_replace(open);
    }

    async fn pass(&self) {
        let mut open = self.open.subscribe();
        // The sender lives as long as self, so this only returns once open
        let _ = open.wait_for(|open| *open).await;
    }
}

#[derive(Default)]
struct TokenState {
    calls: Vec<ServiceCall>,
    next_cookie: u32,
    held: Vec<u32>,
    fail_inhibit: bool,
    fail_uninhibit: bool,
    zero_cookie: bool,
}

/// Fake cookie service for testing
#[derive(Clone)]
pub struct FakeTokenService {
    state: Arc<Mutex<TokenState>>,
    gate: Gate,
}

impl Default for FakeTokenService {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTokenService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TokenState {
                next_cookie: 1,
                ..TokenState::default()
            })),
            gate: Gate::new(),
        }
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    /// Cookies granted and not yet released
    pub fn held(&self) -> Vec<u32> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .held
            .clone()
    }

    /// Make `inhibit` calls fail
    pub fn fail_inhibit(&self, fail: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_inhibit = fail;
    }

    /// Make `uninhibit` calls fail
    pub fn fail_uninhibit(&self, fail: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_uninhibit = fail;
    }

    /// Make `inhibit` answer with the non-affirmative cookie 0
    pub fn grant_zero_cookie(&self, zero: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).zero_cookie = zero;
    }

    /// Keep every following call in flight until `release` is called
    pub fn hold(&self) {
        self.gate.set(false);
    }

    pub fn release(&self) {
        self.gate.set(true);
    }
}

#[async_trait]
impl TokenService for FakeTokenService {
    async fn inhibit(&self, app: &str, reason: &str) -> Result<u32, ServiceError> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .push(ServiceCall::Inhibit {
                app: app.to_string(),
                reason: reason.to_string(),
            });

        self.gate.pass().await;

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_inhibit {
            return Err(ServiceError::Rejected("inhibit refused".to_string()));
        }
        if state.zero_cookie {
            return Ok(0);
        }
        let cookie = state.next_cookie;
        state.next_cookie += 1;
        state.held.push(cookie);
        Ok(cookie)
    }

    async fn uninhibit(&self, cookie: u32) -> Result<(), ServiceError> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .push(ServiceCall::Uninhibit { cookie });

        self.gate.pass().await;

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_uninhibit {
            return Err(ServiceError::Rejected("uninhibit refused".to_string()));
        }
        match state.held.iter().position(|c| *c == cookie) {
            Some(i) => {
                state.held.remove(i);
                Ok(())
            }
            None => Err(ServiceError::Rejected(format!("unknown cookie {}", cookie))),
        }
    }
}

/// Handle granted by [`FakeHandleService`]; counts its own closing
#[derive(Debug)]
pub struct FakeLease {
    closes: Arc<AtomicUsize>,
}

impl Lease for FakeLease {}

impl Drop for FakeLease {
    fn drop(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct HandleState {
    calls: Vec<ServiceCall>,
    granted: usize,
    fail_inhibit: bool,
}

/// Fake descriptor service for testing
#[derive(Clone)]
pub struct FakeHandleService {
    state: Arc<Mutex<HandleState>>,
    closes: Arc<AtomicUsize>,
    gate: Gate,
}

impl Default for FakeHandleService {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHandleService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HandleState::default())),
            closes: Arc::new(AtomicUsize::new(0)),
            gate: Gate::new(),
        }
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    /// Number of handles granted so far
    pub fn granted(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).granted
    }

    /// Number of granted handles that have been closed
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Handles granted and still open
    pub fn open(&self) -> usize {
        self.granted() - self.closes()
    }

    pub fn fail_inhibit(&self, fail: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_inhibit = fail;
    }

    /// Keep every following call in flight until `release` is called
    pub fn hold(&self) {
        self.gate.set(false);
    }

    pub fn release(&self) {
        self.gate.set(true);
    }
}

#[async_trait]
impl HandleService for FakeHandleService {
    async fn inhibit(&self, app: &str, reason: &str) -> Result<Box<dyn Lease>, ServiceError> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .push(ServiceCall::Inhibit {
                app: app.to_string(),
                reason: reason.to_string(),
            });

        self.gate.pass().await;

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_inhibit {
            return Err(ServiceError::Rejected("inhibit refused".to_string()));
        }
        state.granted += 1;
        Ok(Box::new(FakeLease {
            closes: self.closes.clone(),
        }))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
