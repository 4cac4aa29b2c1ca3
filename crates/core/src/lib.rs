// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ka-core: Core library for the Keep Awake (ka) sleep inhibitor
//!
//! This crate provides:
//! - The fixed, priority-ordered backend enumeration
//! - Resource models for token-style and handle-style inhibition locks
//! - The pure coordinator state machine, driven by events and producing effects
//! - TOML configuration

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod effect;
pub mod request;
pub mod resource;

pub use backend::{BackendId, UnknownBackend};
pub use config::{Config, ConfigError};
pub use coordinator::{BackendStates, Coordinator, Holder, InFlight, Phase};
pub use effect::{Effect, Event, Notification, Status};
pub use request::Request;
pub use resource::{Lease, Resource};
