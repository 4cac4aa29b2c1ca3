// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Keep Awake execution engine

mod error;
mod executor;
mod inhibitor;
mod runtime;

pub use error::RuntimeError;
pub use executor::{Backends, Executor};
pub use inhibitor::{CallOutcome, Completer, HandleInhibitor, Inhibitor, TokenInhibitor};
pub use runtime::{Runtime, RuntimeConfig, RuntimeDeps, RuntimeHandle};
