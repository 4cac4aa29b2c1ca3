// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine runtime

use ka_core::BackendId;
use thiserror::Error;

/// Errors that can occur in the runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("expected {expected} backends, got {actual}")]
    BackendCount { expected: usize, actual: usize },
    #[error("backend slot {index} must be {expected}, got {actual}")]
    BackendOrder {
        index: usize,
        expected: BackendId,
        actual: BackendId,
    },
    #[error("runtime has stopped")]
    Stopped,
}
