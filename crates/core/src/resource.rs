// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inhibition lock resources
//!
//! Cookie-style services hand back a numeric token that must later be passed
//! to a matching release call. Descriptor-style services hand back an
//! exclusive handle whose possession is the lock; dropping it releases the
//! lock, so a held handle is closed exactly once.

use std::fmt;
use std::num::NonZeroU32;

/// An exclusively owned handle that keeps an inhibition lock alive.
///
/// Dropping the value closes it.
pub trait Lease: fmt::Debug + Send + 'static {}

impl Lease for std::os::fd::OwnedFd {}

/// Lock resource held by one backend
#[derive(Debug, Default)]
pub enum Resource {
    #[default]
    Empty,
    /// Cookie returned by the service. Zero is never a valid cookie.
    Token(NonZeroU32),
    Handle(Box<dyn Lease>),
}

impl Resource {
    /// Resource for a raw cookie; a zero cookie means the call did not take effect.
    pub fn from_cookie(cookie: u32) -> Self {
        NonZeroU32::new(cookie).map_or(Resource::Empty, Resource::Token)
    }

    pub fn from_lease(lease: Box<dyn Lease>) -> Self {
        Resource::Handle(lease)
    }

    pub fn is_held(&self) -> bool {
        !matches!(self, Resource::Empty)
    }

    pub fn token(&self) -> Option<u32> {
        match self {
            Resource::Token(token) => Some(token.get()),
            _ => None,
        }
    }

    /// Take the resource out, leaving `Empty` behind
    pub fn take(&mut self) -> Resource {
        std::mem::take(self)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Empty => "empty",
            Resource::Token(_) => "token",
            Resource::Handle(_) => "handle",
        }
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
