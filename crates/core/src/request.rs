// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inhibition requests

/// A desired target state. Equality is by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Inhibit { reason: String },
    Uninhibit,
}

impl Request {
    pub fn inhibit(reason: impl Into<String>) -> Self {
        Request::Inhibit {
            reason: reason.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Request::Inhibit { .. } => "inhibit",
            Request::Uninhibit => "uninhibit",
        }
    }

    pub fn is_inhibit(&self) -> bool {
        matches!(self, Request::Inhibit { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_shape() {
        assert_eq!(Request::inhibit("playing"), Request::inhibit("playing"));
        assert_ne!(Request::inhibit("playing"), Request::inhibit("copying"));
        assert_ne!(Request::inhibit("playing"), Request::Uninhibit);
        assert_eq!(Request::Uninhibit, Request::Uninhibit);
    }
}
