use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::order::OrderStatus;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid order transition from {from:?} to {to:?}")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Classification attached to every failed mutating operation so callers can
/// surface something more useful than a console line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Authorization,
    Network,
    Server,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authorization => "authorization",
            Self::Network => "network",
            Self::Server => "server",
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            Self::Validation => "The request could not be processed. Check inputs and try again.",
            Self::Authorization => "Please sign in and try again.",
            Self::Network => "Could not reach the flower shop. Check your connection and retry.",
            Self::Server => "The flower shop hit an unexpected error. Please retry shortly.",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
