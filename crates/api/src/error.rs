use reqwest::StatusCode;
use thiserror::Error;

use fleura_core::FailureKind;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status} for {operation}")]
    UnexpectedStatus { operation: &'static str, status: StatusCode },
    #[error("backend response for {operation} could not be decoded: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend client could not be constructed: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Network,
            Self::UnexpectedStatus { status, .. } => match *status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::Authorization,
                status if status.is_client_error() => FailureKind::Validation,
                _ => FailureKind::Server,
            },
            Self::Decode { .. } | Self::ClientBuild(_) => FailureKind::Server,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}
