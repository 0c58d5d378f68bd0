//! Sign-in and sign-out around the session store.

use tracing::{info, warn};

use fleura_api::{ApiError, AuthApi, LoginRequest};
use fleura_core::{CustomerId, FailureKind, Session, SessionStore, SessionStoreError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("already signed in")]
    AlreadySignedIn,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

impl AuthError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::AlreadySignedIn => FailureKind::Validation,
            Self::Api(error) => error.kind(),
            Self::Store(_) => FailureKind::Server,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::AlreadySignedIn => "You are already signed in",
            Self::Api(error) => error.user_message(),
            Self::Store(_) => "Your session could not be saved. Please try again.",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Whether the backend acknowledged the logout or only the local session was
/// dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignOutOutcome {
    Full,
    LocalOnly,
    NotSignedIn,
}

/// Exchanges credentials for a token and persists the resulting session.
/// Refuses to stack a second sign-in on top of an existing one.
pub async fn sign_in(
    api: &dyn AuthApi,
    store: &dyn SessionStore,
    credentials: Credentials,
) -> Result<Session, AuthError> {
    if store.load()?.is_some() {
        return Err(AuthError::AlreadySignedIn);
    }

    let request =
        LoginRequest { username: credentials.username, password: credentials.password };
    let response = api.login(&request).await?;

    let session = Session {
        user_id: CustomerId(response.user_id),
        token: response.token.into(),
        is_admin: response.admin,
    };
    store.store(&session)?;
    info!(user = session.user_id.0, admin = session.is_admin, "signed in");
    Ok(session)
}

/// Tells the backend, then drops the local session either way. A failed
/// backend call downgrades the outcome instead of keeping the user
/// half-signed-in.
pub async fn sign_out(
    api: &dyn AuthApi,
    store: &dyn SessionStore,
) -> Result<SignOutOutcome, AuthError> {
    let Some(session) = store.load()? else {
        return Ok(SignOutOutcome::NotSignedIn);
    };

    let acknowledged = match api.logout(&session).await {
        Ok(()) => true,
        Err(error) => {
            warn!(kind = %error.kind(), %error, "backend logout failed, clearing local session");
            false
        }
    };

    store.clear()?;
    info!(user = session.user_id.0, acknowledged, "signed out");
    Ok(if acknowledged { SignOutOutcome::Full } else { SignOutOutcome::LocalOnly })
}
