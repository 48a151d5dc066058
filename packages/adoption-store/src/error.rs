//! Error types for the synchronization layer.
//!
//! Nothing here is fatal: credential problems reset the session, gateway
//! problems leave the previous state in place.

use adoption_api::ApiError;
use thiserror::Error;

/// Failure to turn a persisted or freshly issued token into claims.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid JWT format: expected 3 segments, found {0}")]
    Format(usize),

    #[error("Failed to decode JWT payload: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Failed to parse JWT claims: {0}")]
    Claims(#[from] serde_json::Error),

    #[error("Token is expired or carries no expiry")]
    Expired,
}

/// Failure of the medium the credential token is persisted in.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Token storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a failed sign-in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The gateway refused the credentials (4xx).
    #[error("Sign-in rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Network or server failure; the session is unchanged.
    #[error("Sign-in failed: {0}")]
    Gateway(#[source] ApiError),

    /// The gateway answered with a token that cannot be decoded.
    #[error("Server issued an unusable token: {0}")]
    Token(#[from] TokenError),

    #[error("Could not persist the session token: {0}")]
    Storage(#[from] StorageError),

    /// A logout or a newer sign-in happened while this one was in flight.
    #[error("Sign-in was superseded by a newer session change")]
    Superseded,
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err.status() {
            Some(status) if err.is_client_error() => AuthError::Rejected {
                status,
                message: err.message(),
            },
            _ => AuthError::Gateway(err),
        }
    }
}

impl AuthError {
    /// True when the user should be told their credentials were wrong.
    pub fn is_rejected(&self) -> bool {
        matches!(self, AuthError::Rejected { .. })
    }
}
