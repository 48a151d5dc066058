//! Error types for the adoption API client.

use thiserror::Error;

/// Result type for adoption API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Adoption API client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx HTTP response
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// 2xx response whose envelope reports `success: false`
    #[error("Request rejected ({status_code}): {message}")]
    Rejected { status_code: u16, message: String },

    /// Successful envelope without the expected `data` payload
    #[error("Response carried no data")]
    MissingData,

    /// Body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP-level status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Rejected { status_code, .. } => Some(*status_code),
            ApiError::MissingData | ApiError::Parse(_) => None,
        }
    }

    /// True for 4xx failures: the request itself was refused (bad credentials,
    /// validation, missing resource). Retrying the same request will not help.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Human-readable message suitable for surfacing to a user.
    pub fn message(&self) -> String {
        match self {
            ApiError::Status { message, .. } | ApiError::Rejected { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}
