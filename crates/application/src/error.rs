//! Application error types

use gatehouse_domain::DomainError;
use thiserror::Error;

use crate::ports::{StorageError, TransportError};

/// Application-level errors.
///
/// The first group mirrors what a user can be told about a failed call;
/// the rest are local failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    /// Token or refresh token expired or absent.
    #[error("session expired")]
    AuthExpired,

    /// Business code or HTTP status 401.
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Message reported by the server.
        message: String,
    },

    /// HTTP 403.
    #[error("forbidden: {message}")]
    Forbidden {
        /// User-facing message.
        message: String,
    },

    /// HTTP 404.
    #[error("not found: {message}")]
    NotFound {
        /// User-facing message.
        message: String,
    },

    /// HTTP 5xx.
    #[error("server error ({status}): {message}")]
    ServerError {
        /// HTTP status.
        status: u16,
        /// User-facing message.
        message: String,
    },

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// HTTP status.
        status: u16,
        /// User-facing message.
        message: String,
    },

    /// Transport succeeded but the business code signals failure.
    #[error("request failed ({code}): {message}")]
    Business {
        /// Business code.
        code: i64,
        /// Message reported by the server.
        message: String,
    },

    /// No HTTP response was received.
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    /// The operation is not available in this configuration.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// Reading or writing persisted state failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

impl ApplicationError {
    /// Returns true if the session must be torn down.
    #[must_use]
    pub const fn requires_logout(&self) -> bool {
        matches!(self, Self::AuthExpired | Self::Unauthorized { .. })
    }

    /// Text suitable for a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthExpired => "Session expired, please log in again".to_string(),
            Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::ServerError { message, .. }
            | Self::HttpStatus { message, .. }
            | Self::Business { message, .. } => message.clone(),
            Self::NetworkUnreachable(_) => {
                "Network unavailable, please check your connection".to_string()
            }
            Self::UnsupportedOperation(op) => format!("{op} is not supported"),
            Self::Storage(_) | Self::Serialization(_) | Self::Domain(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }
}

impl From<StorageError> for ApplicationError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<serde_json::Error> for ApplicationError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<TransportError> for ApplicationError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::InvalidUrl(url) => Self::Serialization(format!("invalid URL: {url}")),
            other => Self::NetworkUnreachable(other.to_string()),
        }
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
