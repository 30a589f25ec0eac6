//! Domain error types

use thiserror::Error;

use crate::token::TokenMode;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The token variant does not match the configured token mode.
    #[error("token mode mismatch: expected {expected}, got {actual}")]
    TokenModeMismatch {
        /// Mode fixed by configuration.
        expected: TokenMode,
        /// Mode of the supplied token.
        actual: TokenMode,
    },

    /// A login response carried no usable token.
    #[error("login response carried no token")]
    MissingToken,

    /// A route string could not be parsed.
    #[error("invalid route: {0}")]
    InvalidRoute(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A token mode string is not recognised.
    #[error("unknown token mode: {0}")]
    UnknownTokenMode(String),

    /// A permission node field name is not recognised.
    #[error("unknown node field: {0}")]
    UnknownNodeField(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
