//! Login request and response shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::token::{TokenInfo, TokenMode};
use crate::user::{AdminUser, UserInfo};

/// Username/password pair sent to the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

impl Credentials {
    /// Creates a credentials pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Payload of a successful login, in any of the shapes servers send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LoginResponse {
    /// Web-admin shape: `{ access_token, user }`.
    Admin {
        /// Bearer credential.
        access_token: String,
        /// Optional lifetime; the configured default applies when absent.
        #[serde(default)]
        expires_in: Option<u64>,
        /// Signed-in user.
        user: AdminUser,
    },
    /// Mobile shapes: single or dual token.
    Token(TokenInfo),
}

/// Normalised result of a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    /// Token in the configured mode.
    pub token: TokenInfo,
    /// User profile, when the response carried one.
    pub user: Option<UserInfo>,
}

impl LoginResponse {
    /// Converts the response into a grant for the configured mode.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TokenModeMismatch` if the response shape cannot
    /// satisfy `mode`, or `DomainError::MissingToken` for an empty token.
    pub fn into_grant(self, mode: TokenMode, default_ttl_secs: u64) -> DomainResult<LoginGrant> {
        let grant = match self {
            Self::Admin {
                access_token,
                expires_in,
                user,
            } => LoginGrant {
                token: TokenInfo::single(access_token, expires_in.unwrap_or(default_ttl_secs)),
                user: Some(user.into()),
            },
            Self::Token(token) => LoginGrant { token, user: None },
        };

        if grant.token.bearer().is_empty() {
            return Err(DomainError::MissingToken);
        }
        grant.token.ensure_mode(mode)?;
        Ok(grant)
    }
}
