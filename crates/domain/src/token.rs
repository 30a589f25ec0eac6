//! Token shapes for single-token and dual-token sessions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// How a deployment represents its session.
///
/// The mode is chosen by configuration and never switches at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenMode {
    /// One bearer token with one expiry.
    #[default]
    Single,
    /// Short-lived access token plus a refresh token.
    Double,
}

impl TokenMode {
    /// Returns the mode as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for TokenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenMode {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "double" | "dual" => Ok(Self::Double),
            other => Err(DomainError::UnknownTokenMode(other.to_string())),
        }
    }
}

/// Token pair as issued by the server.
///
/// Serialises to the wire shapes `{token, expiresIn}` and
/// `{accessToken, accessExpiresIn, refreshToken, refreshExpiresIn}`.
/// Lifetimes are relative, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum TokenInfo {
    /// Dual-token session.
    DoubleToken {
        /// Short-lived bearer credential.
        access_token: String,
        /// Access token lifetime in seconds.
        access_expires_in: u64,
        /// Credential used to mint a new pair.
        refresh_token: String,
        /// Refresh token lifetime in seconds.
        refresh_expires_in: u64,
    },
    /// Single-token session.
    SingleToken {
        /// Bearer credential.
        token: String,
        /// Lifetime in seconds.
        expires_in: u64,
    },
}

impl TokenInfo {
    /// Creates a single-token session.
    #[must_use]
    pub fn single(token: impl Into<String>, expires_in: u64) -> Self {
        Self::SingleToken {
            token: token.into(),
            expires_in,
        }
    }

    /// Creates a dual-token session.
    #[must_use]
    pub fn double(
        access_token: impl Into<String>,
        access_expires_in: u64,
        refresh_token: impl Into<String>,
        refresh_expires_in: u64,
    ) -> Self {
        Self::DoubleToken {
            access_token: access_token.into(),
            access_expires_in,
            refresh_token: refresh_token.into(),
            refresh_expires_in,
        }
    }

    /// Returns the mode this variant belongs to.
    #[must_use]
    pub const fn mode(&self) -> TokenMode {
        match self {
            Self::SingleToken { .. } => TokenMode::Single,
            Self::DoubleToken { .. } => TokenMode::Double,
        }
    }

    /// Returns the credential sent as `Authorization: Bearer ...`.
    #[must_use]
    pub fn bearer(&self) -> &str {
        match self {
            Self::SingleToken { token, .. } => token,
            Self::DoubleToken { access_token, .. } => access_token,
        }
    }

    /// Returns the lifetime of the bearer credential in seconds.
    #[must_use]
    pub const fn bearer_ttl_secs(&self) -> u64 {
        match self {
            Self::SingleToken { expires_in, .. } => *expires_in,
            Self::DoubleToken {
                access_expires_in, ..
            } => *access_expires_in,
        }
    }

    /// Returns the refresh token, if this is a dual-token session.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        match self {
            Self::SingleToken { .. } => None,
            Self::DoubleToken { refresh_token, .. } => Some(refresh_token),
        }
    }

    /// Returns the refresh token lifetime in seconds, if any.
    #[must_use]
    pub const fn refresh_ttl_secs(&self) -> Option<u64> {
        match self {
            Self::SingleToken { .. } => None,
            Self::DoubleToken {
                refresh_expires_in, ..
            } => Some(*refresh_expires_in),
        }
    }

    /// Checks that this variant matches the configured mode.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TokenModeMismatch` when the variant differs.
    pub fn ensure_mode(&self, expected: TokenMode) -> DomainResult<()> {
        let actual = self.mode();
        if actual == expected {
            Ok(())
        } else {
            Err(DomainError::TokenModeMismatch { expected, actual })
        }
    }
}

/// Computes an absolute expiry `now + ttl`.
#[must_use]
pub fn expiry_after(now: DateTime<Utc>, ttl_secs: u64) -> DateTime<Utc> {
    let secs = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
    Duration::try_seconds(secs)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Returns a loggable preview of a token (first 8 chars + ...).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.len() > 12 {
        let cut = token
            .char_indices()
            .nth(8)
            .map_or(token.len(), |(idx, _)| idx);
        format!("{}...", &token[..cut])
    } else {
        token.to_string()
    }
}
