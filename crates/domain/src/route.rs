//! Navigation targets and guard outcomes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{DomainError, DomainResult};

/// A client-side route: absolute path plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// Absolute path, always starting with `/`.
    pub path: String,
    /// Query parameters, sorted by key.
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

impl Route {
    /// Creates a route without query parameters.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: BTreeMap::new(),
        }
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Returns a query parameter.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Parses `"/path?key=value"`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRoute` if the path is not absolute.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let (path, query) = input.split_once('?').unwrap_or((input, ""));
        if !path.starts_with('/') {
            return Err(DomainError::InvalidRoute(input.to_string()));
        }
        let query = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Ok(Self {
            path: path.to_string(),
            query,
        })
    }
}

impl FromStr for Route {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

/// Stages a navigation attempt passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    /// Nothing evaluated yet.
    Unchecked,
    /// Looking for a session.
    CheckingLogin,
    /// Validating the stored token.
    CheckingToken,
    /// Fetching the permission tree.
    LoadingMenu,
    /// Matching the target against the tree.
    CheckingPathPermission,
    /// Navigation proceeds unmodified.
    Allowed,
    /// Navigation replaced by a redirect.
    Redirected,
}

impl GuardState {
    /// Returns true for `Allowed` and `Redirected`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Allowed | Self::Redirected)
    }
}

/// Final decision for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Navigate to the requested route.
    Allowed(Route),
    /// Navigate to `to` instead of `from`.
    Redirected {
        /// Route originally requested.
        from: Route,
        /// Replacement target.
        to: Route,
    },
}

impl NavigationOutcome {
    /// Route the router should commit.
    #[must_use]
    pub const fn target(&self) -> &Route {
        match self {
            Self::Allowed(route) => route,
            Self::Redirected { to, .. } => to,
        }
    }

    /// Returns true if navigation was allowed as requested.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// Terminal guard state for this outcome.
    #[must_use]
    pub const fn state(&self) -> GuardState {
        match self {
            Self::Allowed(_) => GuardState::Allowed,
            Self::Redirected { .. } => GuardState::Redirected,
        }
    }
}
