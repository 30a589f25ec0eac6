//! Session configuration.
//!
//! Every field has a default so a deployment only overrides what differs.

use serde::{Deserialize, Serialize};

use crate::route::Route;
use crate::token::TokenMode;

/// Top-level configuration for a session client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Token representation, fixed for the process lifetime.
    pub token_mode: TokenMode,
    /// Prefix for persisted keys, `"{namespace}:{key}"`.
    pub storage_namespace: String,
    /// Lifetime applied when a login response carries no expiry.
    pub default_token_ttl_secs: u64,
    /// Window before expiry in which a token is reported as expiring.
    pub expiring_buffer_secs: u64,
    /// Per-request timeout.
    pub request_timeout_ms: u64,
    /// Well-known routes.
    pub routes: RouteConfig,
    /// API endpoints.
    pub endpoints: ApiEndpoints,
    /// Business status codes.
    pub response_codes: ResponseCodes,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_mode: TokenMode::Single,
            storage_namespace: "gatehouse".to_string(),
            default_token_ttl_secs: 7 * 24 * 3600,
            expiring_buffer_secs: 60,
            request_timeout_ms: 30_000,
            routes: RouteConfig::default(),
            endpoints: ApiEndpoints::default(),
            response_codes: ResponseCodes::default(),
        }
    }
}

impl SessionConfig {
    /// Builds the persisted key for `key` under this deployment's namespace.
    #[must_use]
    pub fn storage_key(&self, key: &str) -> String {
        if self.storage_namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}:{key}", self.storage_namespace)
        }
    }
}

/// Routes the guard and interceptor redirect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Login page.
    pub login_path: String,
    /// Landing page after login.
    pub home_path: String,
    /// Not-found / forbidden page.
    pub not_found_path: String,
    /// Paths that skip every guard check.
    pub public_paths: Vec<String>,
    /// Query parameter carrying the originally requested route.
    pub redirect_param: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            home_path: "/".to_string(),
            not_found_path: "/404".to_string(),
            public_paths: vec!["/login".to_string(), "/404".to_string()],
            redirect_param: "redirect".to_string(),
        }
    }
}

impl RouteConfig {
    /// Returns true if `path` bypasses the guard.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|public| public == path)
    }

    /// Login route carrying `from` as the redirect parameter.
    ///
    /// The login page itself and the home page are not preserved.
    #[must_use]
    pub fn login_redirect(&self, from: &Route) -> Route {
        let login = Route::new(&self.login_path);
        if from.path == self.login_path || from.path == self.home_path {
            login
        } else {
            login.with_query(&self.redirect_param, from.to_string())
        }
    }

    /// Home route.
    #[must_use]
    pub fn home(&self) -> Route {
        Route::new(&self.home_path)
    }

    /// Not-found route.
    #[must_use]
    pub fn not_found(&self) -> Route {
        Route::new(&self.not_found_path)
    }
}

/// API endpoint locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    /// Base URL every relative request URL is joined to.
    pub base_url: String,
    /// Login endpoint.
    pub login: String,
    /// Token refresh endpoint.
    pub refresh: String,
    /// Menu / permission tree endpoint.
    pub menus: String,
    /// Current user profile endpoint.
    pub profile: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            login: "/auth/login".to_string(),
            refresh: "/auth/refresh".to_string(),
            menus: "/system/menus".to_string(),
            profile: "/auth/profile".to_string(),
        }
    }
}

/// Business codes carried in the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseCodes {
    /// Success sentinel.
    pub success: i64,
    /// Unauthorized sentinel; triggers forced logout.
    pub unauthorized: i64,
}

impl Default for ResponseCodes {
    fn default() -> Self {
        Self {
            success: 200,
            unauthorized: 401,
        }
    }
}
