//! Login and refresh endpoints over the HTTP transport.
//!
//! These calls never go through `RequestInterceptor::dispatch`: they carry
//! no bearer credential, trigger no global error handling, and surface every
//! failure to the caller with its raw cause. `SessionService::login` runs
//! login inside `RequestInterceptor::scoped` for its request span and
//! loading indicator; `TokenStore` gives each refresh its own span.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_application::interceptor::{classify_response, resolve_url};
use gatehouse_application::ports::{AuthApi, HttpTransport, OutboundRequest};
use gatehouse_application::ApplicationResult;
use gatehouse_domain::{
    Credentials, HttpMethod, LoginGrant, LoginResponse, SessionConfig, TokenInfo, TokenMode,
    token_preview,
};
use serde_json::{Value, json};

/// Content-Type for JSON bodies.
const JSON_CONTENT_TYPE: &str = "application/json";

/// `AuthApi` that talks to the configured login and refresh endpoints.
pub struct HttpAuthApi {
    transport: Arc<dyn HttpTransport>,
    config: Arc<SessionConfig>,
}

impl HttpAuthApi {
    /// Creates the API client.
    #[must_use]
    pub const fn new(transport: Arc<dyn HttpTransport>, config: Arc<SessionConfig>) -> Self {
        Self { transport, config }
    }

    async fn post(&self, path: &str, body: Value) -> ApplicationResult<Value> {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
        headers.insert("Accept".to_string(), JSON_CONTENT_TYPE.to_string());

        let request = OutboundRequest {
            method: HttpMethod::Post,
            url: resolve_url(&self.config.endpoints.base_url, path),
            headers,
            query: BTreeMap::new(),
            body: Some(body),
            timeout_ms: self.config.request_timeout_ms,
        };
        let response = self.transport.send(request).await?;
        classify_response(&response, self.config.response_codes)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> ApplicationResult<LoginGrant> {
        let payload = self
            .post(
                &self.config.endpoints.login,
                json!({
                    "username": credentials.username,
                    "password": credentials.password,
                }),
            )
            .await?;

        let response: LoginResponse = serde_json::from_value(payload)?;
        let grant = response.into_grant(self.config.token_mode, self.config.default_token_ttl_secs)?;
        tracing::debug!(
            username = %credentials.username,
            token = %token_preview(grant.token.bearer()),
            "Login accepted"
        );
        Ok(grant)
    }

    async fn refresh(&self, refresh_token: &str) -> ApplicationResult<TokenInfo> {
        let payload = self
            .post(
                &self.config.endpoints.refresh,
                json!({ "refreshToken": refresh_token }),
            )
            .await?;

        let info: TokenInfo = serde_json::from_value(payload)?;
        info.ensure_mode(TokenMode::Double)?;
        Ok(info)
    }
}
