//! Request interceptor.
//!
//! Decorates every outbound call with the bearer credential and JSON
//! headers, classifies the response, and applies the global side effects
//! of a failure (toast, forced logout, redirect to login) exactly once.
//! It never retries; see `AuthorizedClient` for refresh-then-retry.

mod classify;
mod loading;

use std::collections::BTreeMap;
use std::sync::Arc;

use gatehouse_domain::{HttpMethod, RequestConfig, Route};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

pub use classify::{classify_response, status_error};
pub use loading::LoadingScope;

use crate::ports::{HttpTransport, LoadingIndicator, Navigator, NoticeLevel, Notifier, OutboundRequest};
use crate::session::SessionContext;
use crate::{ApplicationError, ApplicationResult};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Wraps the HTTP transport with credential injection and error handling.
pub struct RequestInterceptor {
    ctx: SessionContext,
    transport: Arc<dyn HttpTransport>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    loading: Arc<dyn LoadingIndicator>,
}

impl RequestInterceptor {
    /// Creates an interceptor over the given session and UI surface.
    #[must_use]
    pub fn new(
        ctx: SessionContext,
        transport: Arc<dyn HttpTransport>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        loading: Arc<dyn LoadingIndicator>,
    ) -> Self {
        Self {
            ctx,
            transport,
            notifier,
            navigator,
            loading,
        }
    }

    /// Session this interceptor reads credentials from.
    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Sends a request and decodes the unwrapped payload.
    ///
    /// On failure the global side effects are applied before the error is
    /// returned, unless `config.skip_error_handler` is set.
    ///
    /// # Errors
    ///
    /// Returns the classified error of a failed call, or `Serialization` if
    /// the payload does not decode as `T`.
    pub async fn request<T: DeserializeOwned>(&self, config: RequestConfig) -> ApplicationResult<T> {
        match self.dispatch(&config).await {
            Ok(value) => Ok(serde_json::from_value(value)?),
            Err(error) => {
                self.report(&error, &config).await;
                Err(error)
            }
        }
    }

    /// Sends a request and classifies the response without any global
    /// side effect.
    ///
    /// # Errors
    ///
    /// Returns the classified error of a failed call.
    pub async fn dispatch(&self, config: &RequestConfig) -> ApplicationResult<Value> {
        let exchange = async {
            let outbound = self.decorate(config);
            let response = self.transport.send(outbound).await?;
            tracing::debug!(status = response.status, "Response received");
            classify_response(&response, self.ctx.config.response_codes)
        };
        self.scoped(
            config.method,
            &config.url,
            config.show_loading,
            config.loading_text.as_deref(),
            exchange,
        )
        .await
    }

    /// Runs `call` as one tracked exchange: inside a `request` span with a
    /// fresh request id, and under the loading indicator when
    /// `show_loading` is set.
    ///
    /// `dispatch` runs every intercepted call through it. Login uses it
    /// directly, since it must not carry the session credential. Nothing is
    /// classified or reported here.
    pub async fn scoped<F, T>(
        &self,
        method: HttpMethod,
        url: &str,
        show_loading: bool,
        loading_text: Option<&str>,
        call: F,
    ) -> T
    where
        F: Future<Output = T>,
    {
        let request_id = Uuid::now_v7();
        let span = tracing::debug_span!("request", %request_id, %method, %url);

        async {
            let _loading = LoadingScope::enter(self.loading.as_ref(), show_loading, loading_text);
            call.await
        }
        .instrument(span)
        .await
    }

    /// Applies the global side effects of `error` for one failed call.
    ///
    /// `AuthExpired`/`Unauthorized` always clear the session; the toast and
    /// the redirect to login are skipped when the call opted out.
    pub async fn report(&self, error: &ApplicationError, config: &RequestConfig) {
        tracing::warn!(url = %config.url, error = %error, "Request failed");

        if error.requires_logout() {
            if let Err(e) = self.ctx.tokens.logout().await {
                tracing::error!(error = %e, "Forced logout could not clear persisted state");
            }
            self.ctx.permissions.clear();
            if config.skip_error_handler {
                return;
            }
            self.notifier
                .notify(NoticeLevel::Warning, &error.user_message());
            self.navigator
                .redirect(&Route::new(&self.ctx.config.routes.login_path));
            return;
        }

        if !config.skip_error_handler {
            self.notifier.notify(NoticeLevel::Error, &error.user_message());
        }
    }

    fn decorate(&self, config: &RequestConfig) -> OutboundRequest {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
        headers.insert("Accept".to_string(), JSON_CONTENT_TYPE.to_string());
        if !config.has_header("Authorization")
            && let Some(token) = self.ctx.tokens.get_valid_token()
        {
            headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        }
        for (name, value) in &config.headers {
            headers.retain(|existing: &String, _| !existing.eq_ignore_ascii_case(name));
            headers.insert(name.clone(), value.clone());
        }

        OutboundRequest {
            method: config.method,
            url: resolve_url(&self.ctx.config.endpoints.base_url, &config.url),
            headers,
            query: config.params.clone(),
            body: config.data.clone(),
            timeout_ms: self.ctx.config.request_timeout_ms,
        }
    }
}

/// Joins a relative request URL onto the API base URL.
#[must_use]
pub fn resolve_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}
