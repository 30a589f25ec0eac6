//! Authorized calls with one refresh-then-retry.

use std::sync::Arc;

use gatehouse_domain::{RequestConfig, TokenMode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ApplicationResult;
use crate::interceptor::RequestInterceptor;

/// Executes requests, recovering from one expired access token.
///
/// In dual-token mode an `Unauthorized` response triggers a single
/// refresh (shared with any concurrent refresh) and one retry. Only the
/// final failure reaches the interceptor's global error handling.
pub struct AuthorizedClient {
    interceptor: Arc<RequestInterceptor>,
}

impl AuthorizedClient {
    /// Creates a client over `interceptor`.
    #[must_use]
    pub const fn new(interceptor: Arc<RequestInterceptor>) -> Self {
        Self { interceptor }
    }

    /// Sends `config` and decodes the unwrapped payload.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the last attempt, after the global
    /// side effects for it have been applied.
    pub async fn execute<T: DeserializeOwned>(&self, config: RequestConfig) -> ApplicationResult<T> {
        match self.attempt(&config).await {
            Ok(value) => Ok(serde_json::from_value(value)?),
            Err(error) => {
                self.interceptor.report(&error, &config).await;
                Err(error)
            }
        }
    }

    async fn attempt(&self, config: &RequestConfig) -> ApplicationResult<Value> {
        let tokens = &self.interceptor.context().tokens;
        if tokens.try_get_valid_token().await.is_none() {
            tracing::debug!(url = %config.url, "Sending without a valid credential");
        }

        let error = match self.interceptor.dispatch(config).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let can_refresh =
            tokens.mode() == TokenMode::Double && !tokens.is_refresh_token_expired();
        if !error.requires_logout() || !can_refresh {
            return Err(error);
        }

        tracing::info!(url = %config.url, "Credential rejected, refreshing before retry");
        if let Err(refresh_err) = tokens.refresh_token().await {
            tracing::warn!(error = %refresh_err, "Refresh before retry failed");
            return Err(error);
        }
        self.interceptor.dispatch(config).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ApplicationError;
    use crate::ports::{NoticeLevel, RawResponse};
    use crate::testing::{envelope, interceptor_fixture};
    use gatehouse_domain::{Route, TokenInfo};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_retries_once_after_refresh() {
        let f = interceptor_fixture(TokenMode::Double);
        f.ctx()
            .tokens
            .set_token_info(TokenInfo::double("old", 600, "r1", 6000))
            .await
            .unwrap();
        f.session
            .api
            .push_refresh(Ok(TokenInfo::double("new", 600, "r2", 6000)));
        f.transport.push(Ok(RawResponse::new(401, "")));
        f.transport.push(Ok(envelope(200, "ok", json!({"id": 9}))));

        let client = AuthorizedClient::new(f.interceptor.clone());
        let value: Value = client.execute(RequestConfig::get("/orders/9")).await.unwrap();

        assert_eq!(value, json!({"id": 9}));
        assert_eq!(f.session.api.refresh_calls(), 1);
        let sent = f.transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].headers.get("Authorization").unwrap(), "Bearer old");
        assert_eq!(sent[1].headers.get("Authorization").unwrap(), "Bearer new");
        assert!(f.notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_expired_access_refreshed_before_first_attempt() {
        let f = interceptor_fixture(TokenMode::Double);
        f.ctx()
            .tokens
            .set_token_info(TokenInfo::double("old", 10, "r1", 6000))
            .await
            .unwrap();
        f.session
            .api
            .push_refresh(Ok(TokenInfo::double("new", 600, "r2", 6000)));
        f.session.clock.advance_secs(11);
        f.transport.push(Ok(envelope(200, "ok", Value::Null)));

        let client = AuthorizedClient::new(f.interceptor.clone());
        let _: Value = client.execute(RequestConfig::get("/orders")).await.unwrap();

        let sent = f.transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].headers.get("Authorization").unwrap(), "Bearer new");
    }

    #[tokio::test]
    async fn test_single_mode_fails_without_retry() {
        let f = interceptor_fixture(TokenMode::Single);
        f.ctx()
            .tokens
            .set_token_info(TokenInfo::single("tok", 600))
            .await
            .unwrap();
        f.transport.push(Ok(RawResponse::new(401, "")));

        let client = AuthorizedClient::new(f.interceptor.clone());
        let result: ApplicationResult<Value> = client.execute(RequestConfig::get("/orders")).await;

        assert!(result.unwrap_err().requires_logout());
        assert_eq!(f.transport.requests().len(), 1);
        assert_eq!(f.session.api.refresh_calls(), 0);
        assert!(!f.ctx().tokens.has_session());
        assert_eq!(f.navigator.redirects(), vec![Route::new("/login")]);
    }

    #[tokio::test]
    async fn test_failed_refresh_reports_original_error() {
        let f = interceptor_fixture(TokenMode::Double);
        f.ctx()
            .tokens
            .set_token_info(TokenInfo::double("old", 600, "r1", 6000))
            .await
            .unwrap();
        f.session.api.push_refresh(Err(ApplicationError::Unauthorized {
            message: "refresh revoked".to_string(),
        }));
        f.transport.push(Ok(envelope(401, "token expired", Value::Null)));

        let client = AuthorizedClient::new(f.interceptor.clone());
        let result: ApplicationResult<Value> = client.execute(RequestConfig::get("/orders")).await;

        assert_eq!(
            result.unwrap_err(),
            ApplicationError::Unauthorized {
                message: "token expired".to_string()
            }
        );
        assert_eq!(f.transport.requests().len(), 1);
        assert!(!f.ctx().tokens.has_session());
        assert_eq!(
            f.notifier.notices(),
            vec![(NoticeLevel::Warning, "token expired".to_string())]
        );
    }

    #[tokio::test]
    async fn test_business_error_not_retried() {
        let f = interceptor_fixture(TokenMode::Double);
        f.ctx()
            .tokens
            .set_token_info(TokenInfo::double("old", 600, "r1", 6000))
            .await
            .unwrap();
        f.transport.push(Ok(envelope(5001, "out of stock", Value::Null)));

        let client = AuthorizedClient::new(f.interceptor.clone());
        let result: ApplicationResult<Value> = client.execute(RequestConfig::get("/cart")).await;

        assert!(matches!(result, Err(ApplicationError::Business { code: 5001, .. })));
        assert_eq!(f.session.api.refresh_calls(), 0);
        assert!(f.ctx().tokens.has_session());
    }
}
