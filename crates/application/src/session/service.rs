//! Login, logout and profile flows.

use std::sync::Arc;

use gatehouse_domain::{Credentials, HttpMethod, RequestConfig, UserInfo};

use super::SessionContext;
use crate::ApplicationResult;
use crate::auth::TokenStatus;
use crate::interceptor::RequestInterceptor;
use crate::ports::AuthApi;

const SIGN_IN_TEXT: &str = "Signing in...";

/// Entry points a login screen and a user menu call into.
pub struct SessionService {
    ctx: SessionContext,
    api: Arc<dyn AuthApi>,
    interceptor: Arc<RequestInterceptor>,
}

impl SessionService {
    /// Creates the service. `interceptor` must wrap the same `ctx`.
    #[must_use]
    pub const fn new(
        ctx: SessionContext,
        api: Arc<dyn AuthApi>,
        interceptor: Arc<RequestInterceptor>,
    ) -> Self {
        Self {
            ctx,
            api,
            interceptor,
        }
    }

    /// Signs in, replacing any existing session.
    ///
    /// Returns the profile carried by the login response, if any. A failed
    /// login leaves the store signed out and applies no global side effect;
    /// the login screen shows its own error.
    ///
    /// # Errors
    ///
    /// Returns the raw cause of a failed login, `Domain(TokenModeMismatch)`
    /// if the response cannot satisfy the configured mode, or a storage
    /// error.
    pub async fn login(&self, credentials: &Credentials) -> ApplicationResult<Option<UserInfo>> {
        if self.ctx.tokens.has_session() {
            self.logout().await?;
        }

        tracing::info!(username = %credentials.username, "Signing in");
        let grant = self
            .interceptor
            .scoped(
                HttpMethod::Post,
                &self.ctx.config.endpoints.login,
                true,
                Some(SIGN_IN_TEXT),
                self.api.login(credentials),
            )
            .await?;
        self.ctx.tokens.set_token_info(grant.token).await?;
        if let Some(user) = &grant.user {
            self.ctx.users.set_user(user.clone()).await?;
        }
        Ok(grant.user)
    }

    /// Signs out and drops the permission tree. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if persisted state cannot be removed.
    pub async fn logout(&self) -> ApplicationResult<()> {
        self.ctx.permissions.clear();
        self.ctx.tokens.logout().await
    }

    /// Replaces the stored profile from the profile endpoint.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call, after the interceptor's
    /// global side effects.
    pub async fn refresh_profile(&self) -> ApplicationResult<UserInfo> {
        let path = self.ctx.config.endpoints.profile.clone();
        let user: UserInfo = self.interceptor.request(RequestConfig::get(path)).await?;
        self.ctx.users.set_user(user.clone()).await?;
        Ok(user)
    }

    /// Loads persisted session state on startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    pub async fn restore(&self) -> ApplicationResult<()> {
        self.ctx.restore().await
    }

    /// Current token status.
    #[must_use]
    pub fn status(&self) -> TokenStatus {
        self.ctx.tokens.status()
    }

    /// Session this service operates on.
    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.ctx
    }
}
