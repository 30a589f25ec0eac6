//! One fully wired session client.

use std::sync::Arc;

use gatehouse_application::ports::{HttpTransport, KeyValueStore};
use gatehouse_application::{
    ApplicationResult, AuthorizedClient, RemoteMenuSource, RequestInterceptor, SessionContext,
    SessionGuard, SessionService, TokenStatus,
};
use gatehouse_domain::{Credentials, NavigationOutcome, RequestConfig, Route, SessionConfig, UserInfo};
use gatehouse_infrastructure::{
    FileKeyValueStore, HistoryNavigator, HttpAuthApi, ReqwestTransport, SystemClock,
    TracingLoadingIndicator, TracingNotifier,
};
use serde_json::Value;

use crate::config::AppConfig;

/// Session context plus the guard, interceptor and flows built on it.
pub struct Gatehouse {
    ctx: SessionContext,
    service: SessionService,
    guard: SessionGuard,
    client: AuthorizedClient,
    navigator: Arc<HistoryNavigator>,
}

impl Gatehouse {
    /// Wires the production adapters described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let storage = Arc::new(FileKeyValueStore::new(config.resolved_storage_path()));
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::assemble(config.session.clone(), storage, transport))
    }

    /// Wires a client over the given storage and transport.
    #[must_use]
    pub fn assemble(
        session: SessionConfig,
        storage: Arc<dyn KeyValueStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let api = Arc::new(HttpAuthApi::new(
            transport.clone(),
            Arc::new(session.clone()),
        ));
        let ctx = SessionContext::new(session, storage, Arc::new(SystemClock::new()), api.clone());

        let navigator = Arc::new(HistoryNavigator::new());
        let interceptor = Arc::new(RequestInterceptor::new(
            ctx.clone(),
            transport,
            Arc::new(TracingNotifier),
            navigator.clone(),
            Arc::new(TracingLoadingIndicator::new()),
        ));
        let menus = Arc::new(RemoteMenuSource::new(interceptor.clone()));

        Self {
            guard: SessionGuard::new(ctx.clone(), menus),
            client: AuthorizedClient::new(interceptor.clone()),
            service: SessionService::new(ctx.clone(), api, interceptor),
            ctx,
            navigator,
        }
    }

    /// Loads persisted session state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be read.
    pub async fn restore(&self) -> ApplicationResult<()> {
        self.service.restore().await
    }

    /// Signs in with a username and password.
    ///
    /// # Errors
    ///
    /// Returns the cause of a failed login.
    pub async fn login(&self, username: &str, password: &str) -> ApplicationResult<Option<UserInfo>> {
        self.service
            .login(&Credentials::new(username, password))
            .await
    }

    /// Signs out.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be updated.
    pub async fn logout(&self) -> ApplicationResult<()> {
        self.service.logout().await
    }

    /// Current token status.
    #[must_use]
    pub fn status(&self) -> TokenStatus {
        self.service.status()
    }

    /// Signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserInfo> {
        self.ctx.users.user()
    }

    /// Runs a navigation attempt through the route guard.
    pub async fn navigate(&self, to: Route) -> NavigationOutcome {
        self.guard.navigate(to).await
    }

    /// Sends `request` with the session credential, refreshing once if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the final attempt.
    pub async fn execute(&self, request: RequestConfig) -> ApplicationResult<Value> {
        self.client.execute(request).await
    }

    /// Redirects forced by failed requests, oldest first.
    #[must_use]
    pub fn forced_redirects(&self) -> Vec<Route> {
        self.navigator.history()
    }

    /// Shared session state.
    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.ctx
    }
}
