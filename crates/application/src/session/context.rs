//! Explicit session context shared by the guard and the interceptor.

use std::sync::Arc;

use gatehouse_domain::SessionConfig;

use crate::ApplicationResult;
use crate::auth::{TokenStore, UserStore};
use crate::permission::{PermissionEvaluator, PermissionStore};
use crate::ports::{AuthApi, Clock, KeyValueStore};

/// Token, user and permission state for one app instance.
///
/// Cloning shares the same underlying stores. Everything outside the
/// stores treats this state as read-only.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Configuration the stores were built with.
    pub config: Arc<SessionConfig>,
    /// Token pair and expiry.
    pub tokens: Arc<TokenStore>,
    /// User profile.
    pub users: Arc<UserStore>,
    /// Permission tree snapshot.
    pub permissions: Arc<PermissionStore>,
}

impl SessionContext {
    /// Wires the stores over shared storage, clock and auth API.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        api: Arc<dyn AuthApi>,
    ) -> Self {
        let users = Arc::new(UserStore::new(&config, storage.clone()));
        let tokens = Arc::new(TokenStore::new(
            &config,
            storage,
            clock,
            api,
            users.clone(),
        ));
        Self {
            config: Arc::new(config),
            tokens,
            users,
            permissions: Arc::new(PermissionStore::new()),
        }
    }

    /// Loads persisted token and user state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    pub async fn restore(&self) -> ApplicationResult<()> {
        self.tokens.restore().await?;
        self.users.restore().await?;
        tracing::debug!(
            has_session = self.tokens.has_session(),
            "Session state restored"
        );
        Ok(())
    }

    /// Permission checks over this context.
    #[must_use]
    pub fn evaluator(&self) -> PermissionEvaluator {
        PermissionEvaluator::new(
            self.permissions.clone(),
            self.tokens.clone(),
            self.users.clone(),
        )
    }
}
