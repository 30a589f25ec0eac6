//! Authentication endpoint port.

use async_trait::async_trait;
use gatehouse_domain::{Credentials, LoginGrant, TokenInfo};

use crate::ApplicationResult;

/// Network side of login and token refresh.
///
/// Implementations never retry; failures surface with their raw cause.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for a token grant.
    async fn login(&self, credentials: &Credentials) -> ApplicationResult<LoginGrant>;

    /// Exchanges a refresh token for a new token pair.
    async fn refresh(&self, refresh_token: &str) -> ApplicationResult<TokenInfo>;
}
