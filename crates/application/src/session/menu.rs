//! Permission tree fetched through the interceptor.

use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_domain::{PermissionTree, RequestConfig};

use crate::ApplicationResult;
use crate::interceptor::RequestInterceptor;
use crate::ports::MenuSource;

/// Reads the menu endpoint with the session's bearer credential.
///
/// The guard turns any failure into a redirect, so the global toast and
/// redirect are suppressed for this call.
pub struct RemoteMenuSource {
    interceptor: Arc<RequestInterceptor>,
}

impl RemoteMenuSource {
    /// Creates a source over `interceptor`.
    #[must_use]
    pub const fn new(interceptor: Arc<RequestInterceptor>) -> Self {
        Self { interceptor }
    }
}

#[async_trait]
impl MenuSource for RemoteMenuSource {
    async fn fetch_menus(&self) -> ApplicationResult<PermissionTree> {
        let path = self.interceptor.context().config.endpoints.menus.clone();
        let tree: Option<PermissionTree> = self
            .interceptor
            .request(RequestConfig::get(path).skip_error_handler())
            .await?;
        Ok(tree.unwrap_or_default())
    }
}
