//! Menu endpoint port.

use async_trait::async_trait;
use gatehouse_domain::PermissionTree;

use crate::ApplicationResult;

/// Source of the permission tree for the current session.
#[async_trait]
pub trait MenuSource: Send + Sync {
    /// Fetches the full tree for the signed-in user.
    async fn fetch_menus(&self) -> ApplicationResult<PermissionTree>;
}
