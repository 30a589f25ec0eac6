//! Role and permission checks for UI visibility and routing.

use std::sync::Arc;

use gatehouse_domain::{NodeField, PermissionTree};

use super::PermissionStore;
use crate::auth::{TokenStore, UserStore};

/// Pure reads over the loaded permission tree and the user's grants.
///
/// Never touches the network: the tree must already have been loaded by
/// the guard's menu bootstrap. Before that every check answers `false`.
#[derive(Clone)]
pub struct PermissionEvaluator {
    permissions: Arc<PermissionStore>,
    tokens: Arc<TokenStore>,
    users: Arc<UserStore>,
}

impl PermissionEvaluator {
    /// Creates an evaluator over the shared session state.
    #[must_use]
    pub const fn new(
        permissions: Arc<PermissionStore>,
        tokens: Arc<TokenStore>,
        users: Arc<UserStore>,
    ) -> Self {
        Self {
            permissions,
            tokens,
            users,
        }
    }

    fn tree(&self) -> Option<Arc<PermissionTree>> {
        self.permissions.tree_for(self.tokens.session_epoch())
    }

    /// Returns true if any node of the current tree has `field == value`.
    #[must_use]
    pub fn has_node(&self, field: NodeField, value: &str) -> bool {
        self.tree().is_some_and(|tree| tree.has_node(field, value))
    }

    /// Returns true if the current tree contains a node for `path`.
    #[must_use]
    pub fn can_access(&self, path: &str) -> bool {
        self.has_node(NodeField::Path, path)
    }

    /// Returns true if the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.users
            .user()
            .is_some_and(|user| user.roles.iter().any(|r| r == role))
    }

    /// Returns true if `code` appears in the tree or in the user's grants.
    #[must_use]
    pub fn has_permission(&self, code: &str) -> bool {
        self.has_node(NodeField::PermissionCode, code)
            || self
                .users
                .user()
                .is_some_and(|user| user.permissions.iter().any(|p| p == code))
    }

    /// Returns true if the user holds at least one of `roles`.
    #[must_use]
    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|role| self.has_role(role.as_ref()))
    }

    /// Returns true if at least one of `codes` is granted.
    #[must_use]
    pub fn has_any_permission<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        codes.iter().any(|code| self.has_permission(code.as_ref()))
    }
}
