//! The ordered checks of the navigation pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_domain::{GuardState, NodeField, Route};

use super::{CheckOutcome, GuardCheck};
use crate::auth::is_structurally_valid;
use crate::ports::MenuSource;
use crate::session::SessionContext;

/// Lets allow-listed routes through untouched.
///
/// The login page always falls through to `LoginCheck`, which allows it
/// only when no session can be produced, refreshing first if needed.
pub struct PublicRouteCheck {
    ctx: SessionContext,
}

impl PublicRouteCheck {
    /// Creates the check.
    #[must_use]
    pub const fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl GuardCheck for PublicRouteCheck {
    fn stage(&self) -> GuardState {
        GuardState::Unchecked
    }

    async fn check(&self, to: &Route) -> CheckOutcome {
        let routes = &self.ctx.config.routes;
        if !routes.is_public(&to.path) || to.path == routes.login_path {
            return CheckOutcome::Continue;
        }
        CheckOutcome::Allow
    }
}

/// Requires a session; bounces signed-in users off the login page.
pub struct LoginCheck {
    ctx: SessionContext,
}

impl LoginCheck {
    /// Creates the check.
    #[must_use]
    pub const fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl GuardCheck for LoginCheck {
    fn stage(&self) -> GuardState {
        GuardState::CheckingLogin
    }

    async fn check(&self, to: &Route) -> CheckOutcome {
        let routes = &self.ctx.config.routes;
        let on_login_page = to.path == routes.login_path;
        match (self.ctx.tokens.try_get_valid_token().await, on_login_page) {
            (Some(_), true) => CheckOutcome::Redirect(routes.home()),
            (Some(_), false) => CheckOutcome::Continue,
            (None, true) => CheckOutcome::Allow,
            (None, false) => CheckOutcome::Redirect(routes.login_redirect(to)),
        }
    }
}

/// Rejects a stored token that cannot be a bearer credential.
pub struct TokenValidityCheck {
    ctx: SessionContext,
}

impl TokenValidityCheck {
    /// Creates the check.
    #[must_use]
    pub const fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl GuardCheck for TokenValidityCheck {
    fn stage(&self) -> GuardState {
        GuardState::CheckingToken
    }

    async fn check(&self, to: &Route) -> CheckOutcome {
        let valid = self
            .ctx
            .tokens
            .get_valid_token()
            .is_some_and(|token| is_structurally_valid(&token));
        if valid {
            return CheckOutcome::Continue;
        }

        tracing::warn!(path = %to.path, "Stored token is malformed, clearing session");
        if let Err(e) = self.ctx.tokens.logout().await {
            tracing::error!(error = %e, "Failed to clear malformed session");
        }
        CheckOutcome::Redirect(self.ctx.config.routes.login_redirect(to))
    }
}

/// Loads the permission tree once per session.
pub struct MenuBootstrapCheck {
    ctx: SessionContext,
    menus: Arc<dyn MenuSource>,
}

impl MenuBootstrapCheck {
    /// Creates the check.
    #[must_use]
    pub fn new(ctx: SessionContext, menus: Arc<dyn MenuSource>) -> Self {
        Self { ctx, menus }
    }
}

#[async_trait]
impl GuardCheck for MenuBootstrapCheck {
    fn stage(&self) -> GuardState {
        GuardState::LoadingMenu
    }

    async fn check(&self, to: &Route) -> CheckOutcome {
        let epoch = self.ctx.tokens.session_epoch();
        if self.ctx.permissions.is_loaded_for(epoch) {
            return CheckOutcome::Continue;
        }

        match self.menus.fetch_menus().await {
            Ok(tree) => {
                self.ctx.permissions.replace(epoch, tree);
                CheckOutcome::Continue
            }
            Err(e) => {
                tracing::warn!(error = %e, "Menu bootstrap failed");
                if e.requires_logout()
                    && let Err(clear_err) = self.ctx.tokens.logout().await
                {
                    tracing::error!(error = %clear_err, "Failed to clear session after menu failure");
                }
                CheckOutcome::Redirect(self.ctx.config.routes.login_redirect(to))
            }
        }
    }
}

/// Requires the target path to be a node of the permission tree.
///
/// The home route is always reachable once signed in.
pub struct PathPermissionCheck {
    ctx: SessionContext,
}

impl PathPermissionCheck {
    /// Creates the check.
    #[must_use]
    pub const fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl GuardCheck for PathPermissionCheck {
    fn stage(&self) -> GuardState {
        GuardState::CheckingPathPermission
    }

    async fn check(&self, to: &Route) -> CheckOutcome {
        let routes = &self.ctx.config.routes;
        if to.path == routes.home_path {
            return CheckOutcome::Continue;
        }
        let permitted = self
            .ctx
            .permissions
            .tree_for(self.ctx.tokens.session_epoch())
            .is_some_and(|tree| tree.has_node(NodeField::Path, &to.path));
        if permitted {
            CheckOutcome::Continue
        } else {
            tracing::info!(path = %to.path, "Path not in permission tree");
            CheckOutcome::Redirect(routes.not_found())
        }
    }
}
