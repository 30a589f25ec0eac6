//! Route authorization pipeline.
//!
//! Each navigation attempt runs an ordered list of checks. A check either
//! passes the attempt on, or ends it with `Allow` or a redirect. Checks run
//! strictly one after another, and attempts on the same guard never
//! interleave.

mod checks;

use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_domain::{GuardState, NavigationOutcome, Route};

pub use checks::{
    LoginCheck, MenuBootstrapCheck, PathPermissionCheck, PublicRouteCheck, TokenValidityCheck,
};

use crate::ports::MenuSource;
use crate::session::SessionContext;

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Run the next check.
    Continue,
    /// Stop and allow navigation.
    Allow,
    /// Stop and navigate here instead.
    Redirect(Route),
}

/// One step of the navigation pipeline.
#[async_trait]
pub trait GuardCheck: Send + Sync {
    /// Stage reported while this check runs.
    fn stage(&self) -> GuardState;

    /// Evaluates the target route.
    async fn check(&self, to: &Route) -> CheckOutcome;
}

/// Runs navigation attempts through the check pipeline.
pub struct SessionGuard {
    checks: Vec<Box<dyn GuardCheck>>,
    navigation: tokio::sync::Mutex<()>,
}

impl SessionGuard {
    /// Builds the standard pipeline: public routes, login, token validity,
    /// menu bootstrap, path permission.
    #[must_use]
    pub fn new(ctx: SessionContext, menus: Arc<dyn MenuSource>) -> Self {
        Self::with_checks(vec![
            Box::new(PublicRouteCheck::new(ctx.clone())),
            Box::new(LoginCheck::new(ctx.clone())),
            Box::new(TokenValidityCheck::new(ctx.clone())),
            Box::new(MenuBootstrapCheck::new(ctx.clone(), menus)),
            Box::new(PathPermissionCheck::new(ctx)),
        ])
    }

    /// Builds a guard from a custom check list.
    #[must_use]
    pub fn with_checks(checks: Vec<Box<dyn GuardCheck>>) -> Self {
        Self {
            checks,
            navigation: tokio::sync::Mutex::new(()),
        }
    }

    /// Resolves a navigation attempt to a terminal outcome.
    pub async fn navigate(&self, to: Route) -> NavigationOutcome {
        let _attempt = self.navigation.lock().await;
        let mut state = GuardState::Unchecked;

        for check in &self.checks {
            let stage = check.stage();
            if stage != state {
                tracing::trace!(from = ?state, to = ?stage, path = %to.path, "Guard stage");
                state = stage;
            }

            match check.check(&to).await {
                CheckOutcome::Continue => {}
                CheckOutcome::Allow => {
                    tracing::debug!(path = %to.path, stage = ?state, "Navigation allowed");
                    return NavigationOutcome::Allowed(to);
                }
                CheckOutcome::Redirect(target) => {
                    tracing::info!(from = %to, to = %target, stage = ?state, "Navigation redirected");
                    return NavigationOutcome::Redirected {
                        from: to,
                        to: target,
                    };
                }
            }
        }

        tracing::debug!(path = %to.path, "Navigation allowed");
        NavigationOutcome::Allowed(to)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ApplicationError;
    use crate::testing::{ScriptedMenuSource, SessionFixture, session_fixture};
    use gatehouse_domain::{PermissionNode, PermissionTree, TokenInfo, TokenMode};
    use pretty_assertions::assert_eq;

    fn menu_tree() -> PermissionTree {
        PermissionTree::new(vec![
            PermissionNode::new("1", "Dashboard", "/dashboard"),
            PermissionNode::new("2", "System", "/system")
                .with_child(PermissionNode::new("3", "Users", "/system/users")),
        ])
    }

    fn guard(f: &SessionFixture, menus: &Arc<ScriptedMenuSource>) -> SessionGuard {
        SessionGuard::new(f.ctx.clone(), menus.clone())
    }

    async fn signed_in(mode: TokenMode) -> SessionFixture {
        let f = session_fixture(mode);
        let token = match mode {
            TokenMode::Single => TokenInfo::single("tok", 600),
            TokenMode::Double => TokenInfo::double("acc", 60, "ref", 6000),
        };
        f.ctx.tokens.set_token_info(token).await.unwrap();
        f
    }

    #[tokio::test]
    async fn test_no_token_redirects_to_login_with_target() {
        let f = session_fixture(TokenMode::Single);
        let menus = Arc::new(ScriptedMenuSource::with_tree(menu_tree()));

        let outcome = guard(&f, &menus).navigate(Route::new("/dashboard")).await;

        assert_eq!(
            outcome,
            NavigationOutcome::Redirected {
                from: Route::new("/dashboard"),
                to: Route::new("/login").with_query("redirect", "/dashboard"),
            }
        );
        assert_eq!(menus.calls(), 0);
    }

    #[tokio::test]
    async fn test_login_page_with_valid_token_redirects_home() {
        let f = signed_in(TokenMode::Single).await;
        let menus = Arc::new(ScriptedMenuSource::with_tree(menu_tree()));

        let outcome = guard(&f, &menus).navigate(Route::new("/login")).await;

        assert_eq!(outcome.target(), &Route::new("/"));
        assert_eq!(outcome.state(), GuardState::Redirected);
    }

    #[tokio::test]
    async fn test_public_routes_bypass_when_signed_out() {
        let f = session_fixture(TokenMode::Single);
        let menus = Arc::new(ScriptedMenuSource::with_tree(menu_tree()));
        let guard = guard(&f, &menus);

        assert!(guard.navigate(Route::new("/login")).await.is_allowed());
        assert!(guard.navigate(Route::new("/404")).await.is_allowed());
        assert_eq!(menus.calls(), 0);
    }

    #[tokio::test]
    async fn test_permitted_path_loads_menu_once() {
        let f = signed_in(TokenMode::Single).await;
        let menus = Arc::new(ScriptedMenuSource::with_tree(menu_tree()));
        let guard = guard(&f, &menus);

        assert!(guard.navigate(Route::new("/system/users")).await.is_allowed());
        assert!(guard.navigate(Route::new("/dashboard")).await.is_allowed());
        assert!(guard.navigate(Route::new("/")).await.is_allowed());
        assert_eq!(menus.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_path_redirects_to_not_found() {
        let f = signed_in(TokenMode::Single).await;
        let menus = Arc::new(ScriptedMenuSource::with_tree(menu_tree()));

        let outcome = guard(&f, &menus).navigate(Route::new("/mall/orders")).await;

        assert_eq!(outcome.target(), &Route::new("/404"));
    }

    #[tokio::test]
    async fn test_menu_failure_redirects_to_login() {
        let f = signed_in(TokenMode::Single).await;
        let menus = Arc::new(ScriptedMenuSource::with_tree(menu_tree()));
        menus.push(Err(ApplicationError::Unauthorized {
            message: "expired".to_string(),
        }));

        let outcome = guard(&f, &menus).navigate(Route::new("/dashboard")).await;

        assert_eq!(outcome.target().path, "/login");
        assert_eq!(outcome.target().query_param("redirect"), Some("/dashboard"));
        assert!(!f.ctx.tokens.has_session());
    }

    #[tokio::test]
    async fn test_malformed_token_redirects_to_login() {
        let f = session_fixture(TokenMode::Single);
        f.ctx
            .tokens
            .set_token_info(TokenInfo::single("not a token", 600))
            .await
            .unwrap();
        let menus = Arc::new(ScriptedMenuSource::with_tree(menu_tree()));

        let outcome = guard(&f, &menus).navigate(Route::new("/dashboard")).await;

        assert_eq!(outcome.target().path, "/login");
        assert!(!f.ctx.tokens.has_session());
        assert_eq!(menus.calls(), 0);
    }

    #[tokio::test]
    async fn test_expired_access_token_refreshed_during_navigation() {
        let f = signed_in(TokenMode::Double).await;
        f.api
            .push_refresh(Ok(TokenInfo::double("acc2", 60, "ref2", 6000)));
        f.clock.advance_secs(61);
        let menus = Arc::new(ScriptedMenuSource::with_tree(menu_tree()));

        let outcome = guard(&f, &menus).navigate(Route::new("/dashboard")).await;

        assert!(outcome.is_allowed());
        assert_eq!(f.api.refresh_calls(), 1);
        assert_eq!(f.ctx.tokens.get_valid_token().as_deref(), Some("acc2"));
    }

    #[tokio::test]
    async fn test_login_page_with_refreshable_session_redirects_home() {
        let f = signed_in(TokenMode::Double).await;
        f.api
            .push_refresh(Ok(TokenInfo::double("acc2", 60, "ref2", 6000)));
        f.clock.advance_secs(61);
        let menus = Arc::new(ScriptedMenuSource::with_tree(menu_tree()));

        let outcome = guard(&f, &menus).navigate(Route::new("/login")).await;

        assert_eq!(outcome.target(), &Route::new("/"));
        assert_eq!(f.api.refresh_calls(), 1);
        assert_eq!(menus.calls(), 0);
    }

    #[tokio::test]
    async fn test_login_page_allowed_when_refresh_fails() {
        let f = signed_in(TokenMode::Double).await;
        f.api.push_refresh(Err(ApplicationError::Unauthorized {
            message: "refresh rejected".to_string(),
        }));
        f.clock.advance_secs(61);
        let menus = Arc::new(ScriptedMenuSource::with_tree(menu_tree()));

        let outcome = guard(&f, &menus).navigate(Route::new("/login")).await;

        assert_eq!(outcome, NavigationOutcome::Allowed(Route::new("/login")));
        assert_eq!(f.api.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_menu_reloaded_after_relogin() {
        let f = signed_in(TokenMode::Single).await;
        let menus = Arc::new(ScriptedMenuSource::with_tree(menu_tree()));
        let guard = guard(&f, &menus);

        assert!(guard.navigate(Route::new("/dashboard")).await.is_allowed());
        f.ctx.tokens.logout().await.unwrap();
        f.ctx
            .tokens
            .set_token_info(TokenInfo::single("tok2", 600))
            .await
            .unwrap();
        assert!(guard.navigate(Route::new("/dashboard")).await.is_allowed());

        assert_eq!(menus.calls(), 2);
    }

    struct Fixed(CheckOutcome);

    #[async_trait]
    impl GuardCheck for Fixed {
        fn stage(&self) -> GuardState {
            GuardState::CheckingLogin
        }

        async fn check(&self, _to: &Route) -> CheckOutcome {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_first_terminal_check_short_circuits() {
        let guard = SessionGuard::with_checks(vec![
            Box::new(Fixed(CheckOutcome::Continue)),
            Box::new(Fixed(CheckOutcome::Redirect(Route::new("/first")))),
            Box::new(Fixed(CheckOutcome::Redirect(Route::new("/second")))),
        ]);
        let outcome = guard.navigate(Route::new("/x")).await;
        assert_eq!(outcome.target(), &Route::new("/first"));

        let empty = SessionGuard::with_checks(Vec::new());
        assert!(empty.navigate(Route::new("/x")).await.is_allowed());
    }
}
