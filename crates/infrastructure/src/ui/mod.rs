//! Headless UI surface.
//!
//! A terminal client has no toasts, router or spinner, so notices and
//! spinners go to the log and redirects are recorded for the caller to act
//! on.

use std::sync::atomic::{AtomicUsize, Ordering};

use gatehouse_application::ports::{LoadingIndicator, Navigator, NoticeLevel, Notifier};
use gatehouse_domain::Route;
use parking_lot::Mutex;

/// Writes notices to the log at a matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info => tracing::info!(target: "gatehouse::notice", "{message}"),
            NoticeLevel::Warning => tracing::warn!(target: "gatehouse::notice", "{message}"),
            NoticeLevel::Error => tracing::error!(target: "gatehouse::notice", "{message}"),
        }
    }
}

/// Records forced redirects in order.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl HistoryNavigator {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent redirect target.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.history.lock().last().cloned()
    }

    /// Every redirect so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history.lock().clone()
    }
}

impl Navigator for HistoryNavigator {
    fn redirect(&self, to: &Route) {
        tracing::info!(to = %to, "Redirecting");
        self.history.lock().push(to.clone());
    }
}

/// Logs show/hide and tracks how many requests hold the indicator.
#[derive(Debug, Default)]
pub struct TracingLoadingIndicator {
    active: AtomicUsize,
}

impl TracingLoadingIndicator {
    /// Creates a hidden indicator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while at least one request shows the indicator.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.active.load(Ordering::Acquire) > 0
    }
}

impl LoadingIndicator for TracingLoadingIndicator {
    fn show(&self, message: &str) {
        let active = self.active.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(active, "{message}");
    }

    fn hide(&self) {
        let previous = self
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .unwrap_or(0);
        tracing::trace!(active = previous.saturating_sub(1), "Loading hidden");
    }
}
