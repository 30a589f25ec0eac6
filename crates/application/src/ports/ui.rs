//! UI surface ports: toasts, navigation and loading indicators.

use gatehouse_domain::Route;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something the user should act on.
    Warning,
    /// A failed operation.
    Error,
}

/// Global toast / notification sink.
pub trait Notifier: Send + Sync {
    /// Shows a message to the user.
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Router handle used for forced redirects outside the guard.
pub trait Navigator: Send + Sync {
    /// Replaces the current location.
    fn redirect(&self, to: &Route);
}

/// Spinner shown for the lifetime of a request.
pub trait LoadingIndicator: Send + Sync {
    /// Shows the indicator.
    fn show(&self, message: &str);

    /// Hides the indicator.
    fn hide(&self);
}
