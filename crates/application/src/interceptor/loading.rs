//! Loading indicator scoped to one request.

use crate::ports::LoadingIndicator;

const DEFAULT_LOADING_TEXT: &str = "Loading...";

/// Shows the indicator on creation and hides it on drop, so every exit
/// path of a request (success, error, early return, cancellation) hides it.
pub struct LoadingScope<'a> {
    indicator: Option<&'a dyn LoadingIndicator>,
}

impl<'a> LoadingScope<'a> {
    /// Shows `indicator` if `enabled`.
    #[must_use]
    pub fn enter(indicator: &'a dyn LoadingIndicator, enabled: bool, text: Option<&str>) -> Self {
        if !enabled {
            return Self { indicator: None };
        }
        indicator.show(text.unwrap_or(DEFAULT_LOADING_TEXT));
        Self {
            indicator: Some(indicator),
        }
    }
}

impl Drop for LoadingScope<'_> {
    fn drop(&mut self) {
        if let Some(indicator) = self.indicator {
            indicator.hide();
        }
    }
}
