//! Per-call request configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::HttpMethod;

/// One outbound API call. Ephemeral: built, sent, dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    /// Path relative to the API base URL, or an absolute URL.
    pub url: String,
    /// HTTP verb.
    #[serde(default)]
    pub method: HttpMethod,
    /// JSON body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Query parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    /// Extra headers; these win over defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Show a loading indicator for the lifetime of the call.
    #[serde(default)]
    pub show_loading: bool,
    /// Text shown with the loading indicator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_text: Option<String>,
    /// Skip global toasts and forced redirects; the caller reports errors.
    #[serde(default)]
    pub skip_error_handler: bool,
}

impl RequestConfig {
    /// Creates a request with the given method and URL.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            ..Self::default()
        }
    }

    /// GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// POST request with a JSON body.
    #[must_use]
    pub fn post(url: impl Into<String>, data: Value) -> Self {
        Self::new(HttpMethod::Post, url).with_data(data)
    }

    /// PUT request with a JSON body.
    #[must_use]
    pub fn put(url: impl Into<String>, data: Value) -> Self {
        Self::new(HttpMethod::Put, url).with_data(data)
    }

    /// DELETE request.
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Shows a loading indicator while the call runs.
    #[must_use]
    pub fn with_loading(mut self, text: impl Into<String>) -> Self {
        self.show_loading = true;
        self.loading_text = Some(text.into());
        self
    }

    /// Suppresses global error side effects for this call.
    #[must_use]
    pub const fn skip_error_handler(mut self) -> Self {
        self.skip_error_handler = true;
        self
    }

    /// Returns true if the caller sets its own header `name` (case-insensitive).
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|key| key.eq_ignore_ascii_case(name))
    }
}
