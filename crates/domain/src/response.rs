//! Response envelope returned by every API endpoint.

use serde::{Deserialize, Serialize};

/// `{ code, message, data, timestamp }` wrapper around a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Business status code.
    pub code: i64,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Payload; `null` for calls without a result.
    pub data: Option<T>,
    /// Server time in milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

impl<T> ApiResponse<T> {
    /// Wraps a payload with the given code.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
            timestamp: 0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_envelope_with_null_data() {
        let response: ApiResponse<Value> =
            serde_json::from_str(r#"{"code":401,"message":"expired","data":null,"timestamp":1}"#)
                .unwrap();
        assert_eq!(response.code, 401);
        assert_eq!(response.message, "expired");
        assert!(response.data.is_none());
    }

    #[test]
    fn test_envelope_missing_optional_fields() {
        let response: ApiResponse<u32> = serde_json::from_str(r#"{"code":200,"data":7}"#).unwrap();
        assert_eq!(response.data, Some(7));
        assert!(response.message.is_empty());
    }
}
