//! JSON helpers with deterministic output.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a value to pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// Same as `to_json_stable`, as bytes ready to write.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    to_json_stable(value).map(String::into_bytes)
}

/// Deserializes JSON from bytes. An empty or whitespace-only input is
/// treated as `null`.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match `T`.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_slice(b"null").map_err(SerializationError::Deserialize);
    }
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn test_keys_sorted_with_trailing_newline() {
        let mut map = BTreeMap::new();
        map.insert("gatehouse:token", "t");
        map.insert("gatehouse:accessTokenExpireTime", "1");

        let json = to_json_stable(&map).unwrap();
        assert_eq!(
            json,
            "{\n  \"gatehouse:accessTokenExpireTime\": \"1\",\n  \"gatehouse:token\": \"t\"\n}\n"
        );
    }

    #[test]
    fn test_empty_input_reads_as_null() {
        let map: Option<BTreeMap<String, String>> = from_json_bytes(b"  \n").unwrap();
        assert!(map.is_none());
    }

    #[test]
    fn test_invalid_json_rejected() {
        let result: Result<BTreeMap<String, String>, _> = from_json_bytes(b"{\"a\": ");
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}
