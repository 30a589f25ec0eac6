//! Persisted key-value state port.

use async_trait::async_trait;

/// Errors that can occur while reading or writing persisted state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The backing medium failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The stored document is corrupt.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// String key-value store holding JSON-encoded values.
///
/// Keys arrive already namespaced by the caller.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. Missing keys yield `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes a value. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Deletes several values.
    async fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}
