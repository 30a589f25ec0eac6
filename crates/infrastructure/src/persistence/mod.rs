//! Persistence adapters.
//!
//! Implementations of the `KeyValueStore` port:
//! - `FileKeyValueStore`: one JSON file on disk
//! - `MemoryKeyValueStore`: process memory, for tests and ephemeral sessions

mod file_store;
mod memory_store;

pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
