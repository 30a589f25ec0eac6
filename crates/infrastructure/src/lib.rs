//! Gatehouse Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod auth;
pub mod persistence;
pub mod serialization;
pub mod ui;

pub use adapters::{ReqwestTransport, SystemClock};
pub use auth::HttpAuthApi;
pub use persistence::{FileKeyValueStore, MemoryKeyValueStore};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
pub use ui::{HistoryNavigator, TracingLoadingIndicator, TracingNotifier};
