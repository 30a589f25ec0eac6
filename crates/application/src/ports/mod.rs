//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and the outside
//! world: wall clock, persisted key-value state, the HTTP transport, the auth
//! and menu endpoints, and the UI surface (toasts, navigation, spinners).
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod auth_api;
mod clock;
mod menu_source;
mod storage;
mod transport;
mod ui;

pub use auth_api::AuthApi;
pub use clock::Clock;
pub use menu_source::MenuSource;
pub use storage::{KeyValueStore, StorageError};
pub use transport::{HttpTransport, OutboundRequest, RawResponse, TransportError};
pub use ui::{LoadingIndicator, Navigator, NoticeLevel, Notifier};
