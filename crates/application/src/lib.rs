//! Gatehouse Application - Session core and ports
//!
//! This crate defines the client-side session layer with:
//! - Port traits (clock, storage, transport, auth endpoints, UI surface)
//! - Token and user stores with persisted expiry
//! - The route guard pipeline and the request interceptor
//! - Permission checks over the loaded menu tree

pub mod auth;
pub mod error;
pub mod guard;
pub mod interceptor;
pub mod permission;
pub mod ports;
pub mod session;

#[cfg(test)]
mod testing;

pub use auth::{TokenStatus, TokenStore, UserStore, is_structurally_valid};
pub use error::{ApplicationError, ApplicationResult};
pub use guard::{CheckOutcome, GuardCheck, SessionGuard};
pub use interceptor::{LoadingScope, RequestInterceptor, classify_response, status_error};
pub use permission::{PermissionEvaluator, PermissionStore};
pub use ports::{
    AuthApi, Clock, HttpTransport, KeyValueStore, LoadingIndicator, MenuSource, Navigator,
    NoticeLevel, Notifier, OutboundRequest, RawResponse, StorageError, TransportError,
};
pub use session::{AuthorizedClient, RemoteMenuSource, SessionContext, SessionService};
