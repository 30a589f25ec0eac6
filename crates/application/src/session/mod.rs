//! Session wiring and the flows built on top of the stores.

mod client;
mod context;
mod menu;
mod service;

pub use client::AuthorizedClient;
pub use context::SessionContext;
pub use menu::RemoteMenuSource;
pub use service::SessionService;
