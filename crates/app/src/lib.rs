//! Gatehouse - command line session client
//!
//! Loads layered configuration and wires the session core to the file
//! store and the reqwest transport.

pub mod config;
pub mod runtime;

pub use config::AppConfig;
pub use runtime::Gatehouse;
