//! Outbound request description.

mod config;
mod method;

pub use config::RequestConfig;
pub use method::HttpMethod;
