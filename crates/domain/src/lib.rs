//! Gatehouse Domain - Core session types
//!
//! This crate defines the domain model shared by every Gatehouse client:
//! token shapes, user profile, permission tree, routes and request envelopes.
//! All types here are pure Rust with no I/O dependencies.

pub mod config;
pub mod error;
pub mod login;
pub mod permission;
pub mod request;
pub mod response;
pub mod route;
pub mod token;
pub mod user;

pub use config::{ApiEndpoints, ResponseCodes, RouteConfig, SessionConfig};
pub use error::{DomainError, DomainResult};
pub use login::{Credentials, LoginGrant, LoginResponse};
pub use permission::{NodeField, PermissionNode, PermissionTree};
pub use request::{HttpMethod, RequestConfig};
pub use response::ApiResponse;
pub use route::{GuardState, NavigationOutcome, Route};
pub use token::{TokenInfo, TokenMode, expiry_after, token_preview};
pub use user::{AdminUser, UserInfo};
