//! Session credential state.
//!
//! This module provides:
//! - `TokenStore`: the single- or dual-token pair with persisted expiry
//! - `UserStore`: the signed-in user's profile
//! - structural validation of bearer tokens

mod token_check;
mod token_store;
mod user_store;

pub use token_check::is_structurally_valid;
pub use token_store::{TokenStatus, TokenStore};
pub use user_store::UserStore;
