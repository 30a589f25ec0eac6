//! Deterministic JSON for the session file.
//!
//! The file is rewritten on every change, so output is kept stable:
//! - keys sorted (the store is a `BTreeMap`)
//! - 2-space indentation
//! - trailing newline

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
