//! Permission tree state and queries.

mod evaluator;
mod store;

pub use evaluator::PermissionEvaluator;
pub use store::PermissionStore;
