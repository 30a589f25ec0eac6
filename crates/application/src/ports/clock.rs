//! Clock port for expiry bookkeeping

use chrono::{DateTime, Utc};

/// Port for reading wall-clock time.
///
/// Expiry checks call `now` at the moment of the read; nothing caches it.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
