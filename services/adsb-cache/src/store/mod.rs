//! Store capability - keyed entries with TTL plus named membership sets

mod counters;
mod memory;

pub use counters::TenantCounters;
pub use memory::MemoryStore;

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: lock poisoned")]
    Unavailable,

    #[error("unknown tenant {0:?}")]
    UnknownTenant(String),

    #[error("value at {0:?} is not numeric")]
    NotNumeric(String),
}

/// Fixed operation set the ingest writer and aggregator rely on
///
/// Each operation is atomic on its own; sequences of operations are not.
pub trait Store: Send + Sync {
    /// Live value at `key`, `None` if absent or expired
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value`, replacing any previous value and its expiry
    fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StoreError>;

    fn contains(&self, key: &str) -> Result<bool, StoreError>;

    /// Returns whether `member` was newly added
    fn set_add(&self, set: &str, member: &str) -> Result<bool, StoreError>;

    /// Removing an absent member is a no-op returning `false`
    fn set_del(&self, set: &str, member: &str) -> Result<bool, StoreError>;

    /// Members in lexical order; an unknown set is empty
    fn set_query(&self, set: &str) -> Result<Vec<String>, StoreError>;
}
