//! In-memory store with lazily evicted entries

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;
use std::time::Duration;

use tokio::time::Instant;

use super::{Store, StoreError};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    sets: HashMap<String, BTreeSet<String>>,
}

/// Process-local [`Store`]
///
/// Expired entries behave as absent and are removed the next time they are
/// looked up; there is no background sweep.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        {
            let inner = self.inner.read().map_err(|_| StoreError::Unavailable)?;
            match inner.entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut inner = self.inner.write().map_err(|_| StoreError::Unavailable)?;
        if inner.entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            inner.entries.remove(key);
        }
        Ok(None)
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.lookup(key)
    }

    fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StoreError> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        let mut inner = self.inner.write().map_err(|_| StoreError::Unavailable)?;
        inner
            .entries
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.lookup(key)?.is_some())
    }

    fn set_add(&self, set: &str, member: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Unavailable)?;
        Ok(inner
            .sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    fn set_del(&self, set: &str, member: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Unavailable)?;
        Ok(inner
            .sets
            .get_mut(set)
            .is_some_and(|members| members.remove(member)))
    }

    fn set_query(&self, set: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Unavailable)?;
        Ok(inner
            .sets
            .get(set)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }
}
