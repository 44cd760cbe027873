//! Aggregator - resolves index sets against the keyed store
//!
//! Reads are the only garbage collector for the index sets: a member whose
//! entry has expired is removed from its set the first time a read finds it.
//! Pruning a station also drops its per-station counters.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::store::{Store, StoreError, TenantCounters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Contacts,
    Stations,
}

impl Category {
    /// Name of the index set holding this category's keys
    pub fn index(self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::Stations => "stations",
        }
    }
}

pub struct Aggregator {
    store: Arc<dyn Store>,
    counters: Option<Arc<TenantCounters>>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            counters: None,
        }
    }

    /// Forget a station's counters when its entry is pruned
    pub fn with_counters(mut self, counters: Arc<TenantCounters>) -> Self {
        self.counters = Some(counters);
        self
    }

    /// Live key → stored feature for one category
    pub fn list_category(&self, category: Category) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(self.live_entries(category)?.into_iter().collect())
    }

    /// Live contact features followed by live station features
    pub fn geojson(&self) -> Result<Vec<String>, StoreError> {
        let mut features = Vec::new();
        for category in [Category::Contacts, Category::Stations] {
            features.extend(
                self.live_entries(category)?
                    .into_iter()
                    .map(|(_, feature)| feature),
            );
        }
        Ok(features)
    }

    /// Index members that still have an entry, pruning the rest
    fn live_keys(&self, category: Category) -> Result<Vec<String>, StoreError> {
        let mut live = Vec::new();

        for key in self.store.set_query(category.index())? {
            if self.store.contains(&key)? {
                live.push(key);
            } else {
                self.prune(category, &key)?;
            }
        }

        Ok(live)
    }

    /// Live keys with their values, in index order
    fn live_entries(&self, category: Category) -> Result<Vec<(String, String)>, StoreError> {
        let mut entries = Vec::new();

        for key in self.live_keys(category)? {
            // The entry may expire between the existence check and the read
            match self.store.get(&key)? {
                Some(feature) => entries.push((key, feature)),
                None => self.prune(category, &key)?,
            }
        }

        Ok(entries)
    }

    fn prune(&self, category: Category, key: &str) -> Result<(), StoreError> {
        // Concurrent readers may prune the same key; set_del tolerates that
        if self.store.set_del(category.index(), key)? {
            debug!("Pruned stale {} entry {}", category.index(), key);
        }

        if let (Category::Stations, Some(counters)) = (category, &self.counters) {
            if counters.remove(key)? {
                debug!("Dropped counters for station {}", key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(600);

    fn seeded() -> (Arc<MemoryStore>, Aggregator) {
        let store = Arc::new(MemoryStore::new());
        let aggregator = Aggregator::new(store.clone());
        (store, aggregator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_prunes_expired_station() {
        let (store, aggregator) = seeded();
        store.set("S2", "{\"id\":\"S2\"}".to_string(), Some(TTL)).unwrap();
        store.set_add("stations", "S1").unwrap();
        store.set_add("stations", "S2").unwrap();

        tokio::time::advance(Duration::from_secs(300)).await;
        store.set("S1", "{\"id\":\"S1\"}".to_string(), Some(TTL)).unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;

        let stations = aggregator.list_category(Category::Stations).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations["S1"], "{\"id\":\"S1\"}");
        assert_eq!(store.set_query("stations").unwrap(), vec!["S1"]);

        // Second read has nothing left to prune
        let again = aggregator.list_category(Category::Stations).unwrap();
        assert_eq!(again, stations);
        assert_eq!(store.set_query("stations").unwrap(), vec!["S1"]);
    }

    #[test]
    fn test_index_member_without_entry_is_pruned() {
        let (store, aggregator) = seeded();
        store.set_add("contacts", "ABCD12").unwrap();

        assert!(aggregator.list_category(Category::Contacts).unwrap().is_empty());
        assert!(store.set_query("contacts").unwrap().is_empty());
    }

    #[test]
    fn test_categories_are_separate() {
        let (store, aggregator) = seeded();
        store.set("ABCD12", "contact".to_string(), Some(TTL)).unwrap();
        store.set("S1", "station".to_string(), Some(TTL)).unwrap();
        store.set_add("contacts", "ABCD12").unwrap();
        store.set_add("stations", "S1").unwrap();

        let contacts = aggregator.list_category(Category::Contacts).unwrap();
        assert_eq!(contacts.keys().collect::<Vec<_>>(), vec!["ABCD12"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_geojson_counts_live_features_only() {
        let (store, aggregator) = seeded();
        for key in ["A00001", "A00002", "A00003"] {
            store.set(key, format!("c-{}", key), Some(TTL)).unwrap();
            store.set_add("contacts", key).unwrap();
        }
        store.set("S1", "s-S1".to_string(), Some(TTL)).unwrap();
        store.set_add("stations", "S1").unwrap();

        tokio::time::advance(Duration::from_secs(400)).await;
        store.set("A00002", "c-A00002".to_string(), Some(TTL)).unwrap();
        store.set("S2", "s-S2".to_string(), Some(TTL)).unwrap();
        store.set_add("stations", "S2").unwrap();
        tokio::time::advance(Duration::from_secs(400)).await;

        let features = aggregator.geojson().unwrap();
        assert_eq!(features, vec!["c-A00002", "s-S2"]);

        let live_contacts = aggregator.list_category(Category::Contacts).unwrap().len();
        let live_stations = aggregator.list_category(Category::Stations).unwrap().len();
        assert_eq!(features.len(), live_contacts + live_stations);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pruned_station_drops_counters() {
        let store = Arc::new(MemoryStore::new());
        let counters = Arc::new(TenantCounters::new());
        let aggregator = Aggregator::new(store.clone()).with_counters(counters.clone());

        for id in ["S1", "S2"] {
            store.set(id, format!("s-{}", id), Some(TTL)).unwrap();
            store.set_add("stations", id).unwrap();
            counters.register(id).unwrap();
            counters.increment(id, "observations", 1).unwrap();
        }
        store.set("S3", "c-S3".to_string(), Some(TTL)).unwrap();
        store.set_add("contacts", "S3").unwrap();
        counters.register("S3").unwrap();

        tokio::time::advance(Duration::from_secs(300)).await;
        store.set("S2", "s-S2".to_string(), Some(TTL)).unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;

        // A pruned contact with the same key is not a station
        assert!(aggregator.list_category(Category::Contacts).unwrap().is_empty());
        assert_eq!(counters.tenants().unwrap(), 3);

        let stations = aggregator.list_category(Category::Stations).unwrap();
        assert_eq!(stations.keys().collect::<Vec<_>>(), vec!["S2"]);
        assert_eq!(counters.tenants().unwrap(), 2);
        assert!(!counters.remove("S1").unwrap());
        assert_eq!(counters.increment("S2", "observations", 1).unwrap(), 2);
    }

    #[test]
    fn test_empty_indexes() {
        let (_store, aggregator) = seeded();
        assert!(aggregator.geojson().unwrap().is_empty());
        assert!(aggregator.list_category(Category::Stations).unwrap().is_empty());
    }
}
