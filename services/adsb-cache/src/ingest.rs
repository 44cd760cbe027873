//! Ingest writer - turns one observation into cache writes

use std::sync::Arc;
use std::time::Duration;

use adsb_proto::{Observation, StationInfo};
use tracing::debug;

use crate::aggregate::Category;
use crate::feature::{contact_feature, station_feature};
use crate::store::{Store, StoreError};

/// Default lifetime of contact and station entries
pub const ENTRY_TTL: Duration = Duration::from_secs(600);

pub struct IngestWriter {
    store: Arc<dyn Store>,
    ttl: Duration,
}

impl IngestWriter {
    pub fn new(store: Arc<dyn Store>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Write the contact and station entries, then index both keys
    ///
    /// The first failing write aborts the rest. Nothing is rolled back; the
    /// next observation rewrites every key.
    pub fn on_record(
        &self,
        observation: &Observation,
        station: &StationInfo,
    ) -> Result<(), StoreError> {
        let contact_key = observation.icao.as_str();
        let station_key = station.id.as_str();

        self.store
            .set(contact_key, contact_feature(observation), Some(self.ttl))?;
        self.store
            .set(station_key, station_feature(station), Some(self.ttl))?;
        self.store.set_add(Category::Contacts.index(), contact_key)?;
        self.store.set_add(Category::Stations.index(), station_key)?;

        debug!(
            "Cached {} at ({:.4}, {:.4}) alt={} ft via {}",
            contact_key, observation.latitude, observation.longitude, observation.altitude_ft, station.name
        );
        Ok(())
    }
}
