//! gRPC server implementation - receives observations from feed links

use std::sync::Arc;

use adsb_proto::ingest_server::Ingest;
use adsb_proto::{IngestAck, Observation, StationInfo};
use tonic::{Request, Response, Status};
use tracing::{info, warn};

use crate::ingest::IngestWriter;
use crate::store::{StoreError, TenantCounters};

/// Counter key for observations received per station
const OBSERVATIONS: &str = "observations";

/// Ingest service: caches each observation and counts it against its station
pub struct IngestService {
    writer: IngestWriter,
    counters: Arc<TenantCounters>,
}

impl IngestService {
    pub fn new(writer: IngestWriter, counters: Arc<TenantCounters>) -> Self {
        Self { writer, counters }
    }

    fn count(&self, station: &StationInfo) -> Result<i64, StoreError> {
        if self.counters.register(&station.id)? {
            info!(
                "New station {} ({}) at ({}, {})",
                station.name, station.id, station.latitude, station.longitude
            );
            self.counters
                .set_text(&station.id, "name", station.name.clone())?;
        }

        let count = self.counters.increment(&station.id, OBSERVATIONS, 1)?;
        if count % 100 == 0 {
            info!("Station {}: {} observations", station.name, count);
        }
        Ok(count)
    }
}

#[tonic::async_trait]
impl Ingest for IngestService {
    async fn handle_observation(
        &self,
        request: Request<Observation>,
    ) -> Result<Response<IngestAck>, Status> {
        let observation = request.into_inner();
        let station = observation
            .station
            .as_ref()
            .ok_or_else(|| Status::invalid_argument("observation carries no station"))?;
        if observation.icao.is_empty() {
            return Err(Status::invalid_argument("observation carries no icao address"));
        }
        if station.id.is_empty() {
            return Err(Status::invalid_argument("station carries no id"));
        }

        if let Err(e) = self.writer.on_record(&observation, station) {
            warn!("Failed to cache {}: {}", observation.icao, e);
            return Err(Status::unavailable(e.to_string()));
        }

        let observations = self.count(station).map_err(|e| {
            warn!("Failed to count observation for {}: {}", station.id, e);
            Status::unavailable(e.to_string())
        })?;

        Ok(Response::new(IngestAck {
            accepted: true,
            observations,
        }))
    }
}
