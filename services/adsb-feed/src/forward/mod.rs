//! Record forwarding to the consumer named by a link

mod grpc;

pub use grpc::GrpcConsumer;

use adsb_proto::{Observation, StationInfo};
use thiserror::Error;
use tracing::{debug, warn};

use crate::decode::DecodedRecord;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid consumer endpoint: {0}")]
    Endpoint(#[from] tonic::transport::Error),

    #[error("consumer call failed: {0}")]
    Call(#[from] tonic::Status),

    #[error("consumer rejected the observation")]
    Rejected,
}

/// Destination for decoded observations
#[tonic::async_trait]
pub trait Consumer: Send + Sync {
    async fn deliver(&self, observation: Observation) -> Result<(), ForwardError>;
}

/// Packages records and performs one outbound call per record
///
/// No retry and no buffering: a failed record is logged and dropped, the
/// next observation of the same aircraft supersedes it.
pub struct RecordForwarder<C> {
    consumer: C,
}

impl<C: Consumer> RecordForwarder<C> {
    pub fn new(consumer: C) -> Self {
        Self { consumer }
    }

    /// Returns whether the consumer accepted the record
    pub async fn forward(&self, record: &DecodedRecord) -> bool {
        match self.consumer.deliver(envelope(record)).await {
            Ok(()) => {
                debug!(
                    "Forwarded {} at ({:.4}, {:.4}) alt={} ft",
                    record.icao, record.latitude, record.longitude, record.altitude_ft
                );
                true
            }
            Err(e) => {
                warn!("Failed to forward {}: {}", record.icao, e);
                false
            }
        }
    }
}

fn envelope(record: &DecodedRecord) -> Observation {
    Observation {
        icao: record.icao.clone(),
        altitude_ft: record.altitude_ft,
        latitude: record.latitude,
        longitude: record.longitude,
        callsign: record.callsign.clone(),
        squawk: record.squawk.clone(),
        station: Some(StationInfo {
            id: record.station.id.clone(),
            name: record.station.name.clone(),
            latitude: record.station.latitude,
            longitude: record.station.longitude,
        }),
        timestamp_ms: chrono::Utc::now().timestamp_millis() as u64,
    }
}
