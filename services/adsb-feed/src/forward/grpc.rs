//! gRPC consumer - calls `adsb.Ingest/HandleObservation` on the cache service

use adsb_proto::ingest_client::IngestClient;
use adsb_proto::Observation;
use tonic::transport::{Channel, Endpoint};

use super::{Consumer, ForwardError};

/// Unary client for the ingest service; connects on first use
#[derive(Clone)]
pub struct GrpcConsumer {
    client: IngestClient<Channel>,
}

impl GrpcConsumer {
    pub fn new(url: &str) -> Result<Self, ForwardError> {
        let channel = Endpoint::from_shared(url.to_string())?.connect_lazy();
        Ok(Self {
            client: IngestClient::new(channel),
        })
    }
}

#[tonic::async_trait]
impl Consumer for GrpcConsumer {
    async fn deliver(&self, observation: Observation) -> Result<(), ForwardError> {
        let mut client = self.client.clone();
        let ack = client.handle_observation(observation).await?.into_inner();
        if !ack.accepted {
            return Err(ForwardError::Rejected);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_url() {
        assert!(matches!(
            GrpcConsumer::new("not a url"),
            Err(ForwardError::Endpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_consumer_is_an_error() {
        let consumer = GrpcConsumer::new("http://127.0.0.1:1").unwrap();
        let result = consumer.deliver(Observation::default()).await;
        assert!(matches!(result, Err(ForwardError::Call(_))));
    }
}
