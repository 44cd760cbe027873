//! ADS-B Cache - receives observations over gRPC and serves a live GeoJSON view
//!
//! Contacts and stations expire after the entry TTL unless refreshed. Index
//! sets are pruned lazily by the read API.

mod aggregate;
mod config;
mod feature;
mod grpc_server;
mod http;
mod ingest;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tonic::transport::Server;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adsb_proto::ingest_server::IngestServer;
use aggregate::Aggregator;
use config::CacheConfig;
use grpc_server::IngestService;
use ingest::IngestWriter;
use store::{MemoryStore, Store, TenantCounters};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("adsb_cache=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("===========================================");
    info!("   ADS-B Cache - contacts and stations");
    info!("===========================================");

    let config = CacheConfig::load().context("Failed to load cache configuration")?;

    info!("Configuration:");
    info!("  gRPC port: {}", config.grpc_port);
    info!("  HTTP port: {}", config.http_port);
    info!("  Entry TTL: {}s", config.entry_ttl_secs);

    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let counters = Arc::new(TenantCounters::new());
    let ingest_service = IngestService::new(
        IngestWriter::new(store.clone(), config.entry_ttl()),
        counters.clone(),
    );
    let app = http::router(Arc::new(Aggregator::new(store).with_counters(counters)));

    let grpc_addr = SocketAddr::from(([0, 0, 0, 0], config.grpc_port));
    info!("Starting gRPC server on {}", grpc_addr);
    let grpc_server = Server::builder()
        .add_service(IngestServer::new(ingest_service))
        .serve(grpc_addr);

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    info!("Starting HTTP server on {}", http_addr);
    let listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("Failed to bind {}", http_addr))?;
    let http_server = axum::serve(listener, app);

    // Run both servers until either stops or Ctrl+C
    tokio::select! {
        result = grpc_server => {
            if let Err(e) = result {
                error!("gRPC server error: {}", e);
            }
        }
        result = http_server => {
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
