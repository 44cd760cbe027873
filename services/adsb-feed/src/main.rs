//! ADS-B Feed - dump1090 raw-frame links
//!
//! Connects to one or more dump1090 raw output ports, decodes airborne
//! positions relative to each link's station and forwards them to the
//! observation cache over gRPC.

mod config;
mod decode;
mod forward;
mod link;

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::FeedConfig;
use decode::ModeSDecoder;
use forward::GrpcConsumer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("adsb_feed=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!("===========================================");
    info!("   ADS-B Feed - dump1090 links");
    info!("===========================================");

    let config = FeedConfig::load().context("Failed to load feed configuration")?;

    info!("Configuration:");
    info!("  Links: {}", config.links.len());
    info!("  Stats interval: {}s", config.stats_interval_secs);

    let mut links = Vec::with_capacity(config.links.len());
    for link_config in &config.links {
        let consumer = match GrpcConsumer::new(&link_config.consumer_id) {
            Ok(consumer) => consumer,
            Err(e) => {
                error!(
                    "Skipping station {}: consumer {:?}: {}",
                    link_config.station_name, link_config.consumer_id, e
                );
                continue;
            }
        };

        match link::establish(link_config, ModeSDecoder::default(), consumer).await {
            Ok(handle) => links.push(handle),
            Err(e) => error!("Failed to establish link for station {}: {}", link_config.station_name, e),
        }
    }

    if links.is_empty() {
        anyhow::bail!("No feed links established");
    }

    info!("{} link(s) streaming. Press Ctrl+C to stop.", links.len());

    let mut report = tokio::time::interval(Duration::from_secs(config.stats_interval_secs.max(1)));
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for shutdown signal")?;
                break;
            }
            _ = report.tick() => {
                for handle in &links {
                    info!("[{}] {} | {}", handle.station().name, handle.state(), handle.stats());
                }
                if links.iter().all(|handle| handle.state().is_terminal()) {
                    error!("All feed links have failed");
                    break;
                }
            }
        }
    }

    for handle in links {
        handle.teardown().await;
    }

    info!("Shutdown complete");
    Ok(())
}
