//! Configuration loaded from an optional TOML file and environment variables

use std::time::Duration;

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Port for the gRPC ingest service
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,

    /// Port for the HTTP read API
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Lifetime of contact and station entries in seconds
    #[serde(default = "default_entry_ttl")]
    pub entry_ttl_secs: u64,
}

fn default_grpc_port() -> u16 {
    50051
}

fn default_http_port() -> u16 {
    8888
}

fn default_entry_ttl() -> u64 {
    crate::ingest::ENTRY_TTL.as_secs()
}

impl CacheConfig {
    /// Load `adsb-cache.toml` (or `$ADSB_CACHE_CONFIG`) overlaid with `ADSB_CACHE__*`
    pub fn load() -> Result<Self, config::ConfigError> {
        let path =
            std::env::var("ADSB_CACHE_CONFIG").unwrap_or_else(|_| "adsb-cache".to_string());

        config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("ADSB_CACHE").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn entry_ttl(&self) -> Duration {
        Duration::from_secs(self.entry_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: CacheConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.grpc_port, 50051);
        assert_eq!(config.http_port, 8888);
        assert_eq!(config.entry_ttl(), Duration::from_secs(600));
    }
}
