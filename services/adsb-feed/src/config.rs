//! Configuration loaded from an optional TOML file and environment variables

use serde::Deserialize;

use crate::link::LinkError;

/// Port dump1090 serves raw frames on
pub const DEFAULT_FEED_PORT: u16 = 30002;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Feeds to link, one station each
    #[serde(default)]
    pub links: Vec<LinkConfig>,

    /// Link statistics reporting interval in seconds
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,
}

fn default_stats_interval() -> u64 {
    10
}

impl FeedConfig {
    /// Load `adsb-feed.toml` (or `$ADSB_FEED_CONFIG`) overlaid with `ADSB_FEED__*`
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("ADSB_FEED_CONFIG").unwrap_or_else(|_| "adsb-feed".to_string());

        config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("ADSB_FEED").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Link establishment record, as supplied by the operator
///
/// Fields stay strings so that a missing or malformed value surfaces as a
/// configuration error when the link is established.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Endpoint of the consumer that receives this link's records
    pub consumer_id: String,
    pub station_name: String,
    pub station_latitude: String,
    pub station_longitude: String,
    pub feed_host: String,
    /// Defaults to 30002 when empty
    pub feed_port: String,
}

/// Validated form of [`LinkConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSettings {
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub feed_host: String,
    pub feed_port: u16,
}

impl LinkSettings {
    pub fn feed_addr(&self) -> String {
        format!("{}:{}", self.feed_host, self.feed_port)
    }
}

impl LinkConfig {
    pub fn validate(&self) -> Result<LinkSettings, LinkError> {
        let lat = self.station_latitude.trim();
        let lon = self.station_longitude.trim();
        let host = self.feed_host.trim();

        if lat.is_empty() || lon.is_empty() || host.is_empty() {
            return Err(LinkError::Config(
                "station_latitude, station_longitude and feed_host are required".to_string(),
            ));
        }

        let latitude = parse_coordinate("station_latitude", lat, 90.0)?;
        let longitude = parse_coordinate("station_longitude", lon, 180.0)?;

        let port = self.feed_port.trim();
        let feed_port = if port.is_empty() {
            DEFAULT_FEED_PORT
        } else {
            port.parse()
                .map_err(|e| LinkError::Config(format!("invalid feed_port {:?}: {}", port, e)))?
        };

        Ok(LinkSettings {
            station_name: self.station_name.clone(),
            latitude,
            longitude,
            feed_host: host.to_string(),
            feed_port,
        })
    }
}

fn parse_coordinate(field: &str, value: &str, limit: f64) -> Result<f64, LinkError> {
    let parsed: f64 = value
        .parse()
        .map_err(|e| LinkError::Config(format!("invalid {} {:?}: {}", field, value, e)))?;

    if !parsed.is_finite() || parsed.abs() > limit {
        return Err(LinkError::Config(format!("{} {} out of range", field, parsed)));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(lat: &str, lon: &str, host: &str, port: &str) -> LinkConfig {
        LinkConfig {
            consumer_id: "http://localhost:50051".to_string(),
            station_name: "home".to_string(),
            station_latitude: lat.to_string(),
            station_longitude: lon.to_string(),
            feed_host: host.to_string(),
            feed_port: port.to_string(),
        }
    }

    #[test]
    fn test_missing_host_is_config_error() {
        let result = link("40.0", "-75.0", "", "").validate();
        assert!(matches!(result, Err(LinkError::Config(_))));
    }

    #[test]
    fn test_missing_coordinates_are_config_errors() {
        assert!(link("", "-75.0", "localhost", "").validate().is_err());
        assert!(link("40.0", " ", "localhost", "").validate().is_err());
    }

    #[test]
    fn test_port_defaults_to_30002() {
        let settings = link("40.0", "-75.0", "localhost", "").validate().unwrap();
        assert_eq!(settings.feed_port, 30002);
        assert_eq!(settings.feed_addr(), "localhost:30002");
    }

    #[test]
    fn test_explicit_port() {
        let settings = link("40.0", "-75.0", "10.0.0.2", "31002").validate().unwrap();
        assert_eq!(settings.feed_port, 31002);
        assert_eq!(settings.latitude, 40.0);
        assert_eq!(settings.longitude, -75.0);
    }

    #[test]
    fn test_unparsable_values() {
        assert!(link("north", "-75.0", "localhost", "").validate().is_err());
        assert!(link("40.0", "-75.0", "localhost", "http").validate().is_err());
        assert!(link("91.0", "-75.0", "localhost", "").validate().is_err());
        assert!(link("40.0", "-181", "localhost", "").validate().is_err());
    }
}
