//! GeoJSON features stored as pre-rendered strings

use adsb_proto::{Observation, StationInfo};
use serde_json::json;

/// Point feature for an aircraft contact
pub fn contact_feature(observation: &Observation) -> String {
    json!({
        "type": "Feature",
        "properties": {
            "type": "contact",
            "icao": observation.icao,
            "altitude": observation.altitude_ft,
            "callsign": observation.callsign.as_deref().unwrap_or_default(),
            "squawk": observation.squawk.as_deref().unwrap_or_default(),
        },
        "geometry": {
            "type": "Point",
            "coordinates": [observation.longitude, observation.latitude],
        },
    })
    .to_string()
}

/// Point feature for an observing ground station
pub fn station_feature(station: &StationInfo) -> String {
    json!({
        "type": "Feature",
        "properties": {
            "type": "station",
            "id": station.id,
            "name": station.name,
        },
        "geometry": {
            "type": "Point",
            "coordinates": [station.longitude, station.latitude],
        },
    })
    .to_string()
}
