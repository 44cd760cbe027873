//! Station and decoded record types

/// Ground station a link reports for; fixed for the life of the link
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Opaque identifier, generated when the link is established
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Station {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Aircraft position decoded from a single frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    /// ICAO 24-bit address, six upper-case hex digits
    pub icao: String,

    /// Barometric or GNSS altitude in feet
    pub altitude_ft: i32,

    pub latitude: f64,
    pub longitude: f64,

    /// Flight callsign, if an identification squitter was seen earlier
    pub callsign: Option<String>,

    /// Mode A code (4-digit octal)
    ///
    /// Always `None` from [`ModeSDecoder`](super::ModeSDecoder): airborne
    /// position squitters carry no Mode A code.
    pub squawk: Option<String>,

    pub station: Station,
}
