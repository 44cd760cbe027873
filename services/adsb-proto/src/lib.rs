//! Wire contract shared by `adsb-feed` and `adsb-cache`
//!
//! Messages are declared by hand with `prost` derives and the client/server
//! stubs for the single `adsb.Ingest/HandleObservation` operation are
//! generated in `build.rs`.

/// Ground station that observed a record
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StationInfo {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(double, tag = "3")]
    pub latitude: f64,
    #[prost(double, tag = "4")]
    pub longitude: f64,
}

/// One decoded aircraft position, tagged with its station
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Observation {
    /// ICAO address as six upper-case hex digits
    #[prost(string, tag = "1")]
    pub icao: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub altitude_ft: i32,
    #[prost(double, tag = "3")]
    pub latitude: f64,
    #[prost(double, tag = "4")]
    pub longitude: f64,
    #[prost(string, optional, tag = "5")]
    pub callsign: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "6")]
    pub squawk: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, optional, tag = "7")]
    pub station: ::core::option::Option<StationInfo>,
    #[prost(uint64, tag = "8")]
    pub timestamp_ms: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IngestAck {
    #[prost(bool, tag = "1")]
    pub accepted: bool,
    /// Observations recorded so far for the sending station
    #[prost(int64, tag = "2")]
    pub observations: i64,
}

include!(concat!(env!("OUT_DIR"), "/adsb.Ingest.rs"));
