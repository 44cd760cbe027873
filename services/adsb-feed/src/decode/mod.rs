//! Decode capability - raw Mode S bytes to positional records
//!
//! The link layer only sees the [`Decode`] trait. [`ModeSDecoder`] is the
//! implementation the binary ships with.

mod cpr;
mod crc;
mod modes;
mod types;

pub use modes::ModeSDecoder;
pub use types::{DecodedRecord, Station};

use thiserror::Error;

/// Why a frame did not yield a positional record
///
/// These are expected on a live feed (noise, surveillance replies,
/// identification and velocity squitters) and never stop a link.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("frame is {0} bytes, expected 14")]
    Length(usize),

    #[error("CRC check failed")]
    Crc,

    #[error("unsupported downlink format {0}")]
    Unsupported(u8),

    #[error("type code {0} carries no position")]
    NotPositional(u8),

    #[error("altitude not available")]
    Altitude,

    #[error("local CPR decode out of range")]
    Position,
}

/// Turns one frame into a record positioned relative to the observing station
pub trait Decode: Send {
    fn decode(&mut self, frame: &[u8], station: &Station) -> Result<DecodedRecord, DecodeError>;
}
