//! Extended squitter decoder

use std::collections::{HashMap, VecDeque};

use super::cpr::decode_local;
use super::crc::{downlink_format, icao, parity_ok};
use super::{Decode, DecodeError, DecodedRecord, Station};

/// Callsign character lookup table
const CALLSIGN_CHARS: &[u8; 64] =
    b"#ABCDEFGHIJKLMNOPQRSTUVWXYZ##### ###############0123456789######";

/// Aircraft whose callsign is remembered between frames
const MAX_IDENTITIES: usize = 256;

/// Decodes DF17/18 airborne position squitters
///
/// Identification squitters are not positional, but their callsign is kept
/// per aircraft and attached to that aircraft's later positions.
pub struct ModeSDecoder {
    callsigns: HashMap<u32, String>,
    order: VecDeque<u32>,
    capacity: usize,
}

impl Default for ModeSDecoder {
    fn default() -> Self {
        Self::new(MAX_IDENTITIES)
    }
}

impl ModeSDecoder {
    pub fn new(capacity: usize) -> Self {
        Self {
            callsigns: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    fn remember(&mut self, address: u32, callsign: String) {
        if !self.callsigns.contains_key(&address) {
            if self.order.len() >= self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.callsigns.remove(&oldest);
                }
            }
            self.order.push_back(address);
        }
        self.callsigns.insert(address, callsign);
    }
}

impl Decode for ModeSDecoder {
    fn decode(&mut self, msg: &[u8], station: &Station) -> Result<DecodedRecord, DecodeError> {
        if msg.len() != 14 {
            return Err(DecodeError::Length(msg.len()));
        }

        let df = downlink_format(msg);
        if df != 17 && df != 18 {
            return Err(DecodeError::Unsupported(df));
        }

        if !parity_ok(msg) {
            return Err(DecodeError::Crc);
        }

        let address = icao(msg);
        let tc = (msg[4] >> 3) & 0x1F;

        match tc {
            1..=4 => {
                let callsign = decode_callsign(msg);
                if !callsign.is_empty() {
                    self.remember(address, callsign);
                }
                Err(DecodeError::NotPositional(tc))
            }
            9..=18 | 20..=22 => {
                let ac12 = ((msg[5] as u16) << 4) | ((msg[6] >> 4) as u16 & 0x0F);
                let altitude_ft = decode_ac12_altitude(ac12).ok_or(DecodeError::Altitude)?;

                let odd = (msg[6] >> 2) & 1 == 1;
                let lat_cpr = ((msg[6] as u32 & 0x03) << 15)
                    | ((msg[7] as u32) << 7)
                    | ((msg[8] as u32 >> 1) & 0x7F);
                let lon_cpr =
                    ((msg[8] as u32 & 0x01) << 16) | ((msg[9] as u32) << 8) | (msg[10] as u32);

                let (latitude, longitude) =
                    decode_local(lat_cpr, lon_cpr, odd, station.latitude, station.longitude)
                        .ok_or(DecodeError::Position)?;

                Ok(DecodedRecord {
                    icao: format!("{:06X}", address),
                    altitude_ft,
                    latitude,
                    longitude,
                    callsign: self.callsigns.get(&address).cloned(),
                    squawk: None,
                    station: station.clone(),
                })
            }
            _ => Err(DecodeError::NotPositional(tc)),
        }
    }
}

/// 12-bit altitude code; only the 25 ft (Q bit set) encoding is supported
fn decode_ac12_altitude(ac12: u16) -> Option<i32> {
    if (ac12 >> 4) & 1 == 0 {
        return None;
    }
    let n = ((ac12 & 0x0FE0) >> 1) | (ac12 & 0x000F);
    Some(n as i32 * 25 - 1000)
}

/// Callsign from identification type codes 1-4
fn decode_callsign(msg: &[u8]) -> String {
    let codes = [
        (msg[5] >> 2) & 0x3F,
        ((msg[5] & 0x03) << 4) | ((msg[6] >> 4) & 0x0F),
        ((msg[6] & 0x0F) << 2) | ((msg[7] >> 6) & 0x03),
        msg[7] & 0x3F,
        (msg[8] >> 2) & 0x3F,
        ((msg[8] & 0x03) << 4) | ((msg[9] >> 4) & 0x0F),
        ((msg[9] & 0x0F) << 2) | ((msg[10] >> 6) & 0x03),
        msg[10] & 0x3F,
    ];

    codes
        .iter()
        .map(|&c| CALLSIGN_CHARS[c as usize] as char)
        .filter(|&c| c != '#')
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::super::crc::seal;
    use super::*;

    fn station() -> Station {
        Station {
            id: "S1".to_string(),
            name: "test".to_string(),
            latitude: 52.258,
            longitude: 3.918,
        }
    }

    fn frame(body: &str) -> Vec<u8> {
        let mut msg = [0u8; 14];
        msg[..11].copy_from_slice(&hex::decode(body).unwrap());
        seal(&mut msg);
        msg.to_vec()
    }

    #[test]
    fn test_airborne_position() {
        let mut decoder = ModeSDecoder::default();
        let record = decoder
            .decode(&frame("8D40621D58C382D690C8AC"), &station())
            .unwrap();

        assert_eq!(record.icao, "40621D");
        assert_eq!(record.altitude_ft, 38000);
        assert!((record.latitude - 52.2572).abs() < 1e-3);
        assert!((record.longitude - 3.9194).abs() < 1e-3);
        assert_eq!(record.callsign, None);
        assert_eq!(record.station.id, "S1");
    }

    #[test]
    fn test_received_frame_decodes() {
        let mut decoder = ModeSDecoder::default();
        let msg = hex::decode("8D40621D58C382D690C8AC2863A7").unwrap();
        let record = decoder.decode(&msg, &station()).unwrap();

        assert_eq!(record.icao, "40621D");
        assert_eq!(record.altitude_ft, 38000);
        assert!((record.latitude - 52.2572).abs() < 1e-3);
        assert!((record.longitude - 3.9194).abs() < 1e-3);
        assert_eq!(record.squawk, None);
    }

    #[test]
    fn test_identification_is_not_positional() {
        let mut decoder = ModeSDecoder::default();
        let msg = hex::decode("8D4840D6202CC371C32CE0576098").unwrap();
        assert!(matches!(
            decoder.decode(&msg, &station()),
            Err(DecodeError::NotPositional(4))
        ));
        assert_eq!(decode_callsign(&msg), "KLM1023");
    }

    #[test]
    fn test_callsign_attached_to_later_position() {
        let mut decoder = ModeSDecoder::default();
        let _ = decoder.decode(&frame("8D40621D202CC371C32CE0"), &station());

        let record = decoder
            .decode(&frame("8D40621D58C382D690C8AC"), &station())
            .unwrap();
        assert_eq!(record.callsign.as_deref(), Some("KLM1023"));
    }

    #[test]
    fn test_identity_table_evicts_oldest() {
        let mut decoder = ModeSDecoder::new(1);
        decoder.remember(1, "ONE".to_string());
        decoder.remember(2, "TWO".to_string());
        assert!(!decoder.callsigns.contains_key(&1));
        assert_eq!(decoder.callsigns.get(&2).map(String::as_str), Some("TWO"));
    }

    #[test]
    fn test_rejects_bad_frames() {
        let mut decoder = ModeSDecoder::default();

        assert!(matches!(
            decoder.decode(&[0x02, 0xE1, 0x97, 0xB2, 0xF3, 0xF9, 0xA1], &station()),
            Err(DecodeError::Length(7))
        ));

        let mut corrupt = frame("8D40621D58C382D690C8AC");
        corrupt[8] ^= 0x01;
        assert!(matches!(decoder.decode(&corrupt, &station()), Err(DecodeError::Crc)));

        let surveillance = frame("A0001838CA3E51F0A80000");
        assert!(matches!(
            decoder.decode(&surveillance, &station()),
            Err(DecodeError::Unsupported(20))
        ));
    }
}
