//! CRC-24 parity for 112-bit extended squitters

/// Mode S generator polynomial (0x1FFF409)
const CRC24_POLY: u32 = 0x1FFF409;

/// Remainder of the polynomial division over `msg`
pub fn crc24(msg: &[u8]) -> u32 {
    let mut crc: u32 = 0;

    for &byte in msg {
        crc ^= (byte as u32) << 16;
        for _ in 0..8 {
            if crc & 0x800000 != 0 {
                crc = (crc << 1) ^ CRC24_POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc & 0xFFFFFF
}

/// DF17/18 parity covers the whole frame, so a clean frame leaves no remainder
pub fn parity_ok(msg: &[u8]) -> bool {
    crc24(msg) == 0
}

pub fn downlink_format(msg: &[u8]) -> u8 {
    (msg[0] >> 3) & 0x1F
}

pub fn icao(msg: &[u8]) -> u32 {
    ((msg[1] as u32) << 16) | ((msg[2] as u32) << 8) | (msg[3] as u32)
}

/// Overwrites the last three bytes with the parity of the first eleven
#[cfg(test)]
pub fn seal(msg: &mut [u8; 14]) {
    let parity = crc24(&msg[..11]);
    msg[11] = (parity >> 16) as u8;
    msg[12] = (parity >> 8) as u8;
    msg[13] = parity as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_frame_has_zero_remainder() {
        let msg = hex::decode("8D4840D6202CC371C32CE0576098").unwrap();
        assert!(parity_ok(&msg));
        assert_eq!(downlink_format(&msg), 17);
        assert_eq!(icao(&msg), 0x4840D6);
    }

    #[test]
    fn test_flipped_bit_fails_parity() {
        let mut msg = hex::decode("8D4840D6202CC371C32CE0576098").unwrap();
        msg[6] ^= 0x10;
        assert!(!parity_ok(&msg));
    }

    #[test]
    fn test_seal_produces_valid_frame() {
        let mut msg = [0u8; 14];
        msg[..11].copy_from_slice(&hex::decode("8DABCD1258C382D690C8AC").unwrap());
        seal(&mut msg);
        assert!(parity_ok(&msg));
    }

    #[test]
    fn test_seal_matches_broadcast_parity() {
        let received = hex::decode("8D40621D58C382D690C8AC2863A7").unwrap();
        assert_eq!(crc24(&received[..11]), 0x2863A7);

        let mut msg = [0u8; 14];
        msg[..11].copy_from_slice(&received[..11]);
        seal(&mut msg);
        assert_eq!(msg.to_vec(), received);
    }
}
