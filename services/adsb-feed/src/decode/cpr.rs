//! Compact Position Reporting, local decode against a reference position

/// 17-bit CPR fields are scaled by 2^17
const CPR_SCALE: f64 = 131072.0;

/// Latitude zones per hemisphere
const NZ: f64 = 15.0;

/// Number of longitude zones at `lat`
fn nl(lat: f64) -> i32 {
    let lat = lat.abs();
    if lat == 0.0 {
        return 59;
    }
    if lat == 87.0 {
        return 2;
    }
    if lat > 87.0 {
        return 1;
    }

    let a = 1.0 - (std::f64::consts::PI / (2.0 * NZ)).cos();
    let b = (std::f64::consts::PI / 180.0 * lat).cos().powi(2);
    (2.0 * std::f64::consts::PI / (1.0 - a / b).acos()).floor() as i32
}

/// Floored modulo, always in `[0, y)`
fn modulo(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

/// Resolve one even or odd CPR pair using a reference within 180 NM
///
/// Returns `None` if the result falls outside valid coordinates.
pub fn decode_local(
    lat_cpr: u32,
    lon_cpr: u32,
    odd: bool,
    ref_lat: f64,
    ref_lon: f64,
) -> Option<(f64, f64)> {
    let i = if odd { 1.0 } else { 0.0 };
    let lat_frac = lat_cpr as f64 / CPR_SCALE;
    let lon_frac = lon_cpr as f64 / CPR_SCALE;

    let d_lat = 360.0 / (4.0 * NZ - i);
    let j = (ref_lat / d_lat).floor()
        + (0.5 + modulo(ref_lat, d_lat) / d_lat - lat_frac).floor();
    let lat = d_lat * (j + lat_frac);

    let zones = (nl(lat) as f64 - i).max(1.0);
    let d_lon = 360.0 / zones;
    let m = (ref_lon / d_lon).floor()
        + (0.5 + modulo(ref_lon, d_lon) / d_lon - lon_frac).floor();
    let mut lon = d_lon * (m + lon_frac);
    if lon > 180.0 {
        lon -= 360.0;
    }

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }

    Some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nl() {
        assert_eq!(nl(0.0), 59);
        assert_eq!(nl(45.0), 42);
        assert_eq!(nl(-45.0), 42);
        assert_eq!(nl(52.2572), 36);
        assert_eq!(nl(87.0), 2);
        assert_eq!(nl(89.0), 1);
    }

    #[test]
    fn test_decode_local_even() {
        let (lat, lon) = decode_local(93000, 51372, false, 52.258, 3.918).unwrap();
        assert!((lat - 52.25720).abs() < 1e-4);
        assert!((lon - 3.91937).abs() < 1e-4);
    }

    #[test]
    fn test_decode_local_western_hemisphere() {
        // Encoded from (40.0, -75.0) with an even frame
        let lat_cpr = ((modulo(40.0, 6.0) / 6.0) * CPR_SCALE).round() as u32;
        let d_lon = 360.0 / nl(40.0) as f64;
        let lon_cpr = ((modulo(-75.0, d_lon) / d_lon) * CPR_SCALE).round() as u32;

        let (lat, lon) = decode_local(lat_cpr, lon_cpr, false, 40.1, -75.2).unwrap();
        assert!((lat - 40.0).abs() < 1e-3);
        assert!((lon + 75.0).abs() < 1e-3);
    }
}
