//! Player position and its derived encodings.

use crate::core::cell::CellId;
use serde::{Deserialize, Serialize};

/// Player position: degrees, degrees, meters.
///
/// Replaced wholesale when the player moves; never patched field by field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub accuracy: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64, accuracy: f64) -> Self {
        Self { lat, lon, accuracy }
    }

    /// Canonical 24-byte encoding hashed into the signature:
    /// big-endian IEEE-754 latitude, longitude, accuracy.
    pub fn to_bytes(&self) -> [u8; 24] {
        let mut out = [0u8; 24];
        out[0..8].copy_from_slice(&self.lat.to_be_bytes());
        out[8..16].copy_from_slice(&self.lon.to_be_bytes());
        out[16..24].copy_from_slice(&self.accuracy.to_be_bytes());
        out
    }

    /// Cells around the position: the `level` cell containing it plus `radius`
    /// neighbours on each side along the curve, ascending.
    pub fn cell_ids(&self, level: u8, radius: usize) -> Vec<u64> {
        let origin = CellId::from_degrees(self.lat, self.lon).parent(level);
        let mut cells = Vec::with_capacity(2 * radius + 1);
        cells.push(origin.0);

        let (mut prev, mut next) = (origin, origin);
        for _ in 0..radius {
            prev = prev.prev();
            next = next.next();
            cells.push(prev.0);
            cells.push(next.0);
        }

        cells.sort_unstable();
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_layout() {
        let loc = Location::new(1.5, -2.25, 10.0);
        let bytes = loc.to_bytes();
        assert_eq!(&bytes[0..8], &1.5f64.to_be_bytes());
        assert_eq!(&bytes[8..16], &(-2.25f64).to_be_bytes());
        assert_eq!(&bytes[16..24], &10.0f64.to_be_bytes());
    }

    #[test]
    fn test_bytes_are_stable() {
        let loc = Location::new(37.7749, -122.4194, 5.0);
        assert_eq!(loc.to_bytes(), loc.to_bytes());
        assert_ne!(loc.to_bytes(), Location::new(37.7749, -122.4194, 6.0).to_bytes());
    }

    #[test]
    fn test_cell_cover_is_sorted_and_centred() {
        let loc = Location::new(48.8566, 2.3522, 3.0);
        let cells = loc.cell_ids(15, 10);
        assert_eq!(cells.len(), 21);
        assert!(cells.windows(2).all(|w| w[0] < w[1]));

        let origin = CellId::from_degrees(loc.lat, loc.lon).parent(15).0;
        assert_eq!(cells[10], origin);
        assert!(cells.iter().all(|c| CellId(*c).level() == 15));
    }

    #[test]
    fn test_zero_radius_is_origin_only() {
        let loc = Location::new(-33.8688, 151.2093, 1.0);
        assert_eq!(loc.cell_ids(15, 0).len(), 1);
    }
}
