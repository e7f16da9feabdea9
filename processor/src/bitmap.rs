use base64::Engine;
use log::{debug, error};

use crate::{
    constants::{MAX_PAINTED_MAP_CELLS, PAINTED_MAP_ENGINE},
    errors::PaintedMapError,
};

/// Row-major grid of painted flags, `cells[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintedMap {
    width: usize,
    height: usize,
    cells: Vec<Vec<bool>>,
}

impl PaintedMap {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.cells
    }

    /// Returns `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        self.cells.get(y)?.get(x).copied()
    }

    pub fn painted_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|painted| **painted).count())
            .sum()
    }
}

/// Unpacks a base64 bitmap of `width * height` bits, least significant bit
/// first within each byte.
///
/// An empty payload or a non-positive side means there is no map. A payload
/// that fails to decode, or a map larger than [`MAX_PAINTED_MAP_CELLS`], is
/// logged and treated the same way. Bits past the end of a short payload read
/// as unpainted.
pub fn decode(encoded: &str, width: i64, height: i64) -> Option<PaintedMap> {
    if encoded.is_empty() || width <= 0 || height <= 0 {
        return None;
    }

    match unpack(encoded, width, height) {
        Ok(map) => Some(map),
        Err(err) => {
            error!("Could not unpack painted map: {}", err);
            None
        }
    }
}

fn unpack(encoded: &str, width: i64, height: i64) -> Result<PaintedMap, PaintedMapError> {
    let too_large = PaintedMapError::TooLarge { width, height };
    let (Ok(cols), Ok(rows)) = (usize::try_from(width), usize::try_from(height)) else {
        return Err(too_large);
    };
    let cells = match cols.checked_mul(rows) {
        Some(cells) if cells <= MAX_PAINTED_MAP_CELLS => cells,
        _ => return Err(too_large),
    };

    let cleaned: String = encoded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();
    let bytes = PAINTED_MAP_ENGINE.decode(cleaned)?;

    let needed = cells.div_ceil(8);
    if bytes.len() < needed {
        debug!(
            "Painted map payload is {} bytes, {} needed; padding with unpainted cells",
            bytes.len(),
            needed
        );
    }

    let mut grid = vec![vec![false; cols]; rows];
    let mut bit_index = 0usize;

    for row in grid.iter_mut() {
        for cell in row.iter_mut() {
            if let Some(byte) = bytes.get(bit_index >> 3) {
                *cell = (byte >> (bit_index & 7)) & 1 == 1;
            }

            bit_index += 1;
        }
    }

    Ok(PaintedMap {
        width: cols,
        height: rows,
        cells: grid,
    })
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::STANDARD, Engine};

    use super::*;

    fn encode(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn no_map_for_empty_input() {
        assert_eq!(decode("", 4, 4), None);
        assert_eq!(decode(&encode(&[0xff]), 0, 4), None);
        assert_eq!(decode(&encode(&[0xff]), 4, 0), None);
        assert_eq!(decode(&encode(&[0xff]), -2, 4), None);
    }

    #[test]
    fn grid_shape_matches_dimensions() {
        let map = decode(&encode(&[0u8; 8]), 5, 3).unwrap();

        assert_eq!(map.width(), 5);
        assert_eq!(map.height(), 3);
        assert_eq!(map.rows().len(), 3);
        assert!(map.rows().iter().all(|row| row.len() == 5));
    }

    #[test]
    fn bits_are_least_significant_first() {
        // 0b0000_0101 -> bits 0 and 2 set, 0b1000_0000 -> bit 15 set
        let map = decode(&encode(&[0b0000_0101, 0b1000_0000]), 4, 4).unwrap();

        let expected = vec![
            vec![true, false, true, false],
            vec![false, false, false, false],
            vec![false, false, false, false],
            vec![false, false, false, true],
        ];
        assert_eq!(map.rows(), expected.as_slice());
        assert_eq!(map.painted_count(), 3);
    }

    #[test]
    fn rows_wrap_across_bytes() {
        // width 3: bit 3 is (0, 1), bit 8 is (2, 2)
        let map = decode(&encode(&[0b0000_1000, 0b0000_0001]), 3, 3).unwrap();

        assert_eq!(map.get(0, 1), Some(true));
        assert_eq!(map.get(2, 2), Some(true));
        assert_eq!(map.painted_count(), 2);
    }

    #[test]
    fn short_payload_pads_with_unpainted() {
        let map = decode(&encode(&[0xff]), 4, 4).unwrap();

        for (y, row) in map.rows().iter().enumerate() {
            for (x, painted) in row.iter().enumerate() {
                assert_eq!(*painted, y < 2, "cell ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn invalid_base64_is_no_map() {
        env_logger::try_init().ok();

        assert_eq!(decode("!!not base64!!", 4, 4), None);
    }

    #[test]
    fn requires_padding() {
        assert_eq!(decode("/w", 8, 1), None);
        assert_eq!(decode("/w=", 8, 1), None);
    }

    #[test]
    fn drops_characters_outside_alphabet() {
        let map = decode("/w==\n", 8, 1).unwrap();
        assert_eq!(map.painted_count(), 8);

        let map = decode("/*w ==", 8, 1).unwrap();
        assert_eq!(map.painted_count(), 8);
    }

    #[test]
    fn oversized_map_is_no_map() {
        env_logger::try_init().ok();

        assert_eq!(decode("/w==", 1 << 33, 1 << 33), None);
        assert_eq!(decode("/w==", i64::MAX, i64::MAX), None);
        assert_eq!(decode("/w==", 1 << 14, 1 << 14), None);
    }

    #[test]
    fn largest_allowed_map_decodes() {
        let map = decode("/w==", 1 << 13, 1 << 13).unwrap();

        assert_eq!(map.width(), 1 << 13);
        assert_eq!(map.painted_count(), 8);
    }

    #[test]
    fn get_outside_grid() {
        let map = decode(&encode(&[0xff]), 2, 2).unwrap();
        assert_eq!(map.get(2, 0), None);
        assert_eq!(map.get(0, 2), None);
    }
}
