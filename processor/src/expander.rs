use std::collections::HashMap;

use log::{debug, warn};
use serde_json::Value;
use structures::{Area, Color, CompressedPixel, ExpandedPixel};

use crate::{constants::TILE_SIZE, errors::PixelError};

/// Color id that always means "transparent", whatever the palette says.
pub const TRANSPARENT_COLOR_ID: i64 = 0;

/// Palette keyed by color id. Entries without an id are dropped and later
/// entries replace earlier ones with the same id.
pub fn palette_lookup(colors: &[Value]) -> HashMap<i64, Color> {
    let mut lookup = HashMap::new();

    for entry in colors {
        let color: Color = match serde_json::from_value(entry.clone()) {
            Ok(color) => color,
            Err(err) => {
                warn!("Skipping palette entry {}: {}", entry, err);
                continue;
            }
        };

        if let Some(id) = color.id {
            lookup.insert(id, color);
        }
    }

    lookup
}

/// Splits a global coordinate into `(tile, local)`.
///
/// The tile index is floored, so negative coordinates land in negative tiles
/// and the local offset stays in `0..TILE_SIZE`.
pub fn tile_coords(coord: i64) -> (i64, i64) {
    (coord.div_euclid(TILE_SIZE), coord.rem_euclid(TILE_SIZE))
}

/// Expands v1.2 compact pixels into worker pixels. A pixel that cannot be read
/// is logged and skipped; order is preserved and nothing is deduplicated.
pub fn expand_pixels(pixels: &[Value], colors: &[Value], area: &Area) -> Vec<ExpandedPixel> {
    let palette = palette_lookup(colors);
    debug!(
        "Expanding {} pixels against {} colors in area ({}, {})..({}, {})",
        pixels.len(),
        palette.len(),
        area.x1,
        area.y1,
        area.x2,
        area.y2
    );

    pixels
        .iter()
        .filter_map(|pixel| match expand_pixel(pixel, &palette) {
            Ok(expanded) => Some(expanded),
            Err(err) => {
                warn!("Skipping pixel {}: {}", pixel, err);
                None
            }
        })
        .collect()
}

fn expand_pixel(pixel: &Value, palette: &HashMap<i64, Color>) -> Result<ExpandedPixel, PixelError> {
    let CompressedPixel {
        x,
        y,
        color,
        timestamp,
    } = serde_json::from_value(pixel.clone())?;

    // A null color id never matches the palette and is not transparent.
    let (r, g, b) = match color {
        Some(TRANSPARENT_COLOR_ID) => (None, None, None),
        Some(id) => match palette.get(&id) {
            Some(entry) => (
                Some(entry.r.unwrap_or(0)),
                Some(entry.g.unwrap_or(0)),
                Some(entry.b.unwrap_or(0)),
            ),
            None => (Some(0), Some(0), Some(0)),
        },
        None => (Some(0), Some(0), Some(0)),
    };

    let (tile_x, local_x) = tile_coords(x);
    let (tile_y, local_y) = tile_coords(y);

    Ok(ExpandedPixel {
        key: format!("{},{}", x, y),
        x,
        y,
        global_x: x,
        global_y: y,
        local_x,
        local_y,
        tile_x,
        tile_y,
        color_id: color,
        r,
        g,
        b,
        timestamp,
    })
}
