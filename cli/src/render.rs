use image::{imageops, imageops::FilterType, Rgba, RgbaImage};
use log::debug;
use processor::{GuardRecord, PaintedMap};
use serde_json::Value;
use structures::{Area, ExpandedPixel};

use crate::errors::CliError;

const PAINTED: Rgba<u8> = Rgba([0, 0, 0, 0xff]);

/// Draws the pixels of a normalized record onto a canvas the size of its
/// area. Transparent pixels and pixels outside the area are left blank.
pub fn render_pixels(record: &GuardRecord) -> Result<RgbaImage, CliError> {
    let area: Area = record
        .area()
        .and_then(|area| serde_json::from_value(area.clone()).ok())
        .ok_or(CliError::NothingToRender("record has no readable area"))?;

    let extent = |side: Option<i64>| side.and_then(|side| u32::try_from(side).ok());
    let (width, height) = match (extent(area.width()), extent(area.height())) {
        (Some(width), Some(height)) if width > 0 && height > 0 => (width, height),
        _ => return Err(CliError::NothingToRender("area has no extent")),
    };

    let mut canvas = RgbaImage::new(width, height);
    let pixels = record
        .pixels()
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut drawn = 0;
    for pixel in pixels {
        let Some((x, y, color)) = placement(pixel) else {
            debug!("Not drawing pixel {}", pixel);
            continue;
        };

        let (Ok(x), Ok(y)) = (
            u32::try_from(x.saturating_sub(area.x1)),
            u32::try_from(y.saturating_sub(area.y1)),
        ) else {
            continue;
        };
        if x < width && y < height {
            canvas.put_pixel(x, y, Rgba(color));
            drawn += 1;
        }
    }

    debug!("Drew {} of {} pixels", drawn, pixels.len());
    Ok(canvas)
}

/// Global position and color of a worker pixel, whichever version produced it.
fn placement(pixel: &Value) -> Option<(i64, i64, [u8; 4])> {
    if let Ok(expanded) = serde_json::from_value::<ExpandedPixel>(pixel.clone()) {
        return Some((expanded.global_x, expanded.global_y, expanded.rgba()));
    }

    let x = first_int(pixel, &["globalX", "x"])?;
    let y = first_int(pixel, &["globalY", "y"])?;

    let color = match (
        first_int(pixel, &["r"]),
        first_int(pixel, &["g"]),
        first_int(pixel, &["b"]),
    ) {
        (Some(r), Some(g), Some(b)) => [channel(r), channel(g), channel(b), 0xff],
        _ => [0, 0, 0, 0],
    };

    Some((x, y, color))
}

fn first_int(pixel: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| pixel.get(*key)?.as_i64())
}

fn channel(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

/// Painted cells in black on white.
pub fn render_painted_map(map: &PaintedMap) -> RgbaImage {
    let mut canvas = RgbaImage::new(map.width() as u32, map.height() as u32);
    canvas.fill(0xff);

    for (y, row) in map.rows().iter().enumerate() {
        for (x, painted) in row.iter().enumerate() {
            if *painted {
                canvas.put_pixel(x as u32, y as u32, PAINTED);
            }
        }
    }

    canvas
}

pub fn scale(canvas: RgbaImage, factor: u32) -> Result<RgbaImage, CliError> {
    if factor <= 1 {
        return Ok(canvas);
    }

    let (Some(width), Some(height)) = (
        canvas.width().checked_mul(factor),
        canvas.height().checked_mul(factor),
    ) else {
        return Err(CliError::NothingToRender("scaled image is too large"));
    };

    Ok(imageops::resize(&canvas, width, height, FilterType::Nearest))
}

#[cfg(test)]
mod tests {
    use processor::{decode_painted_map, normalize};
    use serde_json::json;

    use super::*;

    fn normalized(value: Value) -> GuardRecord {
        normalize(&GuardRecord::from_value(value).unwrap())
    }

    #[test]
    fn draws_expanded_pixels_inside_area() {
        let record = normalized(json!({
            "version": "1.2",
            "area": {"x1": 1000, "y1": 1000, "x2": 1004, "y2": 1002},
            "colors": [{"id": 1, "r": 255, "g": 0, "b": 0}],
            "originalPixels": [
                {"x": 1000, "y": 1000, "color": 1},
                {"x": 1003, "y": 1001, "color": 0},
                {"x": 1002, "y": 1001, "color": 9},
                {"x": 999, "y": 1000, "color": 1},
                {"x": 1004, "y": 1000, "color": 1},
            ],
        }));

        let canvas = render_pixels(&record).unwrap();

        assert_eq!(canvas.dimensions(), (4, 2));
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(3, 1), &Rgba([0, 0, 0, 0]));
        assert_eq!(canvas.get_pixel(2, 1), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(3, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn draws_legacy_pixels() {
        let record = normalized(json!({
            "version": "1.1",
            "protectionArea": {"x1": 0, "y1": 0, "x2": 2, "y2": 2},
            "originalPixels": [{"globalX": 1, "globalY": 1, "r": 0, "g": 0, "b": 255}],
        }));

        let canvas = render_pixels(&record).unwrap();

        assert_eq!(canvas.get_pixel(1, 1), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn empty_area_is_an_error() {
        let record = normalized(json!({
            "version": "1.0",
            "area": {"x1": 5, "y1": 5, "x2": 5, "y2": 9},
        }));

        assert!(matches!(
            render_pixels(&record),
            Err(CliError::NothingToRender(_))
        ));
    }

    #[test]
    fn painted_map_black_on_white() {
        let map = decode_painted_map("BQ==", 2, 2).unwrap();

        let canvas = scale(render_painted_map(&map), 3).unwrap();

        assert_eq!(canvas.dimensions(), (6, 6));
        assert_eq!(canvas.get_pixel(0, 0), &PAINTED);
        assert_eq!(canvas.get_pixel(3, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(0, 3), &PAINTED);
        assert_eq!(canvas.get_pixel(5, 5), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn oversized_scale_is_an_error() {
        let map = decode_painted_map("BQ==", 2, 2).unwrap();

        assert!(matches!(
            scale(render_painted_map(&map), u32::MAX),
            Err(CliError::NothingToRender(_))
        ));
    }

    #[test]
    fn unsubtractable_area_is_an_error() {
        let record = normalized(json!({
            "version": "1.0",
            "area": {"x1": i64::MIN, "y1": 0, "x2": i64::MAX, "y2": 4},
        }));

        assert!(matches!(
            render_pixels(&record),
            Err(CliError::NothingToRender(_))
        ));
    }

    #[test]
    fn saves_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.png");
        let map = decode_painted_map("/w==", 4, 2).unwrap();

        render_painted_map(&map).save(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.get_pixel(3, 1), &PAINTED);
    }
}
