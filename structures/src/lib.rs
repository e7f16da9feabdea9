use serde_json::Value;

#[macro_use]
extern crate serde_derive;

/// Protected rectangle. Bounds are passed through as-is; whether `x2`/`y2`
/// are inclusive is up to the producer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Area {
    #[serde(default)]
    pub x1: i64,
    #[serde(default)]
    pub y1: i64,
    #[serde(default)]
    pub x2: i64,
    #[serde(default)]
    pub y2: i64,
}

impl Area {
    pub const BOUND_FIELDS: [&'static str; 4] = ["x1", "y1", "x2", "y2"];

    /// `None` when the bounds are too far apart to subtract.
    pub fn width(&self) -> Option<i64> {
        self.x2.checked_sub(self.x1)
    }

    pub fn height(&self) -> Option<i64> {
        self.y2.checked_sub(self.y1)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct AreaSize {
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
}

/// Palette entry. Entries without an id never match a pixel.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Color {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub r: Option<i64>,
    #[serde(default)]
    pub g: Option<i64>,
    #[serde(default)]
    pub b: Option<i64>,
}

/// v1.2 compact pixel. An absent color is 0 (transparent); an explicit null
/// color is kept as `None`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CompressedPixel {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
    #[serde(default = "transparent")]
    pub color: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

/// Pixel in the shape the downstream worker consumes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedPixel {
    pub key: String,
    pub x: i64,
    pub y: i64,
    pub global_x: i64,
    pub global_y: i64,
    pub local_x: i64,
    pub local_y: i64,
    pub tile_x: i64,
    pub tile_y: i64,
    pub color_id: Option<i64>,
    pub r: Option<i64>,
    pub g: Option<i64>,
    pub b: Option<i64>,
    pub timestamp: Option<Value>,
}

impl ExpandedPixel {
    /// `[r, g, b, a]`, fully transparent when the channels are null.
    pub fn rgba(&self) -> [u8; 4] {
        match (self.r, self.g, self.b) {
            (Some(r), Some(g), Some(b)) => [clamp_channel(r), clamp_channel(g), clamp_channel(b), 0xff],
            _ => [0, 0, 0, 0],
        }
    }
}

fn transparent() -> Option<i64> {
    Some(0)
}

fn clamp_channel(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}
