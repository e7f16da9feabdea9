use log::error;
use serde_json::Value;
use structures::Area;

use crate::{errors::SummaryError, normalizer::FormatVersion, record::GuardRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaInfo {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
    pub width: i64,
    pub height: i64,
}

impl TryFrom<Area> for AreaInfo {
    type Error = SummaryError;

    fn try_from(area: Area) -> Result<Self, Self::Error> {
        let (Some(width), Some(height)) = (area.width(), area.height()) else {
            return Err(SummaryError::AreaOutOfRange);
        };

        Ok(Self {
            x1: area.x1,
            y1: area.y1,
            x2: area.x2,
            y2: area.y2,
            width,
            height,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardInfo {
    pub version: String,
    pub is_compressed: bool,
    pub pixel_count: usize,
    pub color_count: usize,
    pub area: AreaInfo,
    pub timestamp: Value,
    pub has_protection_data: bool,
    pub has_painted_map: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summary {
    Info(GuardInfo),
    Error { error: String },
}

/// Read-only digest of a raw or normalized record. Never fails; a record that
/// cannot be described yields [`Summary::Error`].
pub fn summarize(record: &GuardRecord) -> Summary {
    match describe(record) {
        Ok(info) => Summary::Info(info),
        Err(err) => {
            error!("Could not summarize guard data: {}", err);
            Summary::Error {
                error: err.to_string(),
            }
        }
    }
}

fn describe(record: &GuardRecord) -> Result<GuardInfo, SummaryError> {
    let version = FormatVersion::of(record);

    let area = match record.area() {
        None => AreaInfo::default(),
        Some(area) if !area.is_object() => return Err(SummaryError::AreaNotObject),
        Some(area) => AreaInfo::try_from(serde_json::from_value::<Area>(area.clone())?)?,
    };

    let length = |key: &str| record.get(key).and_then(Value::as_array).map_or(0, Vec::len);

    Ok(GuardInfo {
        is_compressed: version == FormatVersion::V1_2 && record.contains_key("paintedMapPacked"),
        version: version.label().to_string(),
        pixel_count: length("originalPixels"),
        color_count: length("colors"),
        area,
        timestamp: record.get("timestamp").cloned().unwrap_or(Value::Null),
        has_protection_data: record.contains_key("protectionData"),
        has_painted_map: record.contains_key("paintedMapPacked"),
    })
}
