use log::{debug, error, info, warn};
use serde_json::{Map, Value};
use structures::Area;

use crate::{
    bitmap::{self, PaintedMap},
    constants::DEFAULT_VERSION,
    errors::NormalizeError,
    expander::expand_pixels,
    record::{is_present, GuardRecord},
};

/// Wire-format generations Guard has shipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatVersion {
    V1_0,
    V1_1,
    /// Compact pixels plus an optional packed painted map.
    V1_2,
    Unknown(String),
}

impl FormatVersion {
    pub fn parse(label: &str) -> Self {
        match label {
            "1.0" => FormatVersion::V1_0,
            "1.1" => FormatVersion::V1_1,
            "1.2" => FormatVersion::V1_2,
            other => FormatVersion::Unknown(other.to_string()),
        }
    }

    /// A missing or null version means [`DEFAULT_VERSION`]. Only string
    /// versions are recognized; anything else is carried as its JSON text.
    pub fn of(record: &GuardRecord) -> Self {
        match record.get("version") {
            None | Some(Value::Null) => Self::parse(DEFAULT_VERSION),
            Some(Value::String(label)) => Self::parse(label),
            Some(other) => FormatVersion::Unknown(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FormatVersion::V1_0 => "1.0",
            FormatVersion::V1_1 => "1.1",
            FormatVersion::V1_2 => "1.2",
            FormatVersion::Unknown(label) => label,
        }
    }
}

/// How a record gets turned into the worker format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Expand compact pixels and unpack the painted map.
    Compressed,
    /// Pixels are already worker-shaped; only make sure each has a key.
    Legacy,
    /// Copy through and only tag the record.
    Passthrough,
}

pub fn select_strategy(version: &FormatVersion, has_pixels: bool) -> Strategy {
    match (version, has_pixels) {
        (FormatVersion::V1_2, true) => Strategy::Compressed,
        (FormatVersion::V1_0 | FormatVersion::V1_1, _) => Strategy::Legacy,
        (_, true) => Strategy::Legacy,
        (_, false) => Strategy::Passthrough,
    }
}

/// Converts a record of any supported version into the worker format.
///
/// This never fails. When the record cannot be processed the result is a copy
/// of the input with `processed: false` and a `processingError` message, so
/// callers must check `processed` rather than expect an error.
pub fn normalize(record: &GuardRecord) -> GuardRecord {
    match try_normalize(record) {
        Ok(normalized) => normalized,
        Err(err) => {
            error!("Could not process guard data: {}", err);

            let mut fallback = record.clone();
            fallback.insert("processed", false);
            fallback.insert("processingError", err.to_string());
            fallback
        }
    }
}

fn try_normalize(record: &GuardRecord) -> Result<GuardRecord, NormalizeError> {
    let version = FormatVersion::of(record);
    info!("Processing guard data version {}", version.label());

    let area = record.area().ok_or(NormalizeError::MissingArea)?;

    let normalized = match select_strategy(&version, record.contains_key("originalPixels")) {
        Strategy::Compressed => normalize_compressed(record, area),
        Strategy::Legacy => normalize_legacy(record, &version),
        Strategy::Passthrough => {
            warn!("Unknown guard data format: {}", version.label());

            let mut normalized = record.clone();
            normalized.insert("processed", true);
            normalized.insert("originalFormat", "unknown");
            normalized
        }
    };

    info!(
        "Guard data processed: {} pixels",
        normalized
            .pixels()
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    );

    Ok(normalized)
}

fn normalize_compressed(record: &GuardRecord, area: &Value) -> GuardRecord {
    info!("Expanding compressed v1.2 pixels");

    // The bounds are informational for expansion; a malformed area still
    // counts as present.
    let bounds: Area = serde_json::from_value(area.clone()).unwrap_or_default();
    let pixels = pixel_list(record);
    let colors = passthrough(record, "colors", Value::Array(vec![]));

    let expanded = expand_pixels(pixels, record.colors(), &bounds);
    let expanded_count = expanded.len();
    let painted_map_processed = painted_map(record).is_some();

    let mut fields = Map::new();
    fields.insert("version".to_string(), Value::from(FormatVersion::V1_2.label()));
    fields.insert("timestamp".to_string(), passthrough(record, "timestamp", Value::Null));
    fields.insert(
        "protectionData".to_string(),
        passthrough(record, "protectionData", empty_object()),
    );
    fields.insert("protectionArea".to_string(), area.clone());
    fields.insert("area".to_string(), area.clone());
    fields.insert(
        "originalPixels".to_string(),
        serde_json::to_value(expanded).unwrap_or_else(|_| Value::Array(vec![])),
    );
    fields.insert("colors".to_string(), colors);
    fields.insert("progress".to_string(), passthrough(record, "progress", empty_object()));
    fields.insert("config".to_string(), passthrough(record, "config", empty_object()));
    fields.insert("processed".to_string(), Value::Bool(true));
    fields.insert("originalFormat".to_string(), Value::from("compressed_v1.2"));
    fields.insert("expandedPixels".to_string(), Value::from(expanded_count));
    fields.insert(
        "paintedMapProcessed".to_string(),
        Value::Bool(painted_map_processed),
    );

    // Anything else the uploader sent rides along after the worker fields.
    for (key, value) in record.fields() {
        fields.entry(key.clone()).or_insert_with(|| value.clone());
    }

    GuardRecord::new(fields)
}

fn normalize_legacy(record: &GuardRecord, version: &FormatVersion) -> GuardRecord {
    info!("Processing legacy format {}", version.label());

    let pixels: Vec<Value> = pixel_list(record).iter().filter_map(legacy_pixel).collect();

    let mut normalized = record.clone();
    normalized.insert("originalPixels", pixels);
    normalized.insert("processed", true);
    normalized.insert("originalFormat", format!("legacy_{}", version.label()));
    normalized
}

/// Keyed pixels are kept verbatim, unkeyed ones get `key` from
/// `globalX`/`x` and `globalY`/`y`. Non-object entries are dropped.
fn legacy_pixel(pixel: &Value) -> Option<Value> {
    let Value::Object(fields) = pixel else {
        debug!("Dropping non-object legacy pixel {}", pixel);
        return None;
    };

    if fields.contains_key("key") {
        return Some(pixel.clone());
    }

    let coord = |global: &str, local: &str| {
        fields
            .get(global)
            .or_else(|| fields.get(local))
            .map_or_else(|| "0".to_string(), key_component)
    };
    let key = format!("{},{}", coord("globalX", "x"), coord("globalY", "y"));

    let mut keyed = fields.clone();
    keyed.insert("key".to_string(), Value::String(key));
    Some(Value::Object(keyed))
}

fn key_component(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Decodes the packed painted map of a record, if it carries one with a
/// positive `protectionData.areaSize`.
pub fn painted_map(record: &GuardRecord) -> Option<PaintedMap> {
    let packed = record.get("paintedMapPacked").filter(|value| is_present(value))?;
    let size = record.area_size()?;

    if size.width <= 0 || size.height <= 0 {
        return None;
    }

    let Some(encoded) = packed.as_str() else {
        error!("Could not unpack painted map: paintedMapPacked is not a string");
        return None;
    };

    let map = bitmap::decode(encoded, size.width, size.height)?;
    info!("Unpacked painted map: {}x{}", size.width, size.height);
    Some(map)
}

fn pixel_list(record: &GuardRecord) -> &[Value] {
    match record.pixels() {
        Some(Value::Array(pixels)) => pixels.as_slice(),
        Some(other) => {
            warn!("originalPixels is not an array: {}", other);
            &[]
        }
        None => &[],
    }
}

fn passthrough(record: &GuardRecord, key: &str, default: Value) -> Value {
    record.get(key).cloned().unwrap_or(default)
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
