use serde_json::Value;
use structures::Area;

use crate::{errors::ValidationError, record::GuardRecord};

/// Minimal structural checks before a record is handed to a worker. Stops at
/// the first problem found.
pub fn validate(record: &GuardRecord) -> Result<(), ValidationError> {
    let area = record.area().ok_or(ValidationError::MissingArea)?;
    let area = area.as_object().ok_or(ValidationError::AreaNotObject)?;

    let missing: Vec<&'static str> = Area::BOUND_FIELDS
        .into_iter()
        .filter(|field| !area.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingAreaFields(missing));
    }

    let pixels = match record.pixels() {
        None => &[][..],
        Some(Value::Array(pixels)) => pixels.as_slice(),
        Some(_) => return Err(ValidationError::PixelsNotArray),
    };
    if pixels.is_empty() {
        return Err(ValidationError::NoPixels);
    }

    match record.get("colors") {
        None | Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(ValidationError::ColorsNotArray),
    }
}
