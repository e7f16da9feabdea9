use serde_json::{Map, Value};
use structures::AreaSize;


type Fields = Map<String, Value>;
type Lookup = for<'a> fn(&'a Fields) -> Option<&'a Value>;

// Checked in order; the first non-empty value wins.
const AREA_LOCATIONS: [Lookup; 3] = [protection_data_area, protection_area, top_level_area];

fn protection_data_area(fields: &Fields) -> Option<&Value> {
    fields.get("protectionData")?.get("area")
}

fn protection_area(fields: &Fields) -> Option<&Value> {
    fields.get("protectionArea")
}

fn top_level_area(fields: &Fields) -> Option<&Value> {
    fields.get("area")
}

const AREA_SIZE_LOCATIONS: [Lookup; 1] = [protection_data_area_size];

fn protection_data_area_size(fields: &Fields) -> Option<&Value> {
    fields.get("protectionData")?.get("areaSize")
}

/// A Guard data record as uploaded, or as produced by the normalizer.
///
/// Kept as a raw JSON object so that fields this crate knows nothing about
/// survive normalization untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuardRecord(Fields);

impl GuardRecord {
    pub fn new(fields: Fields) -> Self {
        Self(fields)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn into_fields(self) -> Fields {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn area(&self) -> Option<&Value> {
        first_present(&self.0, &AREA_LOCATIONS)
    }

    /// Painted map dimensions. Missing or non-integer sides read as 0.
    pub fn area_size(&self) -> Option<AreaSize> {
        let size = first_present(&self.0, &AREA_SIZE_LOCATIONS)?;
        let side = |name: &str| size.get(name).and_then(Value::as_i64).unwrap_or(0);

        Some(AreaSize {
            width: side("width"),
            height: side("height"),
        })
    }

    pub fn colors(&self) -> &[Value] {
        self.0
            .get("colors")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn pixels(&self) -> Option<&Value> {
        self.0.get("originalPixels")
    }
}

impl From<GuardRecord> for Value {
    fn from(record: GuardRecord) -> Self {
        Value::Object(record.0)
    }
}

fn first_present<'a>(fields: &'a Fields, lookups: &[Lookup]) -> Option<&'a Value> {
    lookups
        .iter()
        .find_map(|lookup| lookup(fields).filter(|value| is_present(value)))
}

/// Loose "has content" check used for optional keys: null, false, zero and
/// empty strings/arrays/objects all count as absent.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> GuardRecord {
        GuardRecord::from_value(value).unwrap()
    }

    #[test]
    fn area_prefers_protection_data() {
        let r = record(json!({
            "protectionData": {"area": {"x1": 1, "y1": 1, "x2": 2, "y2": 2}},
            "protectionArea": {"x1": 3, "y1": 3, "x2": 4, "y2": 4},
            "area": {"x1": 5, "y1": 5, "x2": 6, "y2": 6},
        }));

        assert_eq!(r.area(), Some(&json!({"x1": 1, "y1": 1, "x2": 2, "y2": 2})));
    }

    #[test]
    fn area_skips_empty_locations() {
        let r = record(json!({
            "protectionData": {"area": {}},
            "protectionArea": null,
            "area": {"x1": 5, "y1": 5, "x2": 6, "y2": 6},
        }));

        assert_eq!(r.area(), Some(&json!({"x1": 5, "y1": 5, "x2": 6, "y2": 6})));
    }

    #[test]
    fn area_missing_everywhere() {
        let r = record(json!({"protectionData": "not an object", "version": "1.2"}));
        assert_eq!(r.area(), None);
    }

    #[test]
    fn area_size_reads_sides_leniently() {
        let r = record(json!({"protectionData": {"areaSize": {"width": 4, "height": "x"}}}));
        assert_eq!(r.area_size(), Some(AreaSize { width: 4, height: 0 }));

        assert_eq!(record(json!({"protectionData": {}})).area_size(), None);
    }

    #[test]
    fn colors_not_an_array_reads_as_empty() {
        assert!(record(json!({"colors": {"id": 1}})).colors().is_empty());
    }

    #[test]
    fn round_trips_unknown_fields_in_order() {
        let text = r#"{"zeta":1,"alpha":{"nested":[1,2]},"version":"1.1"}"#;
        let r = GuardRecord::from_json(text).unwrap();
        assert_eq!(r.to_json(false).unwrap(), text);
    }
}
