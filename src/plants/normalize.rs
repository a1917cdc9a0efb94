//! Turns the loosely shaped plant records of the plant API into typed values.
//!
//! The API encodes light requirements as free text in one of two layouts, and
//! temperature limits as nullable objects. Both are normalized here; anything
//! that does not fit is reported as a parsing error naming the offending field.

use crate::error;
use crate::model;

use super::schema::{CareInfo, LightRange, PlantDetails, PlantProfile};

pub const WATERING: &str = "Watering";
pub const LIGHT_IDEAL: &str = "Light ideal";
pub const TEMPERATURE_MIN: &str = "Temperature min";
pub const TEMPERATURE_MAX: &str = "Temperature max";

/// Builds the care profile of a single plant record.
pub fn profile(record: &serde_json::Value) -> Result<PlantProfile, error::Error> {
    let record = record
        .as_object()
        .ok_or_else(|| error::Error::parsing("plant record", "expected a JSON object"))?;

    let watering = required(record, WATERING)?
        .as_str()
        .ok_or_else(|| error::Error::parsing(WATERING, "expected a string"))?
        .to_owned();

    let light_text = required(record, LIGHT_IDEAL)?
        .as_str()
        .ok_or_else(|| error::Error::parsing(LIGHT_IDEAL, "expected a string"))?;

    let (min_light_lux, max_light_lux) = match parse_light(light_text) {
        LightRange::Unbounded { min_lux } => (min_lux, None),
        LightRange::Bounded { min_lux, max_lux } => (min_lux, Some(max_lux)),
        LightRange::Unrecognized(raw) => {
            return Err(error::Error::parsing(
                LIGHT_IDEAL,
                format!("unrecognized light layout {:?}", raw),
            ))
        }
    };

    Ok(PlantProfile {
        min_temp_c: temperature(record, TEMPERATURE_MIN)?,
        max_temp_c: temperature(record, TEMPERATURE_MAX)?,
        min_light_lux,
        max_light_lux,
        watering,
    })
}

/// Classifies `Light ideal` text.
///
/// An open-ended range reads `"... (<min>/..."`, usually with a `+` before the
/// number; its lower bound sits between `" ("` and the first `/`. A closed range
/// reads `"... ( <max> to <min> lux/..."`.
pub fn parse_light(text: &str) -> LightRange {
    let parsed = if text.contains('+') {
        parse_unbounded(text)
    } else {
        parse_bounded(text).or_else(|| parse_unbounded(text))
    };

    parsed.unwrap_or_else(|| LightRange::Unrecognized(text.to_owned()))
}

fn parse_unbounded(text: &str) -> Option<LightRange> {
    let (_, rest) = text.split_once(" (")?;
    let (token, _) = rest.split_once('/')?;
    if token.contains(" to ") {
        return None;
    }
    let token = token
        .replace(' ', "")
        .replace("lux", "")
        .replace(',', "")
        .replace('+', "");

    let min_lux = token.parse().ok()?;
    Some(LightRange::Unbounded { min_lux })
}

fn parse_bounded(text: &str) -> Option<LightRange> {
    let cleaned = text.replace(" lux", "").replace(',', "");
    let (_, rest) = cleaned.split_once(" ( ")?;
    let (range, _) = rest.split_once('/')?;
    let (first, second) = range.split_once(" to ")?;

    let first: u32 = first.trim().parse().ok()?;
    let second: u32 = second.trim().parse().ok()?;

    // The API lists the upper bound first; order them regardless.
    Some(LightRange::Bounded {
        min_lux: first.min(second),
        max_lux: first.max(second),
    })
}

/// Reads a `{"C": ...}` temperature limit; `null` means the plant has no limit.
fn temperature(
    record: &serde_json::Map<String, serde_json::Value>,
    field: &str,
) -> Result<Option<f64>, error::Error> {
    match required(record, field)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(limit) => limit
            .get("C")
            .and_then(serde_json::Value::as_f64)
            .map(Some)
            .ok_or_else(|| {
                error::Error::parsing(format!("{}.C", field), "expected a number of degrees")
            }),
        _ => Err(error::Error::parsing(field, "expected an object or null")),
    }
}

fn required<'a>(
    record: &'a serde_json::Map<String, serde_json::Value>,
    field: &str,
) -> Result<&'a serde_json::Value, error::Error> {
    record
        .get(field)
        .ok_or_else(|| error::Error::parsing(field, "field is missing"))
}

/// Collects the descriptive fields of a plant record. Absent fields stay `None`;
/// the record id falls back to the id it was requested with.
///
/// Care data is attached only when the record normalizes into a profile.
pub fn details(
    requested: &model::PlantId,
    record: &serde_json::Value,
) -> Result<PlantDetails, error::Error> {
    let care = profile(record).ok();
    let record = record
        .as_object()
        .ok_or_else(|| error::Error::parsing("plant record", "expected a JSON object"))?;

    let id = record
        .get("id")
        .and_then(id_of)
        .unwrap_or_else(|| requested.clone());

    Ok(PlantDetails {
        id,
        latin_name: text(record.get("Latin name")),
        common_name: first_text(record.get("Common name")),
        image: text(record.get("Img")),
        description: text(record.get("Description")),
        category: text(record.get("Categories")),
        origin: joined_text(record.get("Origin")),
        climate: text(record.get("Climat")),
        care_info: care.as_ref().map(CareInfo::from_profile),
        temperature: care.as_ref().and_then(PlantProfile::mean_temp_c),
    })
}

/// Plant ids come back as strings or as bare numbers.
pub fn id_of(value: &serde_json::Value) -> Option<model::PlantId> {
    match value {
        serde_json::Value::String(id) => Some(model::PlantId(id.clone())),
        serde_json::Value::Number(id) => Some(model::PlantId(id.to_string())),
        _ => None,
    }
}

pub fn text(value: Option<&serde_json::Value>) -> Option<String> {
    value
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

pub fn first_text(value: Option<&serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::Array(items)) => text(items.first()),
        other => text(other),
    }
}

fn joined_text(value: Option<&serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::Array(items)) => {
            let parts = items
                .iter()
                .filter_map(serde_json::Value::as_str)
                .collect::<Vec<_>>();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        other => text(other),
    }
}
