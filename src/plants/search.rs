use crate::error;
use crate::model;

use super::normalize;
use super::schema::PlantSummary;

/// Extracts the plant ids of a search response, in the order the API returned them.
///
/// Ids are not deduplicated.
pub fn ids(results: &serde_json::Value) -> Result<Vec<model::PlantId>, error::Error> {
    hits(results)?
        .iter()
        .enumerate()
        .map(|(index, hit)| {
            hit.get("item")
                .and_then(|item| item.get("id"))
                .and_then(normalize::id_of)
                .ok_or_else(|| {
                    error::Error::parsing(format!("[{}].item.id", index), "expected a plant id")
                })
        })
        .collect()
}

/// Summarizes at most `limit` hits of a search response.
pub fn summaries(
    results: &serde_json::Value,
    limit: usize,
) -> Result<Vec<PlantSummary>, error::Error> {
    hits(results)?
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, hit)| -> Result<PlantSummary, error::Error> {
            let item = hit.get("item").filter(|item| item.is_object()).ok_or_else(|| {
                error::Error::parsing(format!("[{}].item", index), "expected an object")
            })?;
            let id = item.get("id").and_then(normalize::id_of).ok_or_else(|| {
                error::Error::parsing(format!("[{}].item.id", index), "expected a plant id")
            })?;

            Ok(PlantSummary {
                id,
                latin_name: normalize::text(item.get("Latin name")),
                common_name: normalize::first_text(item.get("Common name")),
                image: normalize::text(item.get("Img")),
                category: normalize::text(item.get("Categories")),
                watering: normalize::text(item.get(normalize::WATERING)),
            })
        })
        .collect()
}

fn hits(results: &serde_json::Value) -> Result<&Vec<serde_json::Value>, error::Error> {
    results
        .as_array()
        .ok_or_else(|| error::Error::parsing("search response", "expected a JSON array"))
}
