use crate::model;

/// Legacy stand-in for a missing minimum temperature.
pub const NO_MIN_TEMP_C: f64 = -273.0;
/// Legacy stand-in for a missing maximum temperature.
pub const NO_MAX_TEMP_C: f64 = 999.0;
/// Legacy stand-in for a missing maximum light level.
pub const NO_MAX_LIGHT: &str = "Infinity";

/// Care thresholds of one plant. A `None` bound means the plant has no limit on that side.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantProfile {
    pub min_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub min_light_lux: u32,
    pub max_light_lux: Option<u32>,
    pub watering: String,
}

/// The two layouts the plant API uses for its `Light ideal` text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LightRange {
    /// `"Full sun (+21,500 lux /+2000 fc)"` or `"Full sun (10000/5000 lux)"`
    Unbounded { min_lux: u32 },
    /// `"Strong light ( 21,500 to 3,200 lux/2000 to 300 fc)"`
    Bounded { min_lux: u32, max_lux: u32 },
    Unrecognized(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantSummary {
    pub id: model::PlantId,
    pub latin_name: Option<String>,
    pub common_name: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub watering: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantDetails {
    pub id: model::PlantId,
    pub latin_name: Option<String>,
    pub common_name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub origin: Option<String>,
    pub climate: Option<String>,
    /// Absent when the record has no usable care fields.
    pub care_info: Option<CareInfo>,
    /// Midpoint of the temperature range, when both ends are known.
    pub temperature: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareInfo {
    pub watering: String,
    pub min_light_lux: u32,
    pub max_light_lux: Option<u32>,
    /// Midpoint of a closed light range, rounded down.
    pub brightness: Option<u32>,
}

impl CareInfo {
    pub fn from_profile(profile: &PlantProfile) -> Self {
        CareInfo {
            watering: profile.watering.clone(),
            min_light_lux: profile.min_light_lux,
            max_light_lux: profile.max_light_lux,
            brightness: profile
                .max_light_lux
                .map(|max| ((u64::from(profile.min_light_lux) + u64::from(max)) / 2) as u32),
        }
    }
}

impl PlantProfile {
    pub fn mean_temp_c(&self) -> Option<f64> {
        match (self.min_temp_c, self.max_temp_c) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            _ => None,
        }
    }

    /// Renders the profile as `[minTemp, maxTemp, minLight, maxLight, watering]`,
    /// the shape older consumers of the lookup expect.
    ///
    /// Missing bounds become the sentinels `-273`, `999` and `"Infinity"`. When the
    /// light range is open-ended the lower bound is emitted as a string token.
    pub fn to_legacy(&self) -> serde_json::Value {
        let min_light = match self.max_light_lux {
            Some(_) => serde_json::Value::from(self.min_light_lux),
            None => serde_json::Value::from(self.min_light_lux.to_string()),
        };
        let max_light = match self.max_light_lux {
            Some(max) => serde_json::Value::from(max),
            None => serde_json::Value::from(NO_MAX_LIGHT),
        };

        serde_json::Value::Array(vec![
            number(self.min_temp_c.unwrap_or(NO_MIN_TEMP_C)),
            number(self.max_temp_c.unwrap_or(NO_MAX_TEMP_C)),
            min_light,
            max_light,
            serde_json::Value::from(self.watering.as_str()),
        ])
    }
}

// Whole degrees are written as integers, which is how the API reports them.
fn number(value: f64) -> serde_json::Value {
    if value.fract() == 0.0 && value.abs() < i64::max_value() as f64 {
        serde_json::Value::from(value as i64)
    } else {
        serde_json::Value::from(value)
    }
}
