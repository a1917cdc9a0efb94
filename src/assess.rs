use crate::model;
use crate::plants::schema::PlantProfile;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Fit {
    Below,
    Within,
    Above,
}

/// How a reading compares against the care range of one plant.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub temperature_c: f64,
    pub temperature: Fit,
    pub light_lux: f64,
    pub light: Fit,
}

impl Assessment {
    pub fn is_ideal(&self) -> bool {
        self.temperature == Fit::Within && self.light == Fit::Within
    }
}

/// Compares a reading against a profile; a missing bound never trips.
///
/// Brightness is converted to lux with `lux_per_count`.
pub fn assess(
    profile: &PlantProfile,
    reading: &model::EnvironmentReading,
    lux_per_count: f64,
) -> Assessment {
    let light_lux = reading.brightness * lux_per_count;

    Assessment {
        temperature_c: reading.temperature,
        temperature: fit(reading.temperature, profile.min_temp_c, profile.max_temp_c),
        light_lux,
        light: fit(
            light_lux,
            Some(f64::from(profile.min_light_lux)),
            profile.max_light_lux.map(f64::from),
        ),
    }
}

fn fit(value: f64, min: Option<f64>, max: Option<f64>) -> Fit {
    match (min, max) {
        (Some(min), _) if value < min => Fit::Below,
        (_, Some(max)) if value > max => Fit::Above,
        _ => Fit::Within,
    }
}
