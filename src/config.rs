use std::env;
use std::path;

use crate::error;

const ENV_PREFIX: &str = "VERDANT";
const DEFAULT_CONFIG_FILE: &str = "verdant.toml";

/// Variables the older deployment scripts exported, mapped onto config keys.
const LEGACY_VARIABLES: &[(&str, &str)] = &[
    ("SUPABASE_URL", "table_store.url"),
    ("SUPABASE_ANON_KEY", "table_store.key"),
    ("ZYLALABS_API_KEY", "plant_api.token"),
];

#[derive(Debug, Deserialize)]
pub struct Config {
    pub table_store: TableStore,
    pub plant_api: PlantApi,
    pub sensor: Sensor,
}

#[derive(Debug, Deserialize)]
pub struct TableStore {
    pub url: Option<String>,
    pub key: Option<String>,
    pub table: String,
}

#[derive(Debug, Deserialize)]
pub struct PlantApi {
    pub base_url: String,
    pub search_path: String,
    pub plant_path: String,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Sensor {
    pub i2c_bus: path::PathBuf,
    pub interval_secs: u64,
    #[serde(deserialize_with = "deserialize_i2c_address")]
    pub humidity_address: u16,
    #[serde(deserialize_with = "deserialize_i2c_address")]
    pub pressure_address: u16,
    #[serde(deserialize_with = "deserialize_i2c_address")]
    pub colour_address: u16,
    pub colour_gain: u8,
    pub colour_integration_cycles: u16,
    pub lux_per_count: f64,
}

impl Config {
    /// Loads defaults, then the config file, then the environment.
    ///
    /// An explicitly given file must exist; the default `verdant.toml` is optional.
    pub fn load(file: Option<&path::Path>) -> Result<Self, error::Error> {
        let mut builder = defaults()?;

        builder = match file {
            Some(file) => builder.add_source(::config::File::from(file).required(true)),
            None => builder
                .add_source(::config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        for (variable, key) in LEGACY_VARIABLES {
            if let Ok(value) = env::var(variable) {
                builder = builder.set_override(*key, value)?;
            }
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}

fn defaults() -> Result<::config::ConfigBuilder<::config::builder::DefaultState>, error::Error> {
    Ok(::config::Config::builder()
        .set_default("table_store.table", "pi_data")?
        .set_default(
            "plant_api.base_url",
            "https://zylalabs.com/api/774/house+plants+database+api",
        )?
        .set_default("plant_api.search_path", "509/search")?
        .set_default("plant_api.plant_path", "510/get+plant+by+id")?
        .set_default("sensor.i2c_bus", "/dev/i2c-1")?
        .set_default("sensor.interval_secs", 60i64)?
        .set_default("sensor.humidity_address", "5f")?
        .set_default("sensor.pressure_address", "5c")?
        .set_default("sensor.colour_address", "29")?
        .set_default("sensor.colour_gain", 16i64)?
        .set_default("sensor.colour_integration_cycles", 1i64)?
        .set_default("sensor.lux_per_count", 100.0)?)
}

fn deserialize_i2c_address<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
    let digits = raw.trim_start_matches("0x");

    let address = u16::from_str_radix(digits, 16).map_err(|e| {
        serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(&raw),
            &format!("a valid hexadecimal integer: {}", e).as_str(),
        )
    })?;

    if address > 0x7f {
        Err(serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(&raw),
            &"a 7-bit I2C address, like \"5f\"",
        ))
    } else {
        Ok(address)
    }
}
