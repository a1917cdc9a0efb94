use std::fmt;

/// One sample of the sensor board, as inserted into the table store.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnvironmentReading {
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub brightness: f64,
    pub collected_at: chrono::DateTime<chrono::Utc>,
}

/// Identifier the plant API assigns to each plant; names are not unique.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PlantId(pub String);

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'a> From<&'a str> for PlantId {
    fn from(id: &'a str) -> Self {
        PlantId(id.to_owned())
    }
}
