use failure::Fail;

/// Errors surfaced by the plant lookups, the table store and configuration loading.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "request to {} failed: {}", url, cause)]
    Transport {
        url: String,
        #[cause]
        cause: reqwest::Error,
    },
    #[fail(display = "could not parse {}: {}", location, reason)]
    Parsing { location: String, reason: String },
    #[fail(display = "invalid configuration: {}", _0)]
    Configuration(String),
}

impl Error {
    pub fn parsing<L, R>(location: L, reason: R) -> Self
    where
        L: Into<String>,
        R: Into<String>,
    {
        Error::Parsing {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// The field or element a parsing error points at, if this is one.
    pub fn location(&self) -> Option<&str> {
        match self {
            Error::Parsing { location, .. } => Some(location),
            _ => None,
        }
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Error::Configuration(err.to_string())
    }
}
