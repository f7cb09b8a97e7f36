//! Error taxonomy shared by the Garland crates.
//!
//! Data-source and state-file failures deliberately do not appear here: the
//! loaders degrade to empty data and the store degrades to defaults, so the
//! calendar always renders. The variants below cover configuration problems
//! and caller mistakes.

/// Convenience alias used throughout `garland-core`.
pub type GarlandResult<T> = Result<T, GarlandError>;

#[derive(Debug, thiserror::Error)]
pub enum GarlandError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("ornament index {index} is out of range (catalog holds {len})")]
    OrnamentOutOfRange { index: usize, len: usize },
}

impl From<toml::de::Error> for GarlandError {
    fn from(err: toml::de::Error) -> Self {
        GarlandError::InvalidConfig(err.to_string())
    }
}

impl From<toml::ser::Error> for GarlandError {
    fn from(err: toml::ser::Error) -> Self {
        GarlandError::InvalidConfig(err.to_string())
    }
}

impl From<serde_yaml::Error> for GarlandError {
    fn from(err: serde_yaml::Error) -> Self {
        GarlandError::InvalidConfig(err.to_string())
    }
}
