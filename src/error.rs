use thiserror::Error;

use crate::domain::RecordId;

/// Error signal carried through a stream of records.
///
/// Every failure that terminates a stage travels downstream as one of these,
/// unchanged from the point where it was raised.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Coordinate resolution failed for element {id}: {source}")]
    Resolution {
        id: RecordId,
        #[source]
        source: anyhow::Error,
    },

    #[error("Upstream failure: {0}")]
    Upstream(#[source] anyhow::Error),

    #[error("Lifecycle reporter failure: {0}")]
    Reporter(#[from] ReporterError),
}

impl StageError {
    pub fn upstream(error: impl Into<anyhow::Error>) -> Self {
        StageError::Upstream(error.into())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReporterError {
    #[error("reporter unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum GeoFixError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Stage error: {0}")]
    Stage(#[from] StageError),
}

pub type Result<T> = std::result::Result<T, GeoFixError>;
