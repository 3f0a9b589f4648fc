//! Error types for the ingestion crate.

use geo_common::GeoError;
use thiserror::Error;

/// Errors that can occur while acquiring grids or geometry.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("Failed to parse OPeNDAP response: {0}")]
    AsciiParse(String),

    #[error("Failed to parse GeoJSON: {0}")]
    GeoJson(String),

    #[error("No GFS dataset available in the last {hours} hours (tried {attempts} cycles)")]
    NoDataInWindow { hours: u32, attempts: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Grid(#[from] GeoError),
}

impl From<reqwest::Error> for IngestionError {
    fn from(err: reqwest::Error) -> Self {
        IngestionError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for IngestionError {
    fn from(err: serde_json::Error) -> Self {
        IngestionError::GeoJson(err.to_string())
    }
}

impl From<IngestionError> for GeoError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::Grid(inner) => inner,
            IngestionError::InvalidConfig(msg) => GeoError::configuration(msg),
            IngestionError::AsciiParse(msg) | IngestionError::GeoJson(msg) => GeoError::parse(msg),
            other => GeoError::acquisition(other.to_string()),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
