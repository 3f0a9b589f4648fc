//! Error types for antipode-atlas.

use thiserror::Error;

/// Result type alias using GeoError.
pub type GeoResult<T> = Result<T, GeoError>;

/// Primary error type for grid, matching and rendering operations.
#[derive(Debug, Error)]
pub enum GeoError {
    // === Caller Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    // === Data Errors ===
    #[error("Grid data incomplete: {0}")]
    DataIncomplete(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Failed to parse upstream data: {0}")]
    Parse(String),

    // === Collaborator Errors ===
    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

impl GeoError {
    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a DataIncomplete error.
    pub fn data_incomplete(msg: impl Into<String>) -> Self {
        Self::DataIncomplete(msg.into())
    }

    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create a Parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an Acquisition error.
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }

    /// Create an Encoding error.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Stable label for the error kind, used in logs and by callers that
    /// branch on the classification rather than the message.
    pub fn kind(&self) -> &'static str {
        match self {
            GeoError::Configuration(_) => "ConfigurationError",
            GeoError::DataIncomplete(_) => "DataIncompleteError",
            GeoError::InvalidGrid(_) => "InvalidGridError",
            GeoError::Parse(_) => "ParseError",
            GeoError::Acquisition(_) => "AcquisitionError",
            GeoError::Encoding(_) => "EncodingError",
        }
    }

    /// Whether the failure is the caller's fault and must not be retried.
    pub fn is_configuration(&self) -> bool {
        matches!(self, GeoError::Configuration(_))
    }
}

impl From<serde_json::Error> for GeoError {
    fn from(err: serde_json::Error) -> Self {
        GeoError::Parse(format!("JSON error: {}", err))
    }
}
