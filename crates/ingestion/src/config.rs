//! Acquisition configuration.

use crate::error::{IngestionError, Result};
use serde::{Deserialize, Serialize};

/// NOMADS OPeNDAP root for the 1° GFS product.
pub const DEFAULT_GFS_BASE_URL: &str = "https://nomads.ncep.noaa.gov/dods/gfs_1p00";

/// Natural Earth 110 m coastlines.
pub const DEFAULT_COASTLINE_URL: &str =
    "https://raw.githubusercontent.com/nvkelso/natural-earth-vector/master/geojson/ne_110m_coastline.geojson";

/// GFS runs every 6 hours.
pub const GFS_CYCLE_HOURS: u32 = 6;

/// Settings for GFS OPeNDAP acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GfsConfig {
    pub base_url: String,
    /// Prepended verbatim to every request URL (e.g. a CORS proxy).
    pub proxy_url: Option<String>,
    /// How far back to look for a published cycle.
    pub lookback_hours: u32,
    /// OPeNDAP variable holding 2 m temperature (Kelvin).
    pub temperature_var: String,
    /// OPeNDAP variable holding surface pressure (Pascal).
    pub pressure_var: String,
    /// Number of latitude rows requested.
    pub rows: usize,
    /// Number of longitude columns requested.
    pub cols: usize,
    pub request_timeout_secs: u64,
}

impl Default for GfsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GFS_BASE_URL.to_string(),
            proxy_url: None,
            lookback_hours: 12,
            temperature_var: "tmp2m".to_string(),
            pressure_var: "pressfc".to_string(),
            rows: 180,
            cols: 360,
            request_timeout_secs: 120,
        }
    }
}

impl GfsConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(IngestionError::InvalidConfig("GFS base_url is empty".into()));
        }
        if self.lookback_hours == 0 {
            return Err(IngestionError::InvalidConfig(
                "lookback_hours must be at least 1".into(),
            ));
        }
        if self.rows == 0 || self.cols == 0 {
            return Err(IngestionError::InvalidConfig(format!(
                "grid request must be non-empty, got {}x{}",
                self.rows, self.cols
            )));
        }
        Ok(())
    }

    /// Number of cycles tried across the lookback window.
    pub fn attempts(&self) -> usize {
        self.lookback_hours.div_ceil(GFS_CYCLE_HOURS) as usize
    }
}

/// Settings for coastline acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoastlineConfig {
    pub url: String,
    pub request_timeout_secs: u64,
}

impl Default for CoastlineConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_COASTLINE_URL.to_string(),
            request_timeout_secs: 60,
        }
    }
}
