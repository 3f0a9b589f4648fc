//! Common types shared across the antipode-atlas crates.

pub mod bbox;
pub mod error;
pub mod geometry;
pub mod grid;

pub use bbox::BoundingBox;
pub use error::{GeoError, GeoResult};
pub use geometry::{GeoPoint, LineGeometry};
pub use grid::{normalize_lon_360, CellKey, GridSample, GridSampleSet};

/// Variable name for 2 m air temperature (degrees Celsius).
pub const TEMPERATURE: &str = "temperature";

/// Variable name for surface pressure (atmospheres).
pub const PRESSURE: &str = "pressure";
