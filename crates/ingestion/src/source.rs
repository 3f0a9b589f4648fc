//! Acquisition seams consumed by the render pipeline.

use crate::coastline::parse_geojson;
use crate::error::Result;
use crate::gfs::{build_sample_set, parse_ascii};
use async_trait::async_trait;
use geo_common::{GridSampleSet, LineGeometry};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Provides one complete grid snapshot.
#[async_trait]
pub trait GridSource: Send + Sync {
    async fn acquire(&self) -> Result<GridSampleSet>;
}

/// Provides overlay polylines.
#[async_trait]
pub trait GeometrySource: Send + Sync {
    async fn geometry(&self) -> Result<Arc<Vec<LineGeometry>>>;
}

/// A fixed, already-loaded grid.
#[derive(Debug, Clone)]
pub struct StaticGridSource {
    set: GridSampleSet,
}

impl StaticGridSource {
    pub fn new(set: GridSampleSet) -> Self {
        Self { set }
    }

    /// Load temperature (K) and pressure (Pa) from saved OPeNDAP ASCII responses.
    pub fn from_ascii_files(
        timestamp: &str,
        temperature: impl AsRef<Path>,
        pressure: impl AsRef<Path>,
    ) -> Result<Self> {
        let temperature = parse_ascii(&std::fs::read_to_string(temperature.as_ref())?)?;
        let pressure = parse_ascii(&std::fs::read_to_string(pressure.as_ref())?)?;
        let set = build_sample_set(timestamp, &temperature, &pressure)?;
        info!(samples = set.len(), timestamp = timestamp, "Loaded grid from files");
        Ok(Self { set })
    }
}

#[async_trait]
impl GridSource for StaticGridSource {
    async fn acquire(&self) -> Result<GridSampleSet> {
        Ok(self.set.clone())
    }
}

/// A fixed set of polylines.
#[derive(Debug, Clone, Default)]
pub struct StaticGeometrySource {
    lines: Arc<Vec<LineGeometry>>,
}

impl StaticGeometrySource {
    pub fn new(lines: Vec<LineGeometry>) -> Self {
        Self {
            lines: Arc::new(lines),
        }
    }

    pub fn from_geojson_file(path: impl AsRef<Path>) -> Result<Self> {
        let lines = parse_geojson(&std::fs::read_to_string(path.as_ref())?)?;
        Ok(Self::new(lines))
    }
}

#[async_trait]
impl GeometrySource for StaticGeometrySource {
    async fn geometry(&self) -> Result<Arc<Vec<LineGeometry>>> {
        Ok(Arc::clone(&self.lines))
    }
}
