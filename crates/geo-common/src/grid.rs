//! Regular latitude/longitude grids of field samples.
//!
//! A [`GridSampleSet`] is an immutable snapshot of one acquisition. On
//! construction it builds an explicit index over its cells:
//!
//! - sorted unique latitudes (rows, south first) and longitudes (columns,
//!   ascending from 0°)
//! - a dense `row × column → sample` table, so holes in the grid are visible
//! - a [`CellKey`] hash map for O(1) lookup by coordinate

use crate::error::{GeoError, GeoResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Coordinates are keyed at micro-degree resolution.
const KEY_SCALE: f64 = 1_000_000.0;

/// 360° expressed in key units.
const FULL_TURN: i64 = 360 * 1_000_000;

/// Normalize a longitude into `[0, 360)`.
pub fn normalize_lon_360(lon: f64) -> f64 {
    let wrapped = lon.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Exact identity of a grid cell.
///
/// Latitude and longitude are quantized to integer micro-degrees, with the
/// longitude wrapped into `[0, 360)`. Two cells are the same cell exactly when
/// their keys are equal, and the antipode is computed in integer arithmetic so
/// it lands on the same key the grid produced for that cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub lat_e6: i64,
    pub lon_e6: i64,
}

impl CellKey {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat_e6: (lat * KEY_SCALE).round() as i64,
            lon_e6: ((lon * KEY_SCALE).round() as i64).rem_euclid(FULL_TURN),
        }
    }

    /// Key of the antipodal cell: `(-lat, (lon + 180) mod 360)`.
    pub fn antipode(&self) -> Self {
        Self {
            lat_e6: -self.lat_e6,
            lon_e6: (self.lon_e6 + FULL_TURN / 2).rem_euclid(FULL_TURN),
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat_e6 as f64 / KEY_SCALE
    }

    pub fn lon(&self) -> f64 {
        self.lon_e6 as f64 / KEY_SCALE
    }
}

/// A single grid cell and its variable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSample {
    /// Cell-centered latitude in degrees, -90..90.
    pub lat: f64,
    /// Cell-centered longitude in degrees, 0..360.
    pub lon: f64,
    /// Variable name to value.
    pub values: BTreeMap<String, f64>,
}

impl GridSample {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter for one variable.
    pub fn with_value(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn key(&self) -> CellKey {
        CellKey::new(self.lat, self.lon)
    }
}

/// The full set of samples for one acquisition.
#[derive(Debug, Clone)]
pub struct GridSampleSet {
    timestamp: String,
    samples: Vec<GridSample>,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    /// Row-major, row 0 = southernmost latitude.
    cells: Vec<Option<usize>>,
    index: HashMap<CellKey, usize>,
    variables: BTreeSet<String>,
}

impl GridSampleSet {
    /// Build and index a sample set.
    ///
    /// Longitudes are normalized into `[0, 360)`. Fails with
    /// [`GeoError::InvalidGrid`] on out-of-range or non-finite coordinates,
    /// non-finite values, or two samples sharing one cell.
    pub fn new(timestamp: impl Into<String>, mut samples: Vec<GridSample>) -> GeoResult<Self> {
        let mut index = HashMap::with_capacity(samples.len());
        let mut lat_keys = BTreeSet::new();
        let mut lon_keys = BTreeSet::new();
        let mut variables = BTreeSet::new();

        for (i, sample) in samples.iter_mut().enumerate() {
            if !sample.lat.is_finite() || !(-90.0..=90.0).contains(&sample.lat) {
                return Err(GeoError::invalid_grid(format!(
                    "sample {} has latitude {} outside -90..90",
                    i, sample.lat
                )));
            }
            if !sample.lon.is_finite() {
                return Err(GeoError::invalid_grid(format!(
                    "sample {} has non-finite longitude",
                    i
                )));
            }
            sample.lon = normalize_lon_360(sample.lon);

            if let Some((name, value)) = sample.values.iter().find(|(_, v)| !v.is_finite()) {
                return Err(GeoError::invalid_grid(format!(
                    "sample ({}, {}) has non-finite {} = {}",
                    sample.lat, sample.lon, name, value
                )));
            }

            let key = sample.key();
            if index.insert(key, i).is_some() {
                return Err(GeoError::invalid_grid(format!(
                    "duplicate cell at lat={} lon={}",
                    sample.lat, sample.lon
                )));
            }
            lat_keys.insert(key.lat_e6);
            lon_keys.insert(key.lon_e6);
            variables.extend(sample.values.keys().cloned());
        }

        let lat_pos: HashMap<i64, usize> = lat_keys.iter().enumerate().map(|(r, k)| (*k, r)).collect();
        let lon_pos: HashMap<i64, usize> = lon_keys.iter().enumerate().map(|(c, k)| (*k, c)).collect();
        let n_cols = lon_keys.len();

        let mut cells = vec![None; lat_keys.len() * n_cols];
        for (key, &i) in &index {
            let row = lat_pos[&key.lat_e6];
            let col = lon_pos[&key.lon_e6];
            cells[row * n_cols + col] = Some(i);
        }

        Ok(Self {
            timestamp: timestamp.into(),
            samples,
            latitudes: lat_keys.iter().map(|k| *k as f64 / KEY_SCALE).collect(),
            longitudes: lon_keys.iter().map(|k| *k as f64 / KEY_SCALE).collect(),
            cells,
            index,
            variables,
        })
    }

    /// Opaque label identifying the source snapshot.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn samples(&self) -> &[GridSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Observed latitudes, ascending (row order).
    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    /// Observed longitudes in `[0, 360)`, ascending (column order).
    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    pub fn row_count(&self) -> usize {
        self.latitudes.len()
    }

    pub fn col_count(&self) -> usize {
        self.longitudes.len()
    }

    /// Sample at a grid position, `None` for a hole or out-of-range index.
    pub fn cell(&self, row: usize, col: usize) -> Option<&GridSample> {
        if row >= self.row_count() || col >= self.col_count() {
            return None;
        }
        self.cells[row * self.col_count() + col].map(|i| &self.samples[i])
    }

    pub fn get(&self, key: &CellKey) -> Option<&GridSample> {
        self.index.get(key).map(|&i| &self.samples[i])
    }

    pub fn lookup(&self, lat: f64, lon: f64) -> Option<&GridSample> {
        self.get(&CellKey::new(lat, lon))
    }

    /// Variable names present on at least one sample, sorted.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(String::as_str)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    /// Number of `row × column` positions with no sample.
    pub fn missing_cells(&self) -> usize {
        self.cells.len() - self.samples.len()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_cells() == 0
    }

    /// Check the completeness invariant: a sample at every observed
    /// latitude × longitude.
    pub fn ensure_complete(&self) -> GeoResult<()> {
        let missing = self.missing_cells();
        if missing > 0 {
            return Err(GeoError::data_incomplete(format!(
                "{} of {} cells missing ({} rows x {} columns)",
                missing,
                self.cells.len(),
                self.row_count(),
                self.col_count()
            )));
        }
        Ok(())
    }
}
