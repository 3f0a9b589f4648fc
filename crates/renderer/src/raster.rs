//! Grid-to-image projection.
//!
//! The native grid stores longitudes in `[0, 360)`. Before sampling, columns
//! are re-centered into `[-180, 180)` so the 0°/360° seam falls on the image
//! edges. Output pixels are sampled at their geographic centers through the
//! shared [`Equirectangular`] mapping.

use crate::gradient::{normalize, value_range, Color, ColorScale};
use geo_common::{GeoError, GeoResult, GridSampleSet};
use projection::{recenter_lon, Equirectangular};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// How native grid values are resampled to output pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    Nearest,
    #[default]
    Bilinear,
}

impl InterpolationMethod {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nearest" => Some(Self::Nearest),
            "bilinear" | "linear" => Some(Self::Bilinear),
            _ => None,
        }
    }
}

/// One variable of a [`GridSampleSet`] laid out as a dense array in
/// re-centered column order. Holes are `NaN`.
#[derive(Debug, Clone)]
pub struct NativeGrid {
    /// Ascending, row 0 south.
    pub latitudes: Vec<f64>,
    /// Ascending in `[-180, 180)`.
    pub longitudes: Vec<f64>,
    /// Row-major values.
    pub values: Vec<f64>,
}

impl NativeGrid {
    pub fn from_samples(set: &GridSampleSet, variable: &str) -> Self {
        let rows = set.row_count();
        let cols = set.col_count();

        // Native column index for each re-centered column
        let mut order: Vec<(f64, usize)> = set
            .longitudes()
            .iter()
            .enumerate()
            .map(|(c, &lon)| (recenter_lon(lon), c))
            .collect();
        order.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut values = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for &(_, native_col) in &order {
                let v = set
                    .cell(row, native_col)
                    .and_then(|s| s.value(variable))
                    .unwrap_or(f64::NAN);
                values.push(v);
            }
        }

        Self {
            latitudes: set.latitudes().to_vec(),
            longitudes: order.iter().map(|(lon, _)| *lon).collect(),
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.longitudes.len()
    }

    pub fn height(&self) -> usize {
        self.latitudes.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values
            .get(row * self.width() + col)
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// Fractional column for a longitude. Columns are assumed evenly spaced
    /// around the full circle, so the result wraps.
    fn col_position(&self, lon: f64) -> f64 {
        let n = self.width() as f64;
        let step = 360.0 / n;
        ((lon - self.longitudes[0]) / step).rem_euclid(n)
    }

    /// Fractional row for a latitude, clamped to the sampled rows.
    fn row_position(&self, lat: f64) -> f64 {
        let n = self.height();
        if n < 2 {
            return 0.0;
        }
        let first = self.latitudes[0];
        let step = (self.latitudes[n - 1] - first) / (n - 1) as f64;
        ((lat - first) / step).clamp(0.0, (n - 1) as f64)
    }

    /// Value at a geographic point, `None` when no data is available.
    pub fn sample(&self, lat: f64, lon: f64, method: InterpolationMethod) -> Option<f64> {
        if self.width() == 0 || self.height() == 0 {
            return None;
        }
        let fx = self.col_position(lon);
        let fy = self.row_position(lat);
        let cols = self.width();
        let rows = self.height();

        let value = match method {
            InterpolationMethod::Nearest => {
                let col = (fx.round() as usize) % cols;
                let row = (fy.round() as usize).min(rows - 1);
                self.get(row, col)
            }
            InterpolationMethod::Bilinear => {
                let x0 = (fx.floor() as usize) % cols;
                let x1 = (x0 + 1) % cols;
                let y0 = (fy.floor() as usize).min(rows - 1);
                let y1 = (y0 + 1).min(rows - 1);
                let dx = fx - fx.floor();
                let dy = fy - fy.floor();

                let v00 = self.get(y0, x0);
                let v10 = self.get(y0, x1);
                let v01 = self.get(y1, x0);
                let v11 = self.get(y1, x1);
                if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
                    return None;
                }

                let v0 = v00 * (1.0 - dx) + v10 * dx;
                let v1 = v01 * (1.0 - dx) + v11 * dx;
                v0 * (1.0 - dy) + v1 * dy
            }
        };

        value.is_finite().then_some(value)
    }
}

/// A projected RGBA image of one variable.
///
/// Row 0 is the southernmost row. Pixels with no data are fully transparent.
#[derive(Debug, Clone)]
pub struct Raster {
    pub variable: String,
    pub projection: Equirectangular,
    /// Finite min/max of the native values used for color normalization.
    pub value_range: Option<(f64, f64)>,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap an RGBA buffer in south-first row order.
    pub fn from_rgba(
        variable: impl Into<String>,
        projection: Equirectangular,
        data: Vec<u8>,
    ) -> GeoResult<Self> {
        let expected = projection.width * projection.height * 4;
        if data.len() != expected {
            return Err(GeoError::configuration(format!(
                "RGBA buffer has {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                projection.width,
                projection.height
            )));
        }
        Ok(Self {
            variable: variable.into(),
            projection,
            value_range: None,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.projection.width
    }

    pub fn height(&self) -> usize {
        self.projection.height
    }

    /// Pixel at `(row, col)`, row 0 = south.
    pub fn pixel(&self, row: usize, col: usize) -> Option<Color> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        let i = (row * self.width() + col) * 4;
        Some(Color::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }

    pub fn is_no_data(&self, row: usize, col: usize) -> bool {
        self.pixel(row, col).map_or(true, Color::is_transparent)
    }

    /// Raw RGBA bytes, south-first rows.
    pub fn rgba(&self) -> &[u8] {
        &self.data
    }

    /// RGBA bytes with the northernmost row first, as image formats expect.
    pub fn to_top_down_rgba(&self) -> Vec<u8> {
        flip_rows(&self.data, self.width() * 4)
    }

    /// Replace the pixels from a north-first buffer of the same size.
    pub fn set_from_top_down_rgba(&mut self, top_down: &[u8]) -> GeoResult<()> {
        if top_down.len() != self.data.len() {
            return Err(GeoError::configuration(format!(
                "RGBA buffer has {} bytes, raster has {}",
                top_down.len(),
                self.data.len()
            )));
        }
        self.data = flip_rows(top_down, self.width() * 4);
        Ok(())
    }
}

fn flip_rows(data: &[u8], stride: usize) -> Vec<u8> {
    if stride == 0 {
        return data.to_vec();
    }
    data.chunks_exact(stride).rev().flatten().copied().collect()
}

/// Projects one variable of a sample set onto a global equirectangular raster.
#[derive(Debug, Clone)]
pub struct RasterProjector {
    projection: Equirectangular,
    interpolation: InterpolationMethod,
    scales: BTreeMap<String, ColorScale>,
}

impl RasterProjector {
    /// A projector for `width × height` output covering the whole sphere.
    pub fn new(width: usize, height: usize) -> GeoResult<Self> {
        Ok(Self {
            projection: Equirectangular::global(width, height)?,
            interpolation: InterpolationMethod::default(),
            scales: BTreeMap::new(),
        })
    }

    pub fn with_interpolation(mut self, method: InterpolationMethod) -> Self {
        self.interpolation = method;
        self
    }

    pub fn with_scale(mut self, variable: impl Into<String>, scale: ColorScale) -> Self {
        self.scales.insert(variable.into(), scale);
        self
    }

    pub fn projection(&self) -> &Equirectangular {
        &self.projection
    }

    /// Scale used for `variable`; unconfigured variables are sequential.
    pub fn scale_for(&self, variable: &str) -> ColorScale {
        self.scales.get(variable).copied().unwrap_or_default()
    }

    /// Render `variable` to a raster of exactly the configured dimensions.
    ///
    /// A variable missing from a non-empty set is a configuration error. An
    /// empty set renders as all "no data".
    pub fn project(&self, set: &GridSampleSet, variable: &str) -> GeoResult<Raster> {
        if !set.is_empty() && !set.has_variable(variable) {
            return Err(GeoError::configuration(format!(
                "cannot project unknown variable '{}' (available: {})",
                variable,
                set.variables().collect::<Vec<_>>().join(", ")
            )));
        }

        let grid = NativeGrid::from_samples(set, variable);
        let range = value_range(&grid.values);
        let scale = self.scale_for(variable);
        let proj = self.projection;
        let method = self.interpolation;

        let mut data = vec![0u8; proj.width * proj.height * 4];
        data.par_chunks_mut(proj.width * 4)
            .enumerate()
            .for_each(|(row, line)| {
                for col in 0..proj.width {
                    let center = proj.pixel_center(row, col);
                    let color = match (grid.sample(center.lat, center.lon, method), range) {
                        (Some(v), Some(r)) => scale.color_at(normalize(v, r)),
                        _ => Color::transparent(),
                    };
                    line[col * 4..col * 4 + 4].copy_from_slice(&color.to_rgba());
                }
            });

        debug!(
            variable = variable,
            native_rows = grid.height(),
            native_cols = grid.width(),
            width = proj.width,
            height = proj.height,
            ?range,
            "Projected raster"
        );

        let mut raster = Raster::from_rgba(variable, proj, data)?;
        raster.value_range = range;
        Ok(raster)
    }
}
