//! Equirectangular (plate carrée) projection.
//!
//! Pixel columns are linear in longitude and pixel rows linear in latitude.
//! Raster space has its origin at the lower-left corner: `x` grows east from
//! `min_x`, `y` grows north from `min_y`, and row 0 is the southernmost row.
//! Canvases that draw north first convert with [`Equirectangular::to_image_y`].

use geo_common::{BoundingBox, GeoError, GeoPoint, GeoResult};
use serde::{Deserialize, Serialize};

/// Re-center a longitude into `[-180, 180)`.
///
/// Grids stored in `[0, 360)` put the 0°/360° seam in the middle of a map
/// centered on the antimeridian; re-centering moves the seam to the edges.
pub fn recenter_lon(lon: f64) -> f64 {
    let shifted = (lon + 180.0).rem_euclid(360.0);
    if shifted >= 360.0 {
        -180.0
    } else {
        shifted - 180.0
    }
}

/// Linear mapping between a geographic box and a pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equirectangular {
    /// Geographic extent covered by the raster
    pub bounds: BoundingBox,
    /// Output width in pixels
    pub width: usize,
    /// Output height in pixels
    pub height: usize,
}

impl Equirectangular {
    /// Create a projection, rejecting zero-size outputs and degenerate bounds.
    pub fn new(bounds: BoundingBox, width: usize, height: usize) -> GeoResult<Self> {
        if width == 0 || height == 0 {
            return Err(GeoError::configuration(format!(
                "raster dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if !bounds.is_valid() {
            return Err(GeoError::configuration(format!(
                "projection bounds must have positive extent, got {:?}",
                bounds
            )));
        }
        Ok(Self {
            bounds,
            width,
            height,
        })
    }

    /// Full sphere, longitudes `[-180, 180)`, latitudes `[-90, 90]`.
    pub fn global(width: usize, height: usize) -> GeoResult<Self> {
        Self::new(BoundingBox::global(), width, height)
    }

    /// Degrees of longitude per pixel.
    pub fn lon_resolution(&self) -> f64 {
        self.bounds.width() / self.width as f64
    }

    /// Degrees of latitude per pixel.
    pub fn lat_resolution(&self) -> f64 {
        self.bounds.height() / self.height as f64
    }

    /// Longitude to raster-space x (0 at `min_x`, `width` at `max_x`).
    pub fn lon_to_x(&self, lon: f64) -> f64 {
        (lon - self.bounds.min_x) / self.bounds.width() * self.width as f64
    }

    /// Latitude to raster-space y (0 at `min_y`, `height` at `max_y`).
    pub fn lat_to_y(&self, lat: f64) -> f64 {
        (lat - self.bounds.min_y) / self.bounds.height() * self.height as f64
    }

    /// Project a geographic point into raster space.
    pub fn project(&self, point: GeoPoint) -> (f64, f64) {
        (self.lon_to_x(point.lon), self.lat_to_y(point.lat))
    }

    /// Geographic coordinates of the center of pixel `(row, col)`.
    pub fn pixel_center(&self, row: usize, col: usize) -> GeoPoint {
        GeoPoint {
            lon: self.bounds.min_x + (col as f64 + 0.5) * self.lon_resolution(),
            lat: self.bounds.min_y + (row as f64 + 0.5) * self.lat_resolution(),
        }
    }

    /// Convert a raster-space y (south-up) into image-space y (north-up).
    pub fn to_image_y(&self, y: f64) -> f64 {
        self.height as f64 - y
    }
}
