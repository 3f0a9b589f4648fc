//! Vector line geometry (coastlines and similar polylines).

use serde::{Deserialize, Serialize};

/// A longitude/latitude vertex in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self { lon, lat }
    }
}

/// One polyline, in vertex order. May cross the antimeridian.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineGeometry {
    pub vertices: Vec<GeoPoint>,
}

impl LineGeometry {
    pub fn new(vertices: Vec<GeoPoint>) -> Self {
        Self { vertices }
    }

    /// Build a line from `(lon, lat)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self {
            vertices: pairs.into_iter().map(GeoPoint::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// A line needs at least two finite vertices to produce a stroke.
    pub fn is_drawable(&self) -> bool {
        self.vertices.len() >= 2
            && self
                .vertices
                .iter()
                .all(|p| p.lon.is_finite() && p.lat.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs() {
        let line = LineGeometry::from_pairs([(179.0, 10.0), (-179.0, 10.0)]);
        assert_eq!(line.len(), 2);
        assert_eq!(line.vertices[1], GeoPoint::new(-179.0, 10.0));
        assert!(line.is_drawable());
    }

    #[test]
    fn test_single_vertex_not_drawable() {
        assert!(!LineGeometry::from_pairs([(0.0, 0.0)]).is_drawable());
        assert!(!LineGeometry::from_pairs([(0.0, 0.0), (f64::NAN, 1.0)]).is_drawable());
    }
}
