//! Coastline polylines from GeoJSON.

use crate::config::CoastlineConfig;
use crate::error::{IngestionError, Result};
use crate::fetch::{HttpFetcher, TextFetcher};
use crate::source::GeometrySource;
use async_trait::async_trait;
use geo_common::{GeoPoint, LineGeometry};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Other,
}

/// `None` when any position has fewer than two coordinates.
fn to_line(positions: Vec<Vec<f64>>) -> Option<LineGeometry> {
    positions
        .into_iter()
        .map(|p| match p.as_slice() {
            [lon, lat, ..] => Some(GeoPoint::new(*lon, *lat)),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(LineGeometry::new)
}

/// Extract every `LineString` and each member of every `MultiLineString`
/// from a GeoJSON feature collection.
///
/// Other geometry types are ignored. A line with a malformed position is
/// skipped on its own; the rest of the document still loads.
pub fn parse_geojson(text: &str) -> Result<Vec<LineGeometry>> {
    let collection: FeatureCollection = serde_json::from_str(text)?;

    let mut lines = Vec::new();
    let mut ignored = 0usize;
    let mut malformed = 0usize;
    let mut push = |positions: Vec<Vec<f64>>| match to_line(positions) {
        Some(line) => lines.push(line),
        None => malformed += 1,
    };
    for geometry in collection.features.into_iter().filter_map(|f| f.geometry) {
        match geometry {
            Geometry::LineString { coordinates } => push(coordinates),
            Geometry::MultiLineString { coordinates } => coordinates.into_iter().for_each(&mut push),
            Geometry::Other => ignored += 1,
        }
    }
    if ignored > 0 {
        debug!(ignored = ignored, "Ignored non-line geometries");
    }
    if malformed > 0 {
        warn!(malformed = malformed, kept = lines.len(), "Skipped lines with malformed positions");
    }
    Ok(lines)
}

/// Downloads coastlines once per process and serves the cached copy after.
///
/// A failed download leaves the cache empty, so the next call retries.
pub struct CoastlineSource<F: TextFetcher = HttpFetcher> {
    fetcher: F,
    url: String,
    cache: OnceCell<Arc<Vec<LineGeometry>>>,
}

impl CoastlineSource<HttpFetcher> {
    pub fn new(config: &CoastlineConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_fetcher(config.url.clone(), fetcher))
    }
}

impl<F: TextFetcher> CoastlineSource<F> {
    pub fn with_fetcher(url: impl Into<String>, fetcher: F) -> Self {
        Self {
            fetcher,
            url: url.into(),
            cache: OnceCell::new(),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cache.initialized()
    }

    pub async fn lines(&self) -> Result<Arc<Vec<LineGeometry>>> {
        let lines = self
            .cache
            .get_or_try_init(|| async {
                let text = self.fetcher.fetch(&self.url).await?;
                let lines = parse_geojson(&text)?;
                info!(url = %self.url, lines = lines.len(), "Loaded coastlines");
                Ok::<_, IngestionError>(Arc::new(lines))
            })
            .await?;
        Ok(Arc::clone(lines))
    }
}

#[async_trait]
impl<F: TextFetcher> GeometrySource for CoastlineSource<F> {
    async fn geometry(&self) -> Result<Arc<Vec<LineGeometry>>> {
        self.lines().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::coastline_geojson;

    #[test]
    fn test_parse_line_and_multiline() {
        let lines = parse_geojson(&coastline_geojson()).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 3);
        assert_eq!(lines[0].vertices[0], GeoPoint::new(-10.0, 50.0));
        assert_eq!(lines[1].vertices[2], GeoPoint::new(-179.5, -17.0));
        assert_eq!(lines[2].len(), 2);
    }

    #[test]
    fn test_altitude_is_ignored() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"LineString","coordinates":[[1,2,30],[3,4,40]]}}]}"#;
        let lines = parse_geojson(text).unwrap();
        assert_eq!(lines[0].vertices[1], GeoPoint::new(3.0, 4.0));
    }

    #[test]
    fn test_short_position_skips_only_that_line() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"LineString","coordinates":[[0,0],[1,1],[2,2]]}},
            {"type":"Feature","geometry":{"type":"LineString","coordinates":[[1],[3,4]]}}]}"#;
        let lines = parse_geojson(text).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 3);
    }

    #[test]
    fn test_malformed_multiline_member_skipped() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"MultiLineString","coordinates":[
                [[10,10],[11,11]],
                [[20,20],[21]],
                [[30,30],[31,31],[32,32]]]}},
            {"type":"Feature","geometry":{"type":"LineString","coordinates":[[-5,1],[-6,2]]}}]}"#;
        let lines = parse_geojson(text).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].vertices[0], GeoPoint::new(10.0, 10.0));
        assert_eq!(lines[1].len(), 3);
        assert_eq!(lines[2].vertices[1], GeoPoint::new(-6.0, 2.0));
    }

    #[test]
    fn test_null_geometry_skipped() {
        let text = r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":null}]}"#;
        assert!(parse_geojson(text).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_geojson("not json"), Err(IngestionError::GeoJson(_))));
    }
}
