//! Synthetic global grids and upstream payloads.
//!
//! Grids follow the GFS 1° layout unless noted: rows from -90 northwards,
//! columns from 0° eastwards, no row at +90.

use geo_common::{GridSample, GridSampleSet, PRESSURE, TEMPERATURE};
use std::io::Write;
use tempfile::NamedTempFile;

/// Latitudes `-90, -90 + step, ...` strictly below 90.
pub fn grid_latitudes(step: f64) -> Vec<f64> {
    let n = (180.0 / step).round() as usize;
    (0..n).map(|i| -90.0 + i as f64 * step).collect()
}

/// Longitudes `0, step, ...` strictly below 360.
pub fn grid_longitudes(step: f64) -> Vec<f64> {
    let n = (360.0 / step).round() as usize;
    (0..n).map(|i| i as f64 * step).collect()
}

/// Build a full grid from a value function `f(lat, lon) -> (temperature, pressure)`.
pub fn global_grid<F>(step: f64, timestamp: &str, f: F) -> GridSampleSet
where
    F: Fn(f64, f64) -> (f64, f64),
{
    let lats = grid_latitudes(step);
    let lons = grid_longitudes(step);
    let mut samples = Vec::with_capacity(lats.len() * lons.len());
    for &lat in &lats {
        for &lon in &lons {
            let (t, p) = f(lat, lon);
            samples.push(
                GridSample::new(lat, lon)
                    .with_value(TEMPERATURE, t)
                    .with_value(PRESSURE, p),
            );
        }
    }
    match GridSampleSet::new(timestamp, samples) {
        Ok(set) => set,
        Err(e) => panic!("generated grid is well-formed: {}", e),
    }
}

/// Realistic-looking fields: warm equator, cold poles, gentle pressure waves.
/// Northern and southern hemispheres differ, so few cells match.
pub fn weather_like_grid(step: f64) -> GridSampleSet {
    global_grid(step, "synthetic", |lat, lon| {
        let t = 28.0 * lat.to_radians().cos() - 12.0 + 0.05 * lat + 2.0 * lon.to_radians().sin();
        let p = 0.98 + 0.02 * (2.0 * lat.to_radians()).sin() + 0.005 * lon.to_radians().cos();
        (t, p)
    })
}

/// Fields invariant under the antipode map, so every paired cell matches.
pub fn antipodally_symmetric_grid(step: f64) -> GridSampleSet {
    global_grid(step, "symmetric", |lat, lon| {
        let t = 15.0 + 10.0 * lat.to_radians().cos() + (2.0 * lon.to_radians()).cos();
        let p = 1.0 + 0.02 * (2.0 * lon.to_radians()).sin();
        (t, p)
    })
}

/// Render one variable in OPeNDAP ASCII form (`var, [1][rows][cols]`, one
/// `[0][j], ...` line per row, then time/lat/lon coordinate blocks).
pub fn opendap_ascii<F>(var: &str, lats: &[f64], lons: &[f64], f: F) -> String
where
    F: Fn(f64, f64) -> f64,
{
    let join = |values: &mut dyn Iterator<Item = f64>| -> String {
        values.map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
    };

    let mut out = format!("{}, [1][{}][{}]\n", var, lats.len(), lons.len());
    for (j, &lat) in lats.iter().enumerate() {
        let row = join(&mut lons.iter().map(|&lon| f(lat, lon)));
        out.push_str(&format!("[0][{}], {}\n", j, row));
    }
    out.push('\n');
    out.push_str(&format!("{}.time, [1]\n738000.5\n", var));
    out.push_str(&format!("{}.lat, [{}]\n{}\n", var, lats.len(), join(&mut lats.iter().copied())));
    out.push_str(&format!("{}.lon, [{}]\n{}\n", var, lons.len(), join(&mut lons.iter().copied())));
    out
}

/// Minimal Natural Earth style GeoJSON with one `LineString`, one
/// `MultiLineString` and one `Point` feature.
pub fn coastline_geojson() -> String {
    r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "properties": { "featurecla": "Coastline" },
      "geometry": { "type": "LineString", "coordinates": [[-10.0, 50.0], [0.0, 52.0], [10.0, 54.0]] } },
    { "type": "Feature", "properties": { "featurecla": "Coastline" },
      "geometry": { "type": "MultiLineString", "coordinates": [
        [[170.0, -20.0], [179.5, -18.0], [-179.5, -17.0]],
        [[100.0, 5.0], [101.0, 6.0]]
      ] } },
    { "type": "Feature", "properties": {},
      "geometry": { "type": "Point", "coordinates": [0.0, 0.0] } }
  ]
}"#
    .to_string()
}

/// Write `contents` to a fresh temporary file.
pub fn write_temp_file(contents: &str) -> NamedTempFile {
    let mut file = match NamedTempFile::new() {
        Ok(f) => f,
        Err(e) => panic!("failed to create temp file: {}", e),
    };
    if let Err(e) = file.write_all(contents.as_bytes()) {
        panic!("failed to write temp file: {}", e);
    }
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gfs_layout() {
        let lats = grid_latitudes(1.0);
        let lons = grid_longitudes(1.0);
        assert_eq!(lats.len(), 180);
        assert_eq!(lons.len(), 360);
        assert_eq!(lats[0], -90.0);
        assert_eq!(lats[179], 89.0);
        assert_eq!(lons[359], 359.0);
    }

    #[test]
    fn test_weather_like_grid_complete() {
        let set = weather_like_grid(10.0);
        assert_eq!(set.len(), 18 * 36);
        assert!(set.is_complete());
    }

    #[test]
    fn test_opendap_ascii_shape() {
        let text = opendap_ascii("tmp2m", &[-90.0, 0.0], &[0.0, 180.0], |lat, _| lat + 300.0);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "tmp2m, [1][2][2]");
        assert_eq!(lines[1], "[0][0], 210, 210");
        assert_eq!(lines[2], "[0][1], 300, 300");
        assert!(text.contains("tmp2m.lat, [2]\n-90, 0\n"));
        assert!(text.ends_with("tmp2m.lon, [2]\n0, 180\n"));
    }
}
