//! Small hand-built sample sets with known matching behavior.

use geo_common::{GridSample, GridSampleSet, LineGeometry, PRESSURE, TEMPERATURE};

/// Latitudes of the 3 × 4 scenario grid.
pub const SCENARIO_LATS: [f64; 3] = [-90.0, 0.0, 90.0];

/// Longitudes of the 3 × 4 scenario grid.
pub const SCENARIO_LONS: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

/// Timestamp label used by fixture sets.
pub const FIXTURE_TIMESTAMP: &str = "2024-01-15 12z";

/// The 3 × 4 grid with one candidate antipodal pair.
///
/// Cell `(90, 0)` carries `temp_north` and cell `(-90, 180)` carries
/// `temp_south`; both have pressure 100.0. Every other cell gets values that
/// differ from its antipode by several percent, so the only possible match is
/// the one between those two cells.
pub fn scenario_grid(temp_north: f64, temp_south: f64) -> GridSampleSet {
    let mut samples = Vec::with_capacity(SCENARIO_LATS.len() * SCENARIO_LONS.len());
    let mut filler = 0.0;

    for &lat in &SCENARIO_LATS {
        for &lon in &SCENARIO_LONS {
            let (t, p) = if lat == 90.0 && lon == 0.0 {
                (temp_north, 100.0)
            } else if lat == -90.0 && lon == 180.0 {
                (temp_south, 100.0)
            } else {
                filler += 1.0;
                (20.0 + filler * 3.0, 50.0 + filler * 5.0)
            };
            samples.push(
                GridSample::new(lat, lon)
                    .with_value(TEMPERATURE, t)
                    .with_value(PRESSURE, p),
            );
        }
    }

    match GridSampleSet::new(FIXTURE_TIMESTAMP, samples) {
        Ok(set) => set,
        Err(e) => panic!("scenario grid is well-formed: {}", e),
    }
}

/// Two-vertex polyline that crosses the antimeridian at latitude 10.
pub fn dateline_crossing_line() -> LineGeometry {
    LineGeometry::from_pairs([(179.0, 10.0), (-179.0, 10.0)])
}

/// A handful of coastline-like lines, one crossing the antimeridian and one
/// malformed (single vertex).
pub fn sample_coastlines() -> Vec<LineGeometry> {
    vec![
        LineGeometry::from_pairs([(-10.0, 50.0), (0.0, 52.0), (10.0, 54.0)]),
        LineGeometry::from_pairs([(170.0, -20.0), (178.0, -18.0), (-175.0, -16.0), (-170.0, -15.0)]),
        LineGeometry::from_pairs([(45.0, 0.0)]),
    ]
}
