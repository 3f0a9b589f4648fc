//! Integration tests for antipode matching.

use geo_common::{CellKey, GeoError, GridSample, GridSampleSet, PRESSURE, TEMPERATURE};
use std::collections::HashSet;
use symmetry::{AntipodeMatcher, MatchConfig, ToleranceMode};
use test_utils::{antipodally_symmetric_grid, scenario_grid, weather_like_grid};

fn default_matcher() -> AntipodeMatcher {
    AntipodeMatcher::new(MatchConfig::default()).unwrap()
}

// ============================================================================
// Scenario grid
// ============================================================================

#[test]
fn test_scenario_within_tolerance_yields_one_pair() {
    let set = scenario_grid(10.0, 10.0005);
    let report = default_matcher().find_matches(&set).unwrap();

    assert_eq!(report.len(), 1);
    let pair = &report.pairs[0];
    let ends: HashSet<CellKey> = [pair.key_a(), pair.key_b()].into_iter().collect();
    let expected: HashSet<CellKey> = [CellKey::new(90.0, 0.0), CellKey::new(-90.0, 180.0)]
        .into_iter()
        .collect();
    assert_eq!(ends, expected);
    assert_eq!(pair.values_a[PRESSURE], 100.0);
    assert_eq!(pair.values_b[PRESSURE], 100.0);
}

#[test]
fn test_scenario_outside_tolerance_yields_no_pairs() {
    let set = scenario_grid(10.0, 10.5);
    let report = default_matcher().find_matches(&set).unwrap();
    assert!(report.is_empty());
    // 4 pole-to-pole pairs plus 2 equatorial pairs
    assert_eq!(report.compared, 6);
}

#[test]
fn test_scenario_side_a_is_smaller_key() {
    let set = scenario_grid(10.0, 10.0005);
    let pair = &default_matcher().find_matches(&set).unwrap().pairs[0];
    assert_eq!((pair.lat_a, pair.lon_a), (-90.0, 180.0));
    assert_eq!(pair.values_a[TEMPERATURE], 10.0005);
    assert_eq!(pair.values_b[TEMPERATURE], 10.0);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_no_symmetric_duplicates() {
    let set = antipodally_symmetric_grid(5.0);
    let report = default_matcher().find_matches(&set).unwrap();
    assert!(!report.is_empty());

    let mut seen = HashSet::new();
    for pair in &report.pairs {
        assert!(pair.key_a() < pair.key_b());
        assert!(seen.insert((pair.key_a(), pair.key_b())));
        assert!(!seen.contains(&(pair.key_b(), pair.key_a())));
    }
}

#[test]
fn test_side_b_recomputes_from_side_a_at_key_resolution() {
    let set = antipodally_symmetric_grid(5.0);
    let report = default_matcher().find_matches(&set).unwrap();

    for pair in &report.pairs {
        assert_eq!(pair.key_a().antipode(), pair.key_b());
        assert_eq!(CellKey::new(-pair.lat_a, (pair.lon_a + 180.0) % 360.0), pair.key_b());
    }
}

#[test]
fn test_fractional_longitudes_report_stored_side_b() {
    let set = GridSampleSet::new(
        "t",
        vec![
            GridSample::new(-10.0, 180.1)
                .with_value(TEMPERATURE, 280.0)
                .with_value(PRESSURE, 100_000.0),
            GridSample::new(10.0, 0.1)
                .with_value(TEMPERATURE, 280.0)
                .with_value(PRESSURE, 100_000.0),
        ],
    )
    .unwrap();
    let report = default_matcher().find_matches(&set).unwrap();
    assert_eq!(report.len(), 1);

    let pair = &report.pairs[0];
    assert_eq!((pair.lat_a, pair.lon_a), (-10.0, 180.1));
    // B carries its own coordinates, not the float recomputed from A
    assert_eq!((pair.lat_b, pair.lon_b), (10.0, 0.1));
    assert_ne!((pair.lon_a + 180.0) % 360.0, pair.lon_b);
    assert_eq!(CellKey::new(-pair.lat_a, (pair.lon_a + 180.0) % 360.0), pair.key_b());
}

#[test]
fn test_every_mirrored_cell_matches_on_symmetric_field() {
    // 18 rows from -90 to 80; the -90 row has no mirror
    let set = antipodally_symmetric_grid(10.0);
    let report = default_matcher().find_matches(&set).unwrap();
    assert_eq!(report.len(), 17 * 36 / 2);
    assert_eq!(report.unpaired, 36);
}

#[test]
fn test_matching_is_idempotent() {
    let set = weather_like_grid(2.0);
    let matcher = default_matcher();
    let first = matcher.find_matches(&set).unwrap();
    let second = matcher.find_matches(&set).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_pairs_sorted_by_side_a() {
    let set = antipodally_symmetric_grid(10.0);
    let report = default_matcher().find_matches(&set).unwrap();
    let keys: Vec<CellKey> = report.pairs.iter().map(|p| p.key_a()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

// ============================================================================
// Configuration and edge cases
// ============================================================================

#[test]
fn test_empty_set_returns_empty_report() {
    let set = GridSampleSet::new("empty", Vec::new()).unwrap();
    let report = default_matcher().find_matches(&set).unwrap();
    assert!(report.is_empty());
    assert_eq!(report.compared, 0);
}

#[test]
fn test_absent_variable_is_configuration_error() {
    let set = scenario_grid(10.0, 10.0);
    let matcher = AntipodeMatcher::new(
        MatchConfig::default().with_variables([TEMPERATURE, "relative_humidity"]),
    )
    .unwrap();
    let err = matcher.find_matches(&set).unwrap_err();
    assert!(matches!(err, GeoError::Configuration(_)));
    assert!(err.to_string().contains("relative_humidity"));
}

#[test]
fn test_invalid_tolerance_rejected_at_construction() {
    let err = AntipodeMatcher::new(MatchConfig::default().with_tolerance(-1.0)).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_single_variable_match() {
    // pressures differ wildly, temperature alone matches
    let set = GridSampleSet::new(
        "t",
        vec![
            GridSample::new(30.0, 45.0)
                .with_value(TEMPERATURE, 12.0)
                .with_value(PRESSURE, 0.5),
            GridSample::new(-30.0, 225.0)
                .with_value(TEMPERATURE, 12.0)
                .with_value(PRESSURE, 1.5),
        ],
    )
    .unwrap();

    assert!(default_matcher().find_matches(&set).unwrap().is_empty());

    let temp_only =
        AntipodeMatcher::new(MatchConfig::default().with_variables([TEMPERATURE])).unwrap();
    let report = temp_only.find_matches(&set).unwrap();
    assert_eq!(report.len(), 1);
    assert!(!report.pairs[0].values_a.contains_key(PRESSURE));
}

#[test]
fn test_absolute_mode_handles_zero_values() {
    let set = GridSampleSet::new(
        "t",
        vec![
            GridSample::new(0.0, 0.0).with_value(TEMPERATURE, 0.0),
            GridSample::new(0.0, 180.0).with_value(TEMPERATURE, 0.0004),
        ],
    )
    .unwrap();

    let relative =
        AntipodeMatcher::new(MatchConfig::default().with_variables([TEMPERATURE])).unwrap();
    let report = relative.find_matches(&set).unwrap();
    assert!(report.is_empty());
    assert_eq!(report.near_zero_skipped, 1);

    let absolute = AntipodeMatcher::new(
        MatchConfig::default()
            .with_variables([TEMPERATURE])
            .with_mode(ToleranceMode::Absolute),
    )
    .unwrap();
    assert_eq!(absolute.find_matches(&set).unwrap().len(), 1);
}

#[test]
fn test_longitudes_given_in_signed_form_still_pair() {
    let set = GridSampleSet::new(
        "t",
        vec![
            GridSample::new(20.0, -90.0).with_value(TEMPERATURE, 5.0),
            GridSample::new(-20.0, 90.0).with_value(TEMPERATURE, 5.0),
        ],
    )
    .unwrap();
    let matcher =
        AntipodeMatcher::new(MatchConfig::default().with_variables([TEMPERATURE])).unwrap();
    let report = matcher.find_matches(&set).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report.pairs[0].lon_b, 270.0);
}

#[test]
fn test_pair_serializes_camel_case() {
    let set = scenario_grid(10.0, 10.0005);
    let report = default_matcher().find_matches(&set).unwrap();
    let json = serde_json::to_value(&report.pairs[0]).unwrap();
    for field in ["latA", "lonA", "valuesA", "latB", "lonB", "valuesB"] {
        assert!(json.get(field).is_some(), "missing {}", field);
    }
}
