//! Exact-key self-join of a grid against its own antipodes.

use crate::config::{MatchConfig, ToleranceCheck};
use geo_common::{CellKey, GeoError, GeoResult, GridSample, GridSampleSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Two cells on opposite sides of the sphere that agree on every matched variable.
///
/// Side A is the cell with the lexicographically smaller `(lat, lon)` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntipodePair {
    pub lat_a: f64,
    pub lon_a: f64,
    pub values_a: BTreeMap<String, f64>,
    pub lat_b: f64,
    pub lon_b: f64,
    pub values_b: BTreeMap<String, f64>,
}

impl AntipodePair {
    pub fn key_a(&self) -> CellKey {
        CellKey::new(self.lat_a, self.lon_a)
    }

    pub fn key_b(&self) -> CellKey {
        CellKey::new(self.lat_b, self.lon_b)
    }
}

/// Matches plus counters describing what was skipped and why.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchReport {
    /// Matched pairs, sorted by side A's key.
    pub pairs: Vec<AntipodePair>,
    /// Candidate pairs `{A, B}` that were compared.
    pub compared: usize,
    /// Cells whose antipode is not a sampled cell (e.g. cell-centered rows
    /// with no mirror row).
    pub unpaired: usize,
    /// Pairs excluded because a relative comparison had a zero divisor.
    pub near_zero_skipped: usize,
    /// Pairs excluded because a matched variable was missing on either side.
    pub missing_value_skipped: usize,
}

impl MatchReport {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Finds antipodal cell pairs with matching values.
#[derive(Debug, Clone)]
pub struct AntipodeMatcher {
    config: MatchConfig,
}

enum PairOutcome {
    Matched,
    Rejected,
    NearZero,
    MissingValue,
}

impl AntipodeMatcher {
    /// Create a matcher, validating its configuration.
    pub fn new(config: MatchConfig) -> GeoResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Run the self-join over `set`.
    ///
    /// An empty set yields an empty report. A requested variable that no
    /// sample carries is a [`GeoError::Configuration`].
    pub fn find_matches(&self, set: &GridSampleSet) -> GeoResult<MatchReport> {
        let mut report = MatchReport::default();
        if set.is_empty() {
            return Ok(report);
        }

        for name in &self.config.variables {
            if !set.has_variable(name) {
                return Err(GeoError::configuration(format!(
                    "variable '{}' is not present in sample set '{}' (available: {})",
                    name,
                    set.timestamp(),
                    set.variables().collect::<Vec<_>>().join(", ")
                )));
            }
        }

        let mut matched: Vec<(CellKey, AntipodePair)> = Vec::new();

        for sample_a in set.samples() {
            let key_a = sample_a.key();
            let key_b = key_a.antipode();

            let Some(sample_b) = set.get(&key_b) else {
                report.unpaired += 1;
                continue;
            };

            // Each unordered pair is visited twice; keep the visit from the smaller key.
            // Equal keys would be a cell paired with itself.
            if key_a >= key_b {
                continue;
            }

            report.compared += 1;
            match self.compare(sample_a, sample_b) {
                PairOutcome::Matched => {
                    matched.push((key_a, self.build_pair(sample_a, sample_b)));
                }
                PairOutcome::Rejected => {}
                PairOutcome::NearZero => report.near_zero_skipped += 1,
                PairOutcome::MissingValue => report.missing_value_skipped += 1,
            }
        }

        matched.sort_by_key(|(key, _)| *key);
        report.pairs = matched.into_iter().map(|(_, pair)| pair).collect();

        debug!(
            timestamp = set.timestamp(),
            samples = set.len(),
            compared = report.compared,
            matched = report.pairs.len(),
            unpaired = report.unpaired,
            near_zero_skipped = report.near_zero_skipped,
            missing_value_skipped = report.missing_value_skipped,
            "Antipode matching complete"
        );

        Ok(report)
    }

    fn compare(&self, a: &GridSample, b: &GridSample) -> PairOutcome {
        let mut outcome = PairOutcome::Matched;
        for name in &self.config.variables {
            let (Some(va), Some(vb)) = (a.value(name), b.value(name)) else {
                return PairOutcome::MissingValue;
            };
            match self.config.mode.check(va, vb, self.config.tolerance) {
                ToleranceCheck::Pass => {}
                ToleranceCheck::Fail => outcome = PairOutcome::Rejected,
                ToleranceCheck::NearZero => return PairOutcome::NearZero,
            }
        }
        outcome
    }

    fn build_pair(&self, a: &GridSample, b: &GridSample) -> AntipodePair {
        let pick = |sample: &GridSample| -> BTreeMap<String, f64> {
            self.config
                .variables
                .iter()
                .filter_map(|name| sample.value(name).map(|v| (name.clone(), v)))
                .collect()
        };

        AntipodePair {
            lat_a: a.lat,
            lon_a: a.lon,
            values_a: pick(a),
            lat_b: b.lat,
            lon_b: b.lon,
            values_b: pick(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_common::GridSample;

    fn cell(lat: f64, lon: f64, t: f64, p: f64) -> GridSample {
        GridSample::new(lat, lon)
            .with_value("temperature", t)
            .with_value("pressure", p)
    }

    #[test]
    fn test_empty_set_is_not_an_error() {
        let set = GridSampleSet::new("empty", Vec::new()).unwrap();
        let matcher = AntipodeMatcher::new(MatchConfig::default()).unwrap();
        let report = matcher.find_matches(&set).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_equator_pair_emitted_once() {
        let set = GridSampleSet::new(
            "t",
            vec![cell(0.0, 0.0, 15.0, 1.0), cell(0.0, 180.0, 15.0, 1.0)],
        )
        .unwrap();
        let matcher = AntipodeMatcher::new(MatchConfig::default()).unwrap();
        let report = matcher.find_matches(&set).unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report.compared, 1);
        let pair = &report.pairs[0];
        assert_eq!((pair.lat_a, pair.lon_a), (0.0, 0.0));
        assert_eq!((pair.lat_b, pair.lon_b), (0.0, 180.0));
    }

    #[test]
    fn test_near_zero_side_a_excluded() {
        let set = GridSampleSet::new(
            "t",
            vec![cell(-10.0, 0.0, 0.0, 1.0), cell(10.0, 180.0, 0.0, 1.0)],
        )
        .unwrap();
        let matcher = AntipodeMatcher::new(MatchConfig::default()).unwrap();
        let report = matcher.find_matches(&set).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.near_zero_skipped, 1);
    }

    #[test]
    fn test_unknown_variable_is_configuration_error() {
        let set = GridSampleSet::new("t", vec![cell(0.0, 0.0, 1.0, 1.0)]).unwrap();
        let matcher =
            AntipodeMatcher::new(MatchConfig::default().with_variables(["humidity"])).unwrap();
        let err = matcher.find_matches(&set).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_missing_value_on_one_side_skipped() {
        let set = GridSampleSet::new(
            "t",
            vec![
                cell(0.0, 0.0, 15.0, 1.0),
                GridSample::new(0.0, 180.0).with_value("temperature", 15.0),
            ],
        )
        .unwrap();
        let matcher = AntipodeMatcher::new(MatchConfig::default()).unwrap();
        let report = matcher.find_matches(&set).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.missing_value_skipped, 1);
    }

    #[test]
    fn test_unmirrored_rows_are_unpaired() {
        // cell-centered rows at 0.5 and 1.5 have no -0.5 / -1.5 rows
        let set = GridSampleSet::new(
            "t",
            vec![cell(0.5, 0.0, 1.0, 1.0), cell(1.5, 180.0, 1.0, 1.0)],
        )
        .unwrap();
        let matcher = AntipodeMatcher::new(MatchConfig::default()).unwrap();
        let report = matcher.find_matches(&set).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.unpaired, 2);
    }
}
