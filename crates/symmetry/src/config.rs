//! Configuration for antipode matching.

use geo_common::{GeoError, GeoResult, PRESSURE, TEMPERATURE};
use serde::{Deserialize, Serialize};

/// Default relative tolerance.
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Side-A magnitudes at or below this are treated as zero: a relative
/// difference against them is undefined, so the pair is excluded.
pub const NEAR_ZERO: f64 = 1e-12;

/// How two values are compared against the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToleranceMode {
    /// `|a - b| / |a| < ε`, relative to side A only.
    #[default]
    RelativeToA,
    /// `|a - b| / max(|a|, |b|) < ε`, independent of pair orientation.
    Symmetric,
    /// `|a - b| < ε`.
    Absolute,
}

/// Outcome of comparing one variable across a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToleranceCheck {
    Pass,
    Fail,
    /// The divisor was too close to zero for a relative comparison.
    NearZero,
}

impl ToleranceMode {
    pub fn check(self, a: f64, b: f64, tolerance: f64) -> ToleranceCheck {
        let diff = (a - b).abs();
        let scaled = match self {
            ToleranceMode::RelativeToA => {
                if a.abs() <= NEAR_ZERO {
                    return ToleranceCheck::NearZero;
                }
                diff / a.abs()
            }
            ToleranceMode::Symmetric => {
                let denom = a.abs().max(b.abs());
                if denom <= NEAR_ZERO {
                    return ToleranceCheck::NearZero;
                }
                diff / denom
            }
            ToleranceMode::Absolute => diff,
        };

        if scaled < tolerance {
            ToleranceCheck::Pass
        } else {
            ToleranceCheck::Fail
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "relative_to_a" | "relative" => Some(Self::RelativeToA),
            "symmetric" => Some(Self::Symmetric),
            "absolute" => Some(Self::Absolute),
            _ => None,
        }
    }
}

/// Parameters for [`crate::AntipodeMatcher`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Tolerance ε; relative or absolute depending on `mode`.
    pub tolerance: f64,
    /// Variables that must all agree for a pair to match.
    pub variables: Vec<String>,
    #[serde(default)]
    pub mode: ToleranceMode,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            variables: vec![TEMPERATURE.to_string(), PRESSURE.to_string()],
            mode: ToleranceMode::RelativeToA,
        }
    }
}

impl MatchConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mode(mut self, mode: ToleranceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> GeoResult<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(GeoError::configuration(format!(
                "match tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        if self.variables.is_empty() {
            return Err(GeoError::configuration(
                "at least one variable is required for matching",
            ));
        }
        Ok(())
    }
}
