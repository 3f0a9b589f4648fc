//! Antipodal symmetry detection.
//!
//! Finds pairs of grid cells on opposite sides of the sphere whose values
//! agree, within a tolerance, on every requested variable.
//!
//! # Architecture
//!
//! ```text
//! GridSampleSet
//!      │
//!      ▼
//! AntipodeMatcher::find_matches(set)
//!      │
//!      ├─► Check requested variables exist (ConfigurationError otherwise)
//!      │
//!      ├─► For each cell A: antipode key (-lat, lon+180 mod 360)
//!      │         │
//!      │         └─► O(1) lookup of B in the set's CellKey index
//!      │
//!      ├─► Keep only key(A) < key(B), so each {A, B} is emitted once
//!      │
//!      └─► Tolerance check per variable (ToleranceMode)
//!               │
//!               ▼
//!          MatchReport { pairs, counters }
//! ```

pub mod config;
pub mod matcher;

pub use config::{MatchConfig, ToleranceCheck, ToleranceMode, DEFAULT_TOLERANCE, NEAR_ZERO};
pub use matcher::{AntipodeMatcher, AntipodePair, MatchReport};
