//! Upstream data acquisition.
//!
//! Provides the two inputs of a render:
//!
//! - a complete [`GridSampleSet`](geo_common::GridSampleSet) of surface
//!   temperature and pressure from the GFS OPeNDAP service
//! - coastline polylines from a Natural Earth GeoJSON file
//!
//! Both sit behind the [`GridSource`] and [`GeometrySource`] traits so the
//! pipeline can run from saved files or in-memory fixtures as well.

pub mod coastline;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gfs;
pub mod source;

// Re-exports
pub use coastline::{parse_geojson, CoastlineSource};
pub use config::{CoastlineConfig, GfsConfig};
pub use error::{IngestionError, Result};
pub use fetch::{HttpFetcher, TextFetcher};
pub use gfs::{build_sample_set, parse_ascii, AsciiGrid, GfsCycle, GfsGridSource};
pub use source::{GeometrySource, GridSource, StaticGeometrySource, StaticGridSource};
