//! Antipodal weather symmetry renderer.
//!
//! ```text
//! GridSource ─────► GridSampleSet ─┬─► AntipodeMatcher ──────────────► matches
//!                                  └─► RasterProjector (per layer) ─┐
//! GeometrySource ─► OverlayRenderer ──────────────► composite() ◄───┘
//!                                                      │
//!                                                      ▼
//!                                          PNG data URLs ──► RenderPayload
//! ```

pub mod config;
pub mod payload;
pub mod pipeline;

pub use config::{ConfigOverrides, LayerConfig, RenderConfig};
pub use payload::{png_data_url, RenderPayload};
pub use pipeline::RenderPipeline;
