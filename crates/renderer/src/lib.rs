//! Image rendering for global grid fields.
//!
//! ```text
//! GridSampleSet ──► RasterProjector ──► Raster (RGBA, row 0 = south)
//!                                          │
//! LineGeometry ───► OverlayRenderer ──► composite() ──► png::encode_raster
//! ```
//!
//! - [`gradient`]: color scales (diverging, sequential)
//! - [`raster`]: re-centering, interpolation and color mapping
//! - [`overlay`]: antimeridian splitting and line compositing
//! - [`png`]: indexed / RGBA PNG encoding

pub mod gradient;
pub mod overlay;
pub mod png;
pub mod raster;

pub use gradient::{Color, ColorScale};
pub use overlay::{composite, split_at_antimeridian, OverlayRenderer, OverlayResult, OverlayStyle, PixelPath};
pub use raster::{InterpolationMethod, NativeGrid, Raster, RasterProjector};
