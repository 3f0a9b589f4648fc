//! Coordinate transformations between geographic and pixel space.
//!
//! Plate carrée (equirectangular) only. Raster projection and vector overlay
//! both go through [`Equirectangular`], so a coastline vertex and the grid
//! cell beneath it land on the same pixel.

pub mod equirectangular;

pub use equirectangular::{recenter_lon, Equirectangular};
