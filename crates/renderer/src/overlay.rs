//! Vector line overlay: antimeridian splitting, projection and compositing.
//!
//! A polyline whose consecutive vertices are more than 180° of longitude
//! apart really takes the short way round, across the ±180° line. Drawing
//! it as one stroke would smear a line across the whole map, so the line is
//! cut where it meets the antimeridian and continued from the opposite edge.

use crate::gradient::Color;
use crate::raster::Raster;
use geo_common::{GeoError, GeoPoint, GeoResult, LineGeometry};
use projection::{recenter_lon, Equirectangular};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Bring a longitude into `[-180, 180]`, leaving values already in range alone.
pub fn normalize_lon_180(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        recenter_lon(lon)
    }
}

fn push_vertex(piece: &mut Vec<GeoPoint>, p: GeoPoint) {
    if piece.last() != Some(&p) {
        piece.push(p);
    }
}

/// Split a line wherever it crosses the antimeridian.
///
/// Returns the pieces in order and the number of crossings. The piece before
/// a crossing ends exactly on the boundary (`±180`, interpolated latitude) and
/// the next piece starts on the opposite boundary. Pieces with fewer than two
/// distinct vertices are dropped.
pub fn split_at_antimeridian(line: &LineGeometry) -> (Vec<Vec<GeoPoint>>, usize) {
    let mut pieces = Vec::new();
    let mut current: Vec<GeoPoint> = Vec::new();
    let mut crossings = 0;
    let mut prev: Option<GeoPoint> = None;

    for raw in &line.vertices {
        let p = GeoPoint::new(normalize_lon_180(raw.lon), raw.lat);

        if let Some(q) = prev {
            if (p.lon - q.lon).abs() > 180.0 {
                // Unwrap p onto q's side of the boundary and find where the
                // straight segment meets it.
                let (edge, p_unwrapped) = if q.lon > p.lon {
                    (180.0, p.lon + 360.0)
                } else {
                    (-180.0, p.lon - 360.0)
                };
                let span = p_unwrapped - q.lon;
                let t = if span.abs() < f64::EPSILON {
                    0.0
                } else {
                    (edge - q.lon) / span
                };
                let lat = q.lat + t * (p.lat - q.lat);

                push_vertex(&mut current, GeoPoint::new(edge, lat));
                pieces.push(std::mem::take(&mut current));
                push_vertex(&mut current, GeoPoint::new(-edge, lat));
                crossings += 1;
            }
        }

        push_vertex(&mut current, p);
        prev = Some(p);
    }
    pieces.push(current);

    pieces.retain(|piece| piece.len() >= 2);
    (pieces, crossings)
}

/// A projected polyline in raster space (x east, y north, origin lower-left).
#[derive(Debug, Clone, PartialEq)]
pub struct PixelPath {
    pub points: Vec<(f32, f32)>,
}

/// Overlay ready for compositing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayResult {
    pub paths: Vec<PixelPath>,
    /// Input lines that were malformed (fewer than two finite vertices).
    pub skipped: usize,
    /// Antimeridian crossings that caused a split.
    pub splits: usize,
}

impl OverlayResult {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Stroke settings for composited lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 0.8,
        }
    }
}

/// Turns geographic lines into pixel paths aligned with a raster.
#[derive(Debug, Clone, Copy)]
pub struct OverlayRenderer {
    projection: Equirectangular,
}

impl OverlayRenderer {
    pub fn new(projection: Equirectangular) -> Self {
        Self { projection }
    }

    /// Split and project every line. Malformed lines are skipped and counted.
    pub fn render(&self, lines: &[LineGeometry]) -> OverlayResult {
        let mut result = OverlayResult::default();

        for (i, line) in lines.iter().enumerate() {
            if !line.is_drawable() {
                debug!(index = i, vertices = line.len(), "Skipping malformed line");
                result.skipped += 1;
                continue;
            }

            let (pieces, crossings) = split_at_antimeridian(line);
            result.splits += crossings;

            for piece in pieces {
                let points = piece
                    .into_iter()
                    .map(|p| {
                        let (x, y) = self.projection.project(p);
                        (x as f32, y as f32)
                    })
                    .collect();
                result.paths.push(PixelPath { points });
            }
        }

        if result.skipped > 0 {
            warn!(
                skipped = result.skipped,
                total = lines.len(),
                "Some overlay lines were malformed"
            );
        }
        debug!(
            lines = lines.len(),
            paths = result.paths.len(),
            splits = result.splits,
            "Rendered overlay"
        );

        result
    }
}

/// Stroke `overlay` onto `raster` with anti-aliased lines.
pub fn composite(raster: &mut Raster, overlay: &OverlayResult, style: &OverlayStyle) -> GeoResult<()> {
    use tiny_skia::*;

    if overlay.is_empty() {
        return Ok(());
    }

    let width = raster.width();
    let height = raster.height();
    let size = IntSize::from_wh(width as u32, height as u32).ok_or_else(|| {
        GeoError::encoding(format!("cannot create {}x{} canvas", width, height))
    })?;

    // Raster stores straight alpha; tiny-skia expects premultiplied.
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| GeoError::encoding("raster buffer does not match canvas size"))?;
    for (dst, src) in pixmap
        .pixels_mut()
        .iter_mut()
        .zip(raster.to_top_down_rgba().chunks_exact(4))
    {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }

    let mut paint = Paint::default();
    paint.set_color_rgba8(style.color.r, style.color.g, style.color.b, style.color.a);
    paint.anti_alias = true;

    let mut stroke = Stroke::default();
    stroke.width = style.width;
    stroke.line_cap = LineCap::Round;
    stroke.line_join = LineJoin::Round;

    let projection = raster.projection;
    let image_y = |y: f32| projection.to_image_y(f64::from(y)) as f32;
    for path in &overlay.paths {
        let Some((&(x0, y0), rest)) = path.points.split_first() else {
            continue;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(x0, image_y(y0));
        for &(x, y) in rest {
            pb.line_to(x, image_y(y));
        }
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    raster.set_from_top_down_rgba(&rgba)
}
