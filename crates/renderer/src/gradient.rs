//! Color scales for gridded fields.
//!
//! Each scale is a list of evenly spaced stops; a normalized value in
//! `[0, 1]` is mapped by linear interpolation between the two nearest stops.

use serde::{Deserialize, Serialize};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Parse `#rrggbb` or `#rrggbbaa`.
pub fn hex_to_color(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

    let r = channel(0)?;
    let g = channel(2)?;
    let b = channel(4)?;
    let a = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Color::new(r, g, b, a))
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)).round() as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)).round() as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)).round() as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)).round() as u8,
    )
}

// Diverging red-yellow-blue, listed low (blue) to high (red).
const RD_YL_BU_R: [u32; 11] = [
    0x313695, 0x4575b4, 0x74add1, 0xabd9e9, 0xe0f3f8, 0xffffbf, 0xfee090, 0xfdae61, 0xf46d43,
    0xd73027, 0xa50026,
];

// Perceptually uniform sequential scale, dark purple to yellow.
const VIRIDIS: [u32; 10] = [
    0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58, 0xb5de2b,
    0xfde725,
];

fn rgb(hex: u32) -> Color {
    Color::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255)
}

/// Value-to-color mapping used by the raster projector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScale {
    /// Diverging blue-yellow-red, low values blue. Suited to fields with a
    /// meaningful midpoint such as temperature.
    Diverging,
    /// Sequential viridis. Suited to monotone magnitudes such as pressure.
    #[default]
    Sequential,
}

impl ColorScale {
    pub fn stops(self) -> Vec<Color> {
        match self {
            ColorScale::Diverging => RD_YL_BU_R.iter().copied().map(rgb).collect(),
            ColorScale::Sequential => VIRIDIS.iter().copied().map(rgb).collect(),
        }
    }

    /// Color for a normalized value; inputs outside `[0, 1]` are clamped.
    pub fn color_at(self, normalized: f64) -> Color {
        let stops = self.stops();
        let t = if normalized.is_finite() {
            normalized.clamp(0.0, 1.0)
        } else {
            0.5
        };
        let last = stops.len() - 1;
        let pos = t * last as f64;
        let lower = (pos.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        interpolate_color(stops[lower], stops[upper], (pos - lower as f64) as f32)
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "diverging" | "rdylbu_r" => Some(Self::Diverging),
            "sequential" | "viridis" => Some(Self::Sequential),
            _ => None,
        }
    }
}

/// Finite min/max of `values`, `None` when there are no finite values.
pub fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Scale `value` into `[0, 1]` over `range`. A degenerate range maps to the midpoint.
pub fn normalize(value: f64, (min_val, max_val): (f64, f64)) -> f64 {
    let span = max_val - min_val;
    if span.abs() < f64::EPSILON {
        return 0.5;
    }
    ((value - min_val) / span).clamp(0.0, 1.0)
}
