//! Sequential colormaps for heatmap cells.

use crate::error::{ReportError, Result};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// Named sequential colormap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Colormap {
    #[default]
    GnBu,
    Blues,
    #[serde(rename = "viridis")]
    Viridis,
    #[serde(rename = "magma")]
    Magma,
}

// Nine evenly spaced anchors per map, low to high.
const GNBU: [u32; 9] = [
    0xf7fcf0, 0xe0f3db, 0xccebc5, 0xa8ddb5, 0x7bccc4, 0x4eb3d3, 0x2b8cbe, 0x0868ac, 0x084081,
];
const BLUES: [u32; 9] = [
    0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c, 0x08306b,
];
const VIRIDIS: [u32; 9] = [
    0x440154, 0x472d7b, 0x3b528b, 0x2c728e, 0x21918c, 0x28ae80, 0x5ec962, 0xaddc30, 0xfde725,
];
const MAGMA: [u32; 9] = [
    0x000004, 0x1c1044, 0x4f127b, 0x812581, 0xb5367a, 0xe55964, 0xfb8761, 0xfec287, 0xfcfdbf,
];

impl Colormap {
    pub const ALL: &'static [Colormap] = &[
        Colormap::GnBu,
        Colormap::Blues,
        Colormap::Viridis,
        Colormap::Magma,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Colormap::GnBu => "GnBu",
            Colormap::Blues => "Blues",
            Colormap::Viridis => "viridis",
            Colormap::Magma => "magma",
        }
    }

    /// Look up a colormap by its matplotlib name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| ReportError::UnknownColormap {
                name: name.to_string(),
                available: Self::ALL
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    fn anchors(&self) -> &'static [u32; 9] {
        match self {
            Colormap::GnBu => &GNBU,
            Colormap::Blues => &BLUES,
            Colormap::Viridis => &VIRIDIS,
            Colormap::Magma => &MAGMA,
        }
    }

    /// Colour at position `t` in [0, 1]; values outside are clamped.
    pub fn color(&self, t: f64) -> RGBColor {
        let anchors = self.anchors();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (anchors.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(anchors.len() - 1);
        let frac = pos - lo as f64;
        let (r0, g0, b0) = split(anchors[lo]);
        let (r1, g1, b1) = split(anchors[hi]);
        RGBColor(lerp(r0, r1, frac), lerp(g0, g1, frac), lerp(b0, b1, frac))
    }

    /// Colour for `value` scaled linearly between `vmin` and `vmax`.
    pub fn color_in(&self, value: f64, vmin: f64, vmax: f64) -> RGBColor {
        let span = vmax - vmin;
        let t = if span > 0.0 { (value - vmin) / span } else { 0.5 };
        self.color(t)
    }
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn split(hex: u32) -> (u8, u8, u8) {
    (((hex >> 16) & 0xff) as u8, ((hex >> 8) & 0xff) as u8, (hex & 0xff) as u8)
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
}

/// Black or white, whichever reads better on `background`.
pub fn annotation_color(background: RGBColor) -> RGBColor {
    let RGBColor(r, g, b) = background;
    let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    if luminance > 140.0 {
        RGBColor(0, 0, 0)
    } else {
        RGBColor(255, 255, 255)
    }
}
