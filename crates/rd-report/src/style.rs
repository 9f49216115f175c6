//! Named style sheets.
//!
//! A style sheet adjusts a few fields of [`Style`]. Sheets are applied in
//! sequence, so later sheets override earlier ones.

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Every accepted style sheet name.
pub const STYLE_NAMES: &[&str] = &["paper", "heatmap", "heatmap-2col", "tex", "presentation"];

/// Visual parameters shared by all figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Canvas size in pixels.
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    /// Axis label size.
    pub font_size: u32,
    /// Tick label size.
    pub tick_size: u32,
    /// Cell annotation size.
    pub annot_size: u32,
    pub line_width: u32,
    /// Draw thin separators between heatmap cells.
    pub cell_borders: bool,
    /// Render labels with a serif font, as TeX would.
    pub tex: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            font_family: "sans-serif".to_string(),
            font_size: 14,
            tick_size: 12,
            annot_size: 12,
            line_width: 2,
            cell_borders: false,
            tex: false,
        }
    }
}

impl Style {
    /// Apply one named style sheet.
    pub fn apply(&mut self, name: &str) -> Result<()> {
        match name {
            "paper" => {
                self.width = 576;
                self.height = 432;
                self.font_size = 11;
                self.tick_size = 10;
                self.annot_size = 10;
                self.line_width = 1;
            }
            "heatmap" => {
                self.height = self.width * 4 / 5;
                self.cell_borders = true;
            }
            "heatmap-2col" => {
                self.width = 326;
                self.height = 260;
                self.font_size = 9;
                self.tick_size = 8;
                self.annot_size = 7;
            }
            "tex" => {
                self.font_family = "serif".to_string();
                self.tex = true;
            }
            "presentation" => {
                self.width = 960;
                self.height = 720;
                self.font_size = 20;
                self.tick_size = 18;
                self.annot_size = 16;
                self.line_width = 3;
            }
            other => {
                return Err(ReportError::UnknownStyle {
                    name: other.to_string(),
                    available: STYLE_NAMES.join(", "),
                })
            }
        }
        debug!(style = name, "Applied style sheet");
        Ok(())
    }
}

/// Default style with `names` applied in sequence.
pub fn apply_styles<S: AsRef<str>>(names: &[S]) -> Result<Style> {
    let mut style = Style::default();
    for name in names {
        style.apply(name.as_ref())?;
    }
    Ok(style)
}
