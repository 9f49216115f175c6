//! Figure data models.

use crate::colormap::Colormap;
use crate::error::{ReportError, Result};
use crate::style::Style;
use crate::svg;
use serde::Serialize;

/// One visible heatmap cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    /// Value mapped through the colormap. Non-finite values leave the cell
    /// uncoloured but still annotated.
    pub value: f64,
    pub annotation: String,
}

/// Annotated heatmap with a colour bar.
///
/// Cells are row-major; `None` cells are drawn blank with no annotation.
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapFigure {
    pub row_ticks: Vec<String>,
    pub col_ticks: Vec<String>,
    pub x_label: String,
    pub y_label: String,
    pub cells: Vec<Option<HeatmapCell>>,
    pub vmin: f64,
    pub vmax: f64,
    #[serde(skip)]
    pub cmap: Colormap,
    pub colorbar_label: String,
    /// Colour bar width as a fraction of the canvas width.
    pub cbar_fraction: f64,
    #[serde(skip)]
    pub style: Style,
}

impl HeatmapFigure {
    /// Build a heatmap from `(colour value, annotation)` cells. Colour limits
    /// default to the finite range of the values.
    pub fn new(
        row_ticks: Vec<String>,
        col_ticks: Vec<String>,
        cells: Vec<Option<(f64, String)>>,
        cmap: Colormap,
        style: Style,
    ) -> Result<Self> {
        let expected = row_ticks.len() * col_ticks.len();
        if cells.len() != expected {
            return Err(ReportError::InvalidFigure(format!(
                "heatmap has {} rows x {} columns but {} cells",
                row_ticks.len(),
                col_ticks.len(),
                cells.len()
            )));
        }
        let cells: Vec<Option<HeatmapCell>> = cells
            .into_iter()
            .map(|c| c.map(|(value, annotation)| HeatmapCell { value, annotation }))
            .collect();

        let (vmin, vmax) = cells
            .iter()
            .flatten()
            .map(|c| c.value)
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or((0.0, 1.0));

        Ok(Self {
            row_ticks,
            col_ticks,
            x_label: String::new(),
            y_label: String::new(),
            cells,
            vmin,
            vmax,
            cmap,
            colorbar_label: String::new(),
            cbar_fraction: 0.15,
            style,
        })
    }

    pub fn with_axis_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = x.into();
        self.y_label = y.into();
        self
    }

    pub fn with_limits(mut self, vmin: f64, vmax: f64) -> Self {
        self.vmin = vmin;
        self.vmax = vmax;
        self
    }

    pub fn with_colorbar_label(mut self, label: impl Into<String>) -> Self {
        self.colorbar_label = label.into();
        self
    }

    pub fn with_cbar_fraction(mut self, fraction: f64) -> Self {
        self.cbar_fraction = fraction;
        self
    }

    pub fn n_rows(&self) -> usize {
        self.row_ticks.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_ticks.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&HeatmapCell> {
        self.cells
            .get(row * self.col_ticks.len() + col)
            .and_then(|c| c.as_ref())
    }
}

/// One line of a [`LineFigure`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeriesData {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    /// Palette index; series sharing a hue share an index.
    pub color_index: usize,
    /// Mark each point with a dot.
    pub markers: bool,
}

/// Line plot with a legend.
#[derive(Debug, Clone, Serialize)]
pub struct LineFigure {
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<LineSeriesData>,
    #[serde(skip)]
    pub style: Style,
}

impl LineFigure {
    pub fn new(x_label: impl Into<String>, y_label: impl Into<String>, style: Style) -> Self {
        Self {
            x_label: x_label.into(),
            y_label: y_label.into(),
            series: Vec::new(),
            style,
        }
    }

    pub fn push(&mut self, series: LineSeriesData) {
        self.series.push(series);
    }

    /// Bounding box of every point, padded when degenerate.
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let pts = self.series.iter().flat_map(|s| s.points.iter());
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for &(px, py) in pts.filter(|(px, py)| px.is_finite() && py.is_finite()) {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }
        (pad(x), pad(y))
    }
}

fn pad((lo, hi): (f64, f64)) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        (0.0, 1.0)
    } else if hi - lo <= f64::EPSILON {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

/// Any renderable figure.
#[derive(Debug, Clone)]
pub enum Figure {
    Heatmap(HeatmapFigure),
    Line(LineFigure),
}

impl Figure {
    /// Draw the figure to an SVG document.
    pub fn render_svg(&self) -> Result<String> {
        match self {
            Figure::Heatmap(fig) => svg::render_heatmap(fig),
            Figure::Line(fig) => svg::render_line(fig),
        }
    }
}
