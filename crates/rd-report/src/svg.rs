//! SVG drawing with plotters.
//!
//! Heatmaps are laid out directly in pixel coordinates on the root drawing
//! area so that cell, tick and colour bar geometry stay under our control.
//! Line plots go through a regular cartesian chart.

use crate::colormap::annotation_color;
use crate::error::{ReportError, Result};
use crate::figure::{HeatmapFigure, LineFigure};
use crate::style::Style;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use tracing::debug;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Colour bar resolution.
const CBAR_STEPS: usize = 64;
const CBAR_TICKS: usize = 5;

/// Rough glyph width relative to font size, for layout only.
const GLYPH_WIDTH: f64 = 0.6;
const LINE_HEIGHT: f64 = 1.2;

fn text_width(text: &str, size: u32) -> i32 {
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    (longest as f64 * size as f64 * GLYPH_WIDTH).ceil() as i32
}

fn line_count(text: &str) -> usize {
    text.lines().count().max(1)
}

fn font<'a>(style: &'a Style, size: u32) -> FontDesc<'a> {
    (style.font_family.as_str(), size as f64).into_font()
}

/// Draw possibly multi-line `text` centred on `(x, y)`.
fn draw_centered(
    area: &Area<'_>,
    text: &str,
    (x, y): (i32, i32),
    style: &Style,
    size: u32,
    color: &RGBColor,
) -> Result<()> {
    let lines: Vec<&str> = text.lines().collect();
    let step = (size as f64 * LINE_HEIGHT) as i32;
    let first = y - step * (lines.len() as i32 - 1) / 2;
    let text_style = font(style, size)
        .color(color)
        .pos(Pos::new(HPos::Center, VPos::Center));
    for (i, line) in lines.iter().enumerate() {
        area.draw(&Text::new(
            line.to_string(),
            (x, first + step * i as i32),
            text_style.clone(),
        ))
        .map_err(ReportError::draw)?;
    }
    Ok(())
}

/// Draw possibly multi-line `text` right-aligned at `x`, centred on `y`.
fn draw_right_aligned(
    area: &Area<'_>,
    text: &str,
    (x, y): (i32, i32),
    style: &Style,
    size: u32,
) -> Result<()> {
    let lines: Vec<&str> = text.lines().collect();
    let step = (size as f64 * LINE_HEIGHT) as i32;
    let first = y - step * (lines.len() as i32 - 1) / 2;
    let text_style = font(style, size)
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    for (i, line) in lines.iter().enumerate() {
        area.draw(&Text::new(
            line.to_string(),
            (x, first + step * i as i32),
            text_style.clone(),
        ))
        .map_err(ReportError::draw)?;
    }
    Ok(())
}

fn draw_rotated(
    area: &Area<'_>,
    text: &str,
    at: (i32, i32),
    style: &Style,
    transform: FontTransform,
) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    let text_style = font(style, style.font_size)
        .transform(transform)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(text.to_string(), at, text_style))
        .map_err(ReportError::draw)
}

fn format_tick(v: f64) -> String {
    let a = v.abs();
    if a != 0.0 && !(1e-2..1e3).contains(&a) {
        format!("{:.1e}", v)
    } else {
        format!("{:.2}", v)
    }
}

fn draw_no_data(root: &Area<'_>, style: &Style) -> Result<()> {
    draw_centered(
        root,
        "No data",
        (style.width as i32 / 2, style.height as i32 / 2),
        style,
        style.font_size,
        &BLACK,
    )
}

/// Pixel geometry of a heatmap.
struct HeatmapLayout {
    left: i32,
    top: i32,
    plot_w: i32,
    plot_h: i32,
    cbar_x: i32,
    cbar_w: i32,
}

impl HeatmapLayout {
    fn compute(fig: &HeatmapFigure) -> Self {
        let style = &fig.style;
        let (w, h) = (style.width as i32, style.height as i32);
        let pad = 8;

        let top = pad * 2;
        let ytick_w = fig
            .row_ticks
            .iter()
            .map(|t| text_width(t, style.tick_size))
            .max()
            .unwrap_or(0);
        let xtick_lines = fig.col_ticks.iter().map(|t| line_count(t)).max().unwrap_or(1);
        let axis_label = (style.font_size as f64 * 1.8) as i32;

        let left = axis_label + ytick_w + pad;
        let bottom =
            (xtick_lines as f64 * style.tick_size as f64 * LINE_HEIGHT) as i32 + axis_label + pad;
        let right = ((w as f64) * fig.cbar_fraction) as i32 + pad * 2;

        let plot_w = (w - left - right).max(1);
        let plot_h = (h - top - bottom).max(1);
        let cbar_w = ((right as f64) * 0.25).clamp(6.0, 24.0) as i32;

        Self {
            left,
            top,
            plot_w,
            plot_h,
            cbar_x: left + plot_w + pad * 2,
            cbar_w,
        }
    }

    fn cell_rect(&self, row: usize, col: usize, n_rows: usize, n_cols: usize) -> [(i32, i32); 2] {
        let x0 = self.left + (self.plot_w as f64 * col as f64 / n_cols as f64).round() as i32;
        let x1 = self.left + (self.plot_w as f64 * (col + 1) as f64 / n_cols as f64).round() as i32;
        let y0 = self.top + (self.plot_h as f64 * row as f64 / n_rows as f64).round() as i32;
        let y1 = self.top + (self.plot_h as f64 * (row + 1) as f64 / n_rows as f64).round() as i32;
        [(x0, y0), (x1, y1)]
    }
}

/// Render an annotated heatmap to an SVG string.
pub fn render_heatmap(fig: &HeatmapFigure) -> Result<String> {
    let style = &fig.style;
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (style.width, style.height)).into_drawing_area();
        root.fill(&WHITE).map_err(ReportError::draw)?;

        let (n_rows, n_cols) = (fig.n_rows(), fig.n_cols());
        if n_rows == 0 || n_cols == 0 {
            draw_no_data(&root, style)?;
            root.present().map_err(ReportError::draw)?;
            drop(root);
            return Ok(buf);
        }

        let layout = HeatmapLayout::compute(fig);

        for row in 0..n_rows {
            for col in 0..n_cols {
                let Some(cell) = fig.cell(row, col) else {
                    continue;
                };
                let rect = layout.cell_rect(row, col, n_rows, n_cols);
                let center = ((rect[0].0 + rect[1].0) / 2, (rect[0].1 + rect[1].1) / 2);
                let text_color = if cell.value.is_finite() {
                    let color = fig.cmap.color_in(cell.value, fig.vmin, fig.vmax);
                    root.draw(&Rectangle::new(rect, color.filled()))
                        .map_err(ReportError::draw)?;
                    annotation_color(color)
                } else {
                    BLACK
                };
                if style.cell_borders {
                    root.draw(&Rectangle::new(rect, WHITE.stroke_width(1)))
                        .map_err(ReportError::draw)?;
                }
                draw_centered(&root, &cell.annotation, center, style, style.annot_size, &text_color)?;
            }
        }

        // Ticks.
        let tick_gap = 4;
        for (row, label) in fig.row_ticks.iter().enumerate() {
            let rect = layout.cell_rect(row, 0, n_rows, n_cols);
            let y = (rect[0].1 + rect[1].1) / 2;
            draw_right_aligned(&root, label, (layout.left - tick_gap, y), style, style.tick_size)?;
        }
        let xtick_lines = fig.col_ticks.iter().map(|t| line_count(t)).max().unwrap_or(1);
        let xtick_h = (xtick_lines as f64 * style.tick_size as f64 * LINE_HEIGHT) as i32;
        for (col, label) in fig.col_ticks.iter().enumerate() {
            let rect = layout.cell_rect(0, col, n_rows, n_cols);
            let x = (rect[0].0 + rect[1].0) / 2;
            let y = layout.top + layout.plot_h + tick_gap + xtick_h / 2;
            draw_centered(&root, label, (x, y), style, style.tick_size, &BLACK)?;
        }

        // Axis labels.
        let x_label_y = layout.top + layout.plot_h + tick_gap + xtick_h + style.font_size as i32;
        draw_centered(
            &root,
            &fig.x_label,
            (layout.left + layout.plot_w / 2, x_label_y),
            style,
            style.font_size,
            &BLACK,
        )?;
        draw_rotated(
            &root,
            &fig.y_label,
            (style.font_size as i32, layout.top + layout.plot_h / 2),
            style,
            FontTransform::Rotate270,
        )?;

        draw_colorbar(&root, fig, &layout)?;
        root.present().map_err(ReportError::draw)?;
    }
    debug!(
        rows = fig.n_rows(),
        cols = fig.n_cols(),
        bytes = buf.len(),
        "Rendered heatmap"
    );
    Ok(buf)
}

fn draw_colorbar(root: &Area<'_>, fig: &HeatmapFigure, layout: &HeatmapLayout) -> Result<()> {
    let style = &fig.style;
    let (x0, x1) = (layout.cbar_x, layout.cbar_x + layout.cbar_w);
    let (top, height) = (layout.top, layout.plot_h);

    for step in 0..CBAR_STEPS {
        // Top of the bar is vmax.
        let t = 1.0 - (step as f64 + 0.5) / CBAR_STEPS as f64;
        let y0 = top + (height as f64 * step as f64 / CBAR_STEPS as f64).round() as i32;
        let y1 = top + (height as f64 * (step + 1) as f64 / CBAR_STEPS as f64).round() as i32;
        root.draw(&Rectangle::new([(x0, y0), (x1, y1)], fig.cmap.color(t).filled()))
            .map_err(ReportError::draw)?;
    }
    root.draw(&Rectangle::new([(x0, top), (x1, top + height)], BLACK.stroke_width(1)))
        .map_err(ReportError::draw)?;

    let tick_style = font(style, style.tick_size)
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    let mut widest = 0;
    for i in 0..CBAR_TICKS {
        let frac = i as f64 / (CBAR_TICKS - 1) as f64;
        let value = fig.vmin + (fig.vmax - fig.vmin) * frac;
        let y = top + height - (height as f64 * frac).round() as i32;
        let label = format_tick(value);
        widest = widest.max(text_width(&label, style.tick_size));
        root.draw(&PathElement::new(vec![(x1, y), (x1 + 3, y)], BLACK.stroke_width(1)))
            .map_err(ReportError::draw)?;
        root.draw(&Text::new(label, (x1 + 5, y), tick_style.clone()))
            .map_err(ReportError::draw)?;
    }

    let label_x = (x1 + 5 + widest + style.font_size as i32).min(style.width as i32 - style.font_size as i32 / 2);
    draw_rotated(
        root,
        &fig.colorbar_label,
        (label_x, top + height / 2),
        style,
        FontTransform::Rotate90,
    )
}

/// Render a line plot with a legend to an SVG string.
pub fn render_line(fig: &LineFigure) -> Result<String> {
    let style = &fig.style;
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (style.width, style.height)).into_drawing_area();
        root.fill(&WHITE).map_err(ReportError::draw)?;

        if fig.series.iter().all(|s| s.points.is_empty()) {
            draw_no_data(&root, style)?;
            root.present().map_err(ReportError::draw)?;
            drop(root);
            return Ok(buf);
        }

        let ((x0, x1), (y0, y1)) = fig.bounds();
        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(10)
            .x_label_area_size((style.font_size * 3) as i32)
            .y_label_area_size((style.font_size * 4) as i32);
        let mut chart = builder
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(ReportError::draw)?;

        chart
            .configure_mesh()
            .x_desc(fig.x_label.as_str())
            .y_desc(fig.y_label.as_str())
            .label_style(font(style, style.tick_size))
            .axis_desc_style(font(style, style.font_size))
            .draw()
            .map_err(ReportError::draw)?;

        for series in &fig.series {
            let color = Palette99::pick(series.color_index).to_rgba();
            let line_style = color.stroke_width(style.line_width);
            chart
                .draw_series(LineSeries::new(series.points.iter().copied(), line_style))
                .map_err(ReportError::draw)?
                .label(series.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
            if series.markers {
                chart
                    .draw_series(
                        series
                            .points
                            .iter()
                            .map(|&p| Circle::new(p, 3, color.filled())),
                    )
                    .map_err(ReportError::draw)?;
            }
        }

        chart
            .configure_series_labels()
            .label_font(font(style, style.tick_size))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(ReportError::draw)?;

        root.present().map_err(ReportError::draw)?;
    }
    debug!(series = fig.series.len(), bytes = buf.len(), "Rendered line plot");
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::Colormap;
    use crate::figure::LineSeriesData;

    fn ticks(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn heatmap_svg_contains_annotations_and_labels() {
        let fig = HeatmapFigure::new(
            ticks(&["Sparse", "Dense"]),
            ticks(&["Sparse", "Dense"]),
            vec![
                Some((0.0, "0.00e0".into())),
                Some((1.5, "1.50e0".into())),
                None,
                Some((0.25, "2.50e-1".into())),
            ],
            Colormap::GnBu,
            Style::default(),
        )
        .unwrap()
        .with_axis_labels("Target R_T", "Source R_S")
        .with_colorbar_label("D(R_S,R_T)");
        let svg = render_heatmap(&fig).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("1.50e0"));
        assert!(svg.contains("2.50e-1"));
        assert!(svg.contains("Target R_T"));
        assert!(svg.contains("Source R_S"));
        assert!(svg.contains("D(R_S,R_T)"));
    }

    #[test]
    fn empty_heatmap_says_no_data() {
        let fig =
            HeatmapFigure::new(vec![], vec![], vec![], Colormap::Blues, Style::default()).unwrap();
        let svg = render_heatmap(&fig).unwrap();
        assert!(svg.contains("No data"));
    }

    #[test]
    fn multiline_ticks_are_split() {
        let fig = HeatmapFigure::new(
            ticks(&["Dense\nNo Ctrl"]),
            ticks(&["x"]),
            vec![Some((1.0, "1.0e0".into()))],
            Colormap::Magma,
            Style::default(),
        )
        .unwrap();
        let svg = render_heatmap(&fig).unwrap();
        assert!(svg.contains("No Ctrl"));
        assert!(!svg.contains("Dense\nNo Ctrl"));
    }

    #[test]
    fn line_svg_has_legend_entries() {
        let mut fig = LineFigure::new("Reward Noise", "Distance", Style::default());
        fig.push(LineSeriesData {
            label: "Intrinsic, potential 0".into(),
            points: vec![(0.0, 0.0), (0.5, 0.2), (1.0, 0.4)],
            color_index: 0,
            markers: false,
        });
        fig.push(LineSeriesData {
            label: "Shaping, potential 0".into(),
            points: vec![(0.0, 0.1), (0.5, 0.15), (1.0, 0.3)],
            color_index: 0,
            markers: true,
        });
        let svg = render_line(&fig).unwrap();
        assert!(svg.contains("Intrinsic, potential 0"));
        assert!(svg.contains("Reward Noise"));
    }

    #[test]
    fn tick_format_switches_to_scientific() {
        assert_eq!(format_tick(0.5), "0.50");
        assert_eq!(format_tick(0.0), "0.00");
        assert_eq!(format_tick(12345.0), "1.2e4");
        assert_eq!(format_tick(-0.001), "-1.0e-3");
    }
}
