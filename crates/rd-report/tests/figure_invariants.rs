//! Rendered figure invariant tests.
//!
//! These tests validate the generated documents without a browser:
//! - One annotation per visible cell
//! - Hidden cells carry no annotation
//! - HTML pages embed exactly one SVG and the figure data
//! - Saved files land where the caller expects

use rd_common::FigureFormat;
use rd_report::{
    apply_styles, render_html_page, save_figs, Colormap, Figure, HeatmapFigure, LineFigure,
    LineSeriesData,
};
use regex::Regex;

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// 3x3 divergence-like grid with the diagonal hidden.
fn masked_heatmap() -> HeatmapFigure {
    let names = ["Sparse", "Dense", "Penalty"];
    let mut cells = Vec::new();
    for r in 0..3 {
        for c in 0..3 {
            if r == c {
                cells.push(None);
            } else {
                let v = (r * 3 + c) as f64 / 10.0;
                cells.push(Some((v, format!("ann{}{}", r, c))));
            }
        }
    }
    let style = apply_styles(&["paper", "heatmap"]).unwrap();
    HeatmapFigure::new(labels(&names), labels(&names), cells, Colormap::GnBu, style)
        .unwrap()
        .with_axis_labels("Target R_T", "Source R_S")
}

// ============================================================================
// Heatmap Tests
// ============================================================================

#[test]
fn test_each_visible_cell_annotated_once() {
    let svg = Figure::Heatmap(masked_heatmap()).render_svg().unwrap();
    let re = Regex::new(r"ann\d\d").unwrap();
    let found: Vec<&str> = re.find_iter(&svg).map(|m| m.as_str()).collect();
    assert_eq!(found.len(), 6, "found {:?}", found);
}

#[test]
fn test_hidden_cells_not_annotated() {
    let svg = Figure::Heatmap(masked_heatmap()).render_svg().unwrap();
    for i in 0..3 {
        assert!(!svg.contains(&format!("ann{}{}", i, i)));
    }
}

#[test]
fn test_style_sets_canvas_size() {
    let svg = Figure::Heatmap(masked_heatmap()).render_svg().unwrap();
    // paper then heatmap: 576 wide, 4:5 aspect.
    assert!(svg.contains("width=\"576\""));
    assert!(svg.contains("height=\"460\""));
}

// ============================================================================
// HTML Tests
// ============================================================================

#[test]
fn test_html_embeds_single_svg() {
    let page = render_html_page(&Figure::Heatmap(masked_heatmap()), "kl").unwrap();
    let re = Regex::new(r"<svg\b").unwrap();
    assert_eq!(re.find_iter(&page).count(), 1);
    assert!(page.contains("id=\"figure-data\""));
}

#[test]
fn test_html_has_no_external_urls() {
    let page = render_html_page(&Figure::Heatmap(masked_heatmap()), "kl").unwrap();
    let re = Regex::new(r#"(src|href)="https?://"#).unwrap();
    assert!(!re.is_match(&page));
}

// ============================================================================
// Save Tests
// ============================================================================

#[test]
fn test_save_figs_writes_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let heat = Figure::Heatmap(masked_heatmap());
    let mut line = LineFigure::new("Reward Noise", "Distance", Default::default());
    line.push(LineSeriesData {
        label: "Intrinsic".into(),
        points: vec![(0.0, 1.0), (1.0, 2.0)],
        color_index: 1,
        markers: true,
    });
    let line = Figure::Line(line);

    for fmt in [FigureFormat::Svg, FigureFormat::Html] {
        let paths = save_figs(
            dir.path(),
            [("direct_divergence", &heat), ("shaping/comparison", &line)],
            fmt,
        )
        .unwrap();
        for path in &paths {
            assert!(path.exists(), "missing {}", path.display());
            assert_eq!(path.extension().unwrap(), fmt.extension());
            assert_eq!(path.parent().unwrap(), dir.path());
        }
    }
}
