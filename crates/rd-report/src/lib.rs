//! Figure rendering for reward divergence plots.
//!
//! Figures are plain data models built by the plotting pipeline and drawn
//! to SVG with `plotters`. Each figure can be saved either as a standalone
//! SVG image or as a self-contained HTML page embedding that SVG.
//!
//! # Figures
//!
//! - [`HeatmapFigure`]: annotated cells with a colour bar
//! - [`LineFigure`]: distance against noise, one line per series
//!
//! # Example
//!
//! ```no_run
//! use rd_report::{save_fig, Colormap, Figure, HeatmapFigure, Style};
//! use rd_common::FigureFormat;
//! use std::path::Path;
//!
//! let fig = HeatmapFigure::new(
//!     vec!["Dense".into()],
//!     vec!["Sparse".into()],
//!     vec![Some((0.5, "5.0e-1".to_string()))],
//!     Colormap::GnBu,
//!     Style::default(),
//! )
//! .unwrap();
//! save_fig(Path::new("out/example"), &Figure::Heatmap(fig), FigureFormat::Svg).unwrap();
//! ```

pub mod colormap;
pub mod error;
pub mod figure;
pub mod html;
pub mod save;
pub mod style;
pub mod svg;

pub use colormap::Colormap;
pub use error::{ReportError, Result};
pub use figure::{Figure, HeatmapCell, HeatmapFigure, LineFigure, LineSeriesData};
pub use html::render_html_page;
pub use save::{sanitize_name, save_fig, save_figs};
pub use style::{apply_styles, Style, STYLE_NAMES};
