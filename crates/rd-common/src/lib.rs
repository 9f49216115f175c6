//! Reward divergence common types and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - The unified error type with stable codes
//! - Index level names and the Zero reward sentinel
//! - Labeled series and dense heatmap matrices
//! - Number formatting for annotations
//! - Figure output format selection

pub mod error;
pub mod format;
pub mod labels;
pub mod output;
pub mod series;

pub use error::{format_error_human, Error, ErrorCategory, Result};
pub use format::{short_e, short_fmt};
pub use labels::ZERO_REWARD;
pub use output::FigureFormat;
pub use series::{HeatmapMatrix, LabeledSeries};
