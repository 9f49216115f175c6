//! Plot configuration types.
//!
//! A configuration file is a JSON object whose fields all have defaults,
//! so partial files only override what they name.

use crate::kind::DivergenceKind;
use crate::validate::ValidationError;
use rd_common::FigureFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete configuration for a divergence plotting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub schema_version: String,

    /// Discount rate of the gridworld MDP.
    pub discount: f64,

    pub kind: DivergenceKind,

    /// Alternating-minimization rounds for EPIC-based kinds.
    pub n_iter: usize,

    /// If set, only these catalog entries are compared, in this order.
    pub reward_subset: Option<Vec<String>>,

    /// Style sheets applied in sequence.
    pub styles: Vec<String>,

    pub heatmap: HeatmapConfig,

    pub save: SaveConfig,

    /// Root under which the run directory is created.
    pub log_root: Option<PathBuf>,

    /// JSON reward catalog to load instead of the built-in gridworlds.
    pub catalog: Option<PathBuf>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            discount: 0.99,
            kind: DivergenceKind::DirectDivergence,
            n_iter: 1000,
            reward_subset: None,
            styles: ["paper", "heatmap", "heatmap-2col", "tex"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            heatmap: HeatmapConfig::default(),
            save: SaveConfig::default(),
            log_root: None,
            catalog: None,
        }
    }
}

impl PlotConfig {
    /// Load configuration from a file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Whether colours use a log10 scale: explicit setting, else only for
    /// `direct_divergence`.
    pub fn effective_log(&self) -> bool {
        self.heatmap
            .log
            .unwrap_or(self.kind == DivergenceKind::DirectDivergence)
    }

    /// Mask groups to render, defaulting to one unmasked figure named
    /// after the divergence kind.
    pub fn effective_masks(&self) -> Vec<MaskGroup> {
        match &self.heatmap.masks {
            Some(groups) => groups.clone(),
            None => vec![MaskGroup {
                name: self.kind.as_str().to_string(),
                filters: vec![MaskFilter::AlwaysTrue],
            }],
        }
    }
}

/// Options forwarded to the heatmap pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Named groups of filters; one figure is drawn per group.
    pub masks: Option<Vec<MaskGroup>>,

    pub log: Option<bool>,

    /// Divide by the Zero reward's divergence to each target.
    pub normalize: bool,

    /// Clamp colour limits to the 25th and 75th percentiles.
    pub robust: bool,

    /// Explicit order for source and target labels.
    pub order: Option<Vec<String>>,

    pub cmap: String,

    /// Colour bar label template.
    pub label_fstr: Option<String>,

    /// Digits after the point in cell annotations.
    pub precision: usize,

    /// Colour bar width as a fraction of the figure.
    pub cbar_fraction: f64,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            masks: None,
            log: None,
            normalize: false,
            robust: false,
            order: None,
            cmap: "GnBu".to_string(),
            label_fstr: None,
            precision: 2,
            cbar_fraction: 0.15,
        }
    }
}

/// A named set of pair filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskGroup {
    pub name: String,
    pub filters: Vec<MaskFilter>,
}

/// Predicate over (source, target) reward pairs. A cell is shown when
/// any filter in its group matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaskFilter {
    AlwaysTrue,
    /// Source and target are the same reward.
    Same,
    /// The source or the target is the Zero reward.
    Zero,
    /// Source and target match the given regular expressions.
    Matching { source: String, target: String },
}

/// Figure persistence options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    pub fmt: FigureFormat,
}
