//! Named configuration presets.
//!
//! Presets are overlays: each one changes a few fields of an existing
//! configuration, so several can be applied in sequence
//! (`--preset paper --preset normalize`).
//! - Default: no changes
//! - Test: small reward subset, no TeX styling
//! - Normalize: divide by the Zero reward's divergence
//! - Paper: appendix figure with a fixed reward order

use crate::plot::PlotConfig;
use crate::validate::ValidationError;
use rd_common::labels::ZERO_REWARD;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    Default,
    Test,
    Normalize,
    Paper,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::Default,
        PresetName::Test,
        PresetName::Normalize,
        PresetName::Paper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Default => "default",
            PresetName::Test => "test",
            PresetName::Normalize => "normalize",
            PresetName::Paper => "paper",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "default" => Some(PresetName::Default),
            "test" | "debug" => Some(PresetName::Test),
            "normalize" | "normalized" => Some(PresetName::Normalize),
            "paper" | "appendix" => Some(PresetName::Paper),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Default => "Built-in defaults",
            PresetName::Test => "Two rewards and no TeX styling, for tests and debugging",
            PresetName::Normalize => "Divide every divergence by the Zero reward's divergence",
            PresetName::Paper => "Paper appendix figure with a fixed reward order",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| ValidationError::UnknownPreset(s.to_string()))
    }
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Apply `preset` on top of `config`.
pub fn apply_preset(config: &mut PlotConfig, preset: PresetName) {
    match preset {
        PresetName::Default => {}
        PresetName::Test => {
            config.styles = names(&["paper", "heatmap", "heatmap-2col"]);
            config.reward_subset = Some(names(&["sparse_goal", "dense_goal"]));
        }
        PresetName::Normalize => {
            config.heatmap.normalize = true;
        }
        PresetName::Paper => {
            let subset = names(&[
                "sparse_goal",
                "transformed_goal",
                "center_goal",
                "sparse_penalty",
                "dirt_path",
                "cliff_walk",
                ZERO_REWARD,
            ]);
            config.heatmap.order = Some(subset.clone());
            config.reward_subset = Some(subset);
            config.heatmap.cbar_fraction = 0.05;
        }
    }
}

/// Default configuration with `presets` applied in order.
pub fn config_with_presets(presets: &[PresetName]) -> PlotConfig {
    let mut config = PlotConfig::default();
    for preset in presets {
        apply_preset(&mut config, *preset);
    }
    config
}

/// List all presets with descriptions.
pub fn list_presets() -> Vec<(PresetName, &'static str)> {
    PresetName::ALL
        .iter()
        .map(|p| (*p, p.description()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_plot_config;

    #[test]
    fn parse_aliases() {
        assert_eq!(PresetName::parse("TEST"), Some(PresetName::Test));
        assert_eq!(PresetName::parse("appendix"), Some(PresetName::Paper));
        assert!("nope".parse::<PresetName>().is_err());
    }

    #[test]
    fn every_preset_is_valid() {
        for preset in PresetName::ALL {
            validate_plot_config(&config_with_presets(&[*preset])).unwrap();
        }
    }

    #[test]
    fn test_preset_drops_tex() {
        let cfg = config_with_presets(&[PresetName::Test]);
        assert!(!cfg.styles.iter().any(|s| s == "tex"));
        assert_eq!(cfg.reward_subset.unwrap().len(), 2);
    }

    #[test]
    fn presets_compose() {
        let cfg = config_with_presets(&[PresetName::Paper, PresetName::Normalize]);
        assert!(cfg.heatmap.normalize);
        assert_eq!(cfg.heatmap.order, cfg.reward_subset);
        assert_eq!(cfg.heatmap.cbar_fraction, 0.05);
    }

    #[test]
    fn list_covers_all() {
        assert_eq!(list_presets().len(), PresetName::ALL.len());
    }
}
