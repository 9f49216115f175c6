//! Reward divergence configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for plot configuration files
//! - Named presets that layer onto the defaults
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation

pub mod kind;
pub mod plot;
pub mod preset;
pub mod resolve;
pub mod validate;

pub use kind::DivergenceKind;
pub use plot::{HeatmapConfig, MaskFilter, MaskGroup, PlotConfig, SaveConfig};
pub use preset::{apply_preset, config_with_presets, list_presets, PresetName};
pub use resolve::{resolve_config, resolve_output_root, ConfigPath, ConfigSource};
pub use validate::{validate_plot_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
