//! Reward Divergence Core Library
//!
//! This library provides:
//! - Gridworld reward constructions and the reward catalog
//! - Pairwise divergence tables over a catalog
//! - Index rewriting, aggregation and ordering of divergence series
//! - Pair masks and the heatmap pipeline
//! - The synthetic shaping comparison
//! - Logging setup and CLI exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod divergence;
pub mod exit_codes;
pub mod gridworld;
pub mod heatmaps;
pub mod logging;
pub mod masks;
pub mod pipeline;
pub mod synthetic;
pub mod transformations;

pub use divergence::{compute_divergence, compute_divergence_with};
pub use gridworld::{RewardCatalog, RewardConfig};
pub use heatmaps::{compact_heatmaps, comparison_heatmap, HeatmapOptions};
pub use masks::{compute_mask, PairPredicate, RewardMask};
