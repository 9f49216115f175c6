//! End-to-end runs: compute, render and save.

use crate::divergence::compute_divergence_with;
use crate::gridworld::RewardCatalog;
use crate::heatmaps::{compact_heatmaps, HeatmapOptions};
use crate::logging::Stage;
use crate::masks::RewardMask;
use crate::synthetic::{compare_synthetic, plot_shaping_comparison, Metric, SyntheticConfig};
use chrono::Local;
use rand::Rng;
use rd_common::{LabeledSeries, Result};
use rd_config::PlotConfig;
use rd_report::{apply_styles, save_figs, Figure};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory name for gridworld divergence runs under the output root.
pub const GRIDWORLD_RUN_DIR: &str = "plot_gridworld_divergence";
/// Directory name for synthetic shaping sweeps under the output root.
pub const SHAPING_RUN_DIR: &str = "shaping_comparison";
/// File the divergence table is written to inside a run directory.
pub const DIVERGENCE_FILE: &str = "divergence.json";

/// Local time plus a random suffix, so runs started in the same second
/// still get distinct directories.
pub fn make_unique_timestamp() -> String {
    let suffix: u32 = rand::rng().random();
    format!("{}_{:08x}", Local::now().format("%Y%m%d_%H%M%S"), suffix)
}

/// What a run wrote.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub log_dir: PathBuf,
    pub figures: Vec<PathBuf>,
    /// Raw results next to the figures.
    pub data: PathBuf,
}

fn create_run_dir(output_root: &Path, name: &str) -> Result<PathBuf> {
    let log_dir = output_root.join(name).join(make_unique_timestamp());
    fs::create_dir_all(&log_dir)?;
    info!(stage = %Stage::Init, log_dir = %log_dir.display(), "Created run directory");
    Ok(log_dir)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Compute the divergence table over `catalog` and save one heatmap per
/// mask group.
///
/// The catalog is narrowed to `reward_subset` first. The table is written
/// to `divergence.json` before any figure is rendered.
pub fn run_plot_gridworld_divergence(
    config: &PlotConfig,
    catalog: &RewardCatalog,
    output_root: &Path,
) -> Result<RunOutcome> {
    let style = apply_styles(&config.styles)?;
    let options = HeatmapOptions::from_config(config, style)?;
    let masks = config
        .effective_masks()
        .iter()
        .map(RewardMask::from_group)
        .collect::<Result<Vec<_>>>()?;

    let catalog = match &config.reward_subset {
        Some(names) => catalog.subset(names)?,
        None => catalog.clone(),
    };
    info!(stage = %Stage::Load, rewards = catalog.len(), "Loaded reward catalog");

    let log_dir = create_run_dir(output_root, GRIDWORLD_RUN_DIR)?;

    info!(stage = %Stage::Compute, kind = %config.kind, "Computing divergence");
    let divergence =
        compute_divergence_with(&catalog, config.discount, config.kind, config.n_iter)?;
    let data = log_dir.join(DIVERGENCE_FILE);
    write_json(&data, &divergence)?;

    info!(stage = %Stage::Render, figures = masks.len(), "Rendering heatmaps");
    let figs = compact_heatmaps(
        &divergence,
        &masks,
        config.heatmap.order.as_deref(),
        &options,
    )?;
    let figs: Vec<(String, Figure)> = figs
        .into_iter()
        .map(|(name, fig)| (name, Figure::Heatmap(fig)))
        .collect();

    let figures = save_figs(
        &log_dir,
        figs.iter().map(|(name, fig)| (name.as_str(), fig)),
        config.save.fmt,
    )?;
    info!(stage = %Stage::Save, figures = figures.len(), "Run complete");

    Ok(RunOutcome {
        log_dir,
        figures,
        data,
    })
}

/// Load a previously written divergence table.
pub fn load_divergence(path: &Path) -> Result<LabeledSeries<f64>> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Run the synthetic sweep and save the distance-vs-noise plot.
pub fn run_shaping_comparison(
    synthetic: &SyntheticConfig,
    cols: Option<&[Metric]>,
    config: &PlotConfig,
    output_root: &Path,
) -> Result<RunOutcome> {
    let style = apply_styles(&config.styles)?;
    let log_dir = create_run_dir(output_root, SHAPING_RUN_DIR)?;

    info!(stage = %Stage::Compute, trials = synthetic.trials, "Running synthetic sweep");
    let rows = compare_synthetic(synthetic)?;
    let data = log_dir.join("comparison.json");
    write_json(&data, &rows)?;

    info!(stage = %Stage::Render, "Rendering shaping comparison");
    let fig = Figure::Line(plot_shaping_comparison(&rows, cols, style));
    let figures = save_figs(&log_dir, [(SHAPING_RUN_DIR, &fig)], config.save.fmt)?;
    info!(stage = %Stage::Save, figures = figures.len(), "Run complete");

    Ok(RunOutcome {
        log_dir,
        figures,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rd_common::ZERO_REWARD;
    use rd_config::{apply_preset, PresetName};

    fn test_config() -> PlotConfig {
        let mut config = PlotConfig::default();
        apply_preset(&mut config, PresetName::Test);
        config.n_iter = 20;
        config
    }

    #[test]
    fn timestamps_are_unique() {
        let a = make_unique_timestamp();
        let b = make_unique_timestamp();
        assert_ne!(a, b);
        assert_eq!(a.len(), "20260101_000000_".len() + 8);
    }

    #[test]
    fn gridworld_run_writes_table_and_figures() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.reward_subset = Some(vec!["sparse_goal".into(), ZERO_REWARD.into()]);

        let outcome =
            run_plot_gridworld_divergence(&config, &RewardCatalog::builtin(), tmp.path()).unwrap();
        assert!(outcome.log_dir.starts_with(tmp.path().join(GRIDWORLD_RUN_DIR)));
        assert_eq!(outcome.figures.len(), 1);
        assert!(outcome.figures[0].ends_with("direct_divergence.svg"));
        assert!(outcome.figures[0].exists());

        let table = load_divergence(&outcome.data).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn unknown_subset_reward_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.reward_subset = Some(vec!["no_such_reward".into()]);
        let err =
            run_plot_gridworld_divergence(&config, &RewardCatalog::builtin(), tmp.path())
                .unwrap_err();
        assert!(matches!(err, rd_common::Error::UnknownReward(_)));
    }

    #[test]
    fn shaping_run_writes_line_plot() {
        let tmp = tempfile::tempdir().unwrap();
        let synthetic = SyntheticConfig {
            xlen: 2,
            ylen: 2,
            reward_noise: vec![0.0, 0.5],
            potential_noise: vec![1.0],
            trials: 1,
            n_iter: 10,
            ..SyntheticConfig::default()
        };
        let outcome =
            run_shaping_comparison(&synthetic, None, &test_config(), tmp.path()).unwrap();
        assert_eq!(outcome.figures.len(), 1);
        assert!(outcome.figures[0].exists());
        assert!(outcome.data.exists());
    }
}
