//! Synthetic shaping comparison.
//!
//! Random rewards are perturbed by intrinsic noise and then shaped by a
//! random potential. The EPIC distance should follow only the intrinsic
//! noise, while the raw L2 distance also grows with the shaping noise.

use crate::gridworld::build_dist;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rd_common::{Error, Result};
use rd_math::{direct_distance, epic_distance, shape, Distribution, Potential, RewardTensor};
use rd_report::{LineFigure, LineSeriesData, Style};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Columns of a comparison row that can be plotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Metric {
    /// Shaping-invariant EPIC distance.
    Intrinsic,
    /// Direct L2 distance, sensitive to shaping.
    Shaping,
}

impl Metric {
    pub const ALL: &'static [Metric] = &[Metric::Intrinsic, Metric::Shaping];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Intrinsic => "Intrinsic",
            Metric::Shaping => "Shaping",
        }
    }
}

/// One trial of the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub reward_noise: f64,
    pub potential_noise: f64,
    pub intrinsic: f64,
    pub shaping: f64,
}

impl ComparisonRow {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Intrinsic => self.intrinsic,
            Metric::Shaping => self.shaping,
        }
    }
}

/// Sweep parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Gridworld size; the distribution follows its dynamics.
    pub xlen: usize,
    pub ylen: usize,
    pub reward_noise: Vec<f64>,
    pub potential_noise: Vec<f64>,
    pub trials: usize,
    pub seed: u64,
    pub discount: f64,
    pub n_iter: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            xlen: 3,
            ylen: 3,
            reward_noise: vec![0.0, 0.25, 0.5, 0.75, 1.0],
            potential_noise: vec![0.0, 1.0, 5.0],
            trials: 4,
            seed: 0,
            discount: 0.99,
            n_iter: 100,
        }
    }
}

fn random_reward(rng: &mut StdRng, n_states: usize, n_actions: usize) -> RewardTensor {
    RewardTensor::from_fn(n_states, n_actions, |_, _, _| rng.random_range(-1.0..1.0))
}

fn random_potential(rng: &mut StdRng, n_states: usize, scale: f64) -> Potential {
    Potential::new(
        (0..n_states)
            .map(|_| scale * rng.random_range(-1.0..1.0))
            .collect(),
    )
}

fn trial(
    rng: &mut StdRng,
    cfg: &SyntheticConfig,
    dist: &Distribution,
    reward_noise: f64,
    potential_noise: f64,
) -> Result<ComparisonRow> {
    let (n_states, n_actions, _) = dist.shape();
    let source = random_reward(rng, n_states, n_actions);
    let noise = random_reward(rng, n_states, n_actions).scaled(reward_noise);
    let intrinsic = source.add(&noise)?;
    let potential = random_potential(rng, n_states, potential_noise);
    let target = shape(&intrinsic, &potential, cfg.discount)?;

    Ok(ComparisonRow {
        reward_noise,
        potential_noise,
        intrinsic: epic_distance(&source, &target, dist, cfg.n_iter, cfg.discount)?,
        shaping: direct_distance(&source, &target, 2.0, Some(dist))?,
    })
}

/// Run every (reward noise, potential noise) combination `trials` times.
pub fn compare_synthetic(cfg: &SyntheticConfig) -> Result<Vec<ComparisonRow>> {
    if cfg.trials == 0 {
        return Err(Error::Config("trials must be positive".to_string()));
    }
    let dist = build_dist(cfg.xlen, cfg.ylen, crate::gridworld::N_ACTIONS)?;
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut rows = Vec::new();
    for &pn in &cfg.potential_noise {
        for &rn in &cfg.reward_noise {
            for _ in 0..cfg.trials {
                let row = trial(&mut rng, cfg, &dist, rn, pn)?;
                debug!(
                    reward_noise = rn,
                    potential_noise = pn,
                    intrinsic = row.intrinsic,
                    shaping = row.shaping,
                    "Synthetic trial"
                );
                rows.push(row);
            }
        }
    }
    info!(rows = rows.len(), "Synthetic comparison complete");
    Ok(rows)
}

/// Distance against reward noise: one line per (potential noise, metric),
/// averaging trials. Colour follows potential noise; `Shaping` lines carry
/// point markers.
pub fn plot_shaping_comparison(
    rows: &[ComparisonRow],
    cols: Option<&[Metric]>,
    style: Style,
) -> LineFigure {
    let cols = cols.unwrap_or(Metric::ALL);
    let mut potentials: Vec<f64> = Vec::new();
    for row in rows {
        if !potentials.contains(&row.potential_noise) {
            potentials.push(row.potential_noise);
        }
    }

    let mut fig = LineFigure::new("Reward Noise", "Distance", style);
    for (hue, &pn) in potentials.iter().enumerate() {
        for &metric in cols {
            let mut points: Vec<(f64, f64, usize)> = Vec::new();
            for row in rows.iter().filter(|r| r.potential_noise == pn) {
                let value = row.metric(metric);
                match points.iter_mut().find(|(x, _, _)| *x == row.reward_noise) {
                    Some((_, sum, n)) => {
                        *sum += value;
                        *n += 1;
                    }
                    None => points.push((row.reward_noise, value, 1)),
                }
            }
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            fig.push(LineSeriesData {
                label: format!("{}, potential noise {}", metric.as_str(), pn),
                points: points
                    .into_iter()
                    .map(|(x, sum, n)| (x, sum / n as f64))
                    .collect(),
                color_index: hue,
                markers: metric == Metric::Shaping,
            });
        }
    }
    fig
}
