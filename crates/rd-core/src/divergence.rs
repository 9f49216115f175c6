//! Pairwise divergence tables over a reward catalog.

use crate::gridworld::{build_dist, make_reward, RewardCatalog};
use rd_common::labels::{SOURCE_REWARD_TYPE, TARGET_REWARD_TYPE};
use rd_common::{Error, LabeledSeries, Result, ZERO_REWARD};
use rd_config::DivergenceKind;
use rd_math::{
    asymmetric_distance, canonical_reward_distance, check_discount, epic_distance,
    symmetric_distance, CanonicalForm, Distribution, RewardTensor, DEFAULT_N_ITER,
};
use tracing::{debug, info};

/// Divergence of every (source, target) pair of `catalog`, using the
/// default optimizer budget.
pub fn compute_divergence(
    catalog: &RewardCatalog,
    discount: f64,
    kind: DivergenceKind,
) -> Result<LabeledSeries<f64>> {
    compute_divergence_with(catalog, discount, kind, DEFAULT_N_ITER)
}

/// Divergence of every (source, target) pair of `catalog`.
///
/// Entries are ordered by source, then target, in catalog order. The Zero
/// reward is never a target. Each pair is weighted by the uniform
/// transition distribution of the source's grid.
pub fn compute_divergence_with(
    catalog: &RewardCatalog,
    discount: f64,
    kind: DivergenceKind,
    n_iter: usize,
) -> Result<LabeledSeries<f64>> {
    check_discount(discount)?;
    if n_iter == 0 {
        return Err(Error::Config("n_iter must be positive".to_string()));
    }

    let mut rewards: Vec<(&str, RewardTensor, (usize, usize))> = Vec::with_capacity(catalog.len());
    for (name, cfg) in catalog.iter() {
        let grid = cfg
            .grid_shape()
            .map_err(|e| Error::Config(format!("reward '{}': {}", name, e)))?;
        rewards.push((name, make_reward(cfg, discount)?, grid));
    }
    info!(
        rewards = rewards.len(),
        kind = %kind,
        discount,
        "Computing divergence table"
    );

    let mut series = LabeledSeries::new(vec![
        SOURCE_REWARD_TYPE.to_string(),
        TARGET_REWARD_TYPE.to_string(),
    ]);
    for (src_name, src, (xlen, ylen)) in &rewards {
        let dist = build_dist(*xlen, *ylen, src.n_actions())?;
        for (target_name, target, _) in &rewards {
            if *target_name == ZERO_REWARD {
                continue;
            }
            let div = pair_divergence(kind, src, target, &dist, n_iter, discount)?;
            debug!(source = %src_name, target = %target_name, divergence = div, "Pair divergence");
            series.push(vec![src_name.to_string(), target_name.to_string()], div)?;
        }
    }
    info!(entries = series.len(), "Divergence table complete");
    Ok(series)
}

fn pair_divergence(
    kind: DivergenceKind,
    source: &RewardTensor,
    target: &RewardTensor,
    dist: &Distribution,
    n_iter: usize,
    discount: f64,
) -> rd_math::Result<f64> {
    match kind {
        DivergenceKind::DirectDivergence => epic_distance(source, target, dist, n_iter, discount),
        DivergenceKind::Asymmetric => asymmetric_distance(source, target, dist, n_iter, discount),
        DivergenceKind::Symmetric => {
            symmetric_distance(source, target, dist, n_iter, discount, false)
        }
        DivergenceKind::SymmetricMin => {
            symmetric_distance(source, target, dist, n_iter, discount, true)
        }
        DivergenceKind::SingletonCanonicalDistance => canonical_reward_distance(
            source,
            target,
            CanonicalForm::Singleton,
            dist,
            discount,
        ),
        DivergenceKind::FullyConnectedRandomCanonicalDistance => canonical_reward_distance(
            source,
            target,
            CanonicalForm::FullyConnectedRandom,
            dist,
            discount,
        ),
        DivergenceKind::FullyConnectedGreedyCanonicalDistance => canonical_reward_distance(
            source,
            target,
            CanonicalForm::FullyConnectedGreedy,
            dist,
            discount,
        ),
    }
}
