//! Pseudometrics between reward functions.
//!
//! `epic_distance` and its normalized variants measure how far a source
//! reward is from the shaping class of a target. Canonical-form distances
//! deshape both rewards first and compare them directly.

use super::canonical::CanonicalForm;
use super::shaping::{check_dist, closest_reward_am, weighted_inner};
use super::tensor::{Distribution, RewardTensor};
use crate::error::{check_discount, MathError, Result};

/// Default number of alternating-minimization rounds.
pub const DEFAULT_N_ITER: usize = 1000;

/// Denominators at or below this are treated as zero.
const DEGENERATE_TOL: f64 = 1e-12;

/// Weighted Lp norm `(Σ D·|x|^p)^(1/p)`.
///
/// With no distribution every entry carries weight `1/len`.
pub fn lp_norm(arr: &RewardTensor, p: f64, dist: Option<&Distribution>) -> Result<f64> {
    if !(p.is_finite() && p >= 1.0) {
        return Err(MathError::InvalidNorm { p });
    }
    let values = arr.as_slice();
    if values.is_empty() {
        return Err(MathError::Empty("lp norm".to_string()));
    }
    let total: f64 = match dist {
        Some(d) => {
            check_dist(arr, d)?;
            values
                .iter()
                .zip(d.as_slice())
                .map(|(x, w)| w * x.abs().powf(p))
                .sum()
        }
        None => {
            let w = 1.0 / values.len() as f64;
            values.iter().map(|x| w * x.abs().powf(p)).sum()
        }
    };
    Ok(total.powf(1.0 / p))
}

/// Lp distance between two rewards with no deshaping.
pub fn direct_distance(
    a: &RewardTensor,
    b: &RewardTensor,
    p: f64,
    dist: Option<&Distribution>,
) -> Result<f64> {
    lp_norm(&a.sub(b)?, p, dist)
}

/// Distance from `target` to the closest positively rescaled and shaped
/// version of `source`.
pub fn epic_distance(
    source: &RewardTensor,
    target: &RewardTensor,
    dist: &Distribution,
    n_iter: usize,
    discount: f64,
) -> Result<f64> {
    let closest = closest_reward_am(source, target, dist, n_iter, discount)?;
    Ok(closest.loss.max(0.0).sqrt())
}

/// `epic_distance(source, target)` relative to `epic_distance(Zero, target)`.
///
/// Returns 0 when the target is itself shaping-equivalent to zero.
pub fn asymmetric_distance(
    source: &RewardTensor,
    target: &RewardTensor,
    dist: &Distribution,
    n_iter: usize,
    discount: f64,
) -> Result<f64> {
    let zero = RewardTensor::zeros(target.n_states(), target.n_actions());
    let magnitude = epic_distance(&zero, target, dist, n_iter, discount)?;
    if magnitude <= DEGENERATE_TOL {
        source.check_same_shape(target.shape(), "asymmetric distance target")?;
        return Ok(0.0);
    }
    let raw = epic_distance(source, target, dist, n_iter, discount)?;
    Ok(raw / magnitude)
}

/// Symmetrized asymmetric distance: the mean of both directions, or the
/// smaller one when `use_min` is set.
pub fn symmetric_distance(
    a: &RewardTensor,
    b: &RewardTensor,
    dist: &Distribution,
    n_iter: usize,
    discount: f64,
    use_min: bool,
) -> Result<f64> {
    let forward = asymmetric_distance(a, b, dist, n_iter, discount)?;
    let backward = asymmetric_distance(b, a, dist, n_iter, discount)?;
    Ok(if use_min {
        forward.min(backward)
    } else {
        // (x + y) and (y + x) are bitwise identical, so argument order
        // does not change the result.
        0.5 * (forward + backward)
    })
}

fn unit_normalize(reward: RewardTensor, dist: &Distribution) -> RewardTensor {
    let norm = weighted_inner(&reward, &reward, dist).max(0.0).sqrt();
    if norm <= DEGENERATE_TOL {
        reward
    } else {
        reward.scaled(1.0 / norm)
    }
}

/// Half the weighted L2 distance between unit-normalized canonical forms.
///
/// Lies in [0, 1]. A reward whose canonical form is zero stays zero rather
/// than being normalized.
pub fn canonical_reward_distance(
    source: &RewardTensor,
    target: &RewardTensor,
    form: CanonicalForm,
    dist: &Distribution,
    discount: f64,
) -> Result<f64> {
    check_discount(discount)?;
    source.check_same_shape(target.shape(), "canonical distance target")?;
    check_dist(source, dist)?;
    let s = unit_normalize(form.apply(source, discount)?, dist);
    let t = unit_normalize(form.apply(target, discount)?, dist);
    let diff = s.sub(&t)?;
    Ok(0.5 * lp_norm(&diff, 2.0, Some(dist))?)
}
