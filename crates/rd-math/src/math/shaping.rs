//! Potential-based shaping and the search for the closest shaped reward.

use super::linalg;
use super::tensor::{Distribution, Potential, RewardTensor};
use crate::error::{check_discount, MathError, Result};

/// Ridge added to the potential normal equations, relative to their scale.
/// Keeps states with no visitation mass from making the system singular.
const POTENTIAL_RIDGE: f64 = 1e-10;

/// Stop alternating minimization once the relative loss improvement is
/// below this threshold.
const CONVERGENCE_TOL: f64 = 1e-12;

/// Potential-shape `reward`: `R(s,a,s') + γ·φ(s') − φ(s)`.
pub fn shape(reward: &RewardTensor, potential: &Potential, discount: f64) -> Result<RewardTensor> {
    check_discount(discount)?;
    check_potential(potential, reward.n_states())?;
    let phi = potential.as_slice();
    Ok(reward.map_indexed(|s, _a, t, r| r + discount * phi[t] - phi[s]))
}

/// The shaping term `γ·φ(s') − φ(s)` on its own.
pub fn shaping_term(potential: &Potential, n_actions: usize, discount: f64) -> Result<RewardTensor> {
    check_discount(discount)?;
    let phi = potential.as_slice();
    if phi.is_empty() || n_actions == 0 {
        return Err(MathError::Empty("shaping term".to_string()));
    }
    Ok(RewardTensor::from_fn(phi.len(), n_actions, |s, _a, t| {
        discount * phi[t] - phi[s]
    }))
}

fn check_potential(potential: &Potential, n_states: usize) -> Result<()> {
    if potential.len() != n_states {
        return Err(MathError::ShapeMismatch {
            context: "potential".to_string(),
            expected: format!("{} states", n_states),
            actual: format!("{} states", potential.len()),
        });
    }
    Ok(())
}

pub(crate) fn check_dist(reward: &RewardTensor, dist: &Distribution) -> Result<()> {
    reward.check_same_shape(dist.shape(), "distribution")
}

/// Σ D·a·b
pub(crate) fn weighted_inner(a: &RewardTensor, b: &RewardTensor, dist: &Distribution) -> f64 {
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .zip(dist.as_slice())
        .map(|((x, y), w)| w * x * y)
        .sum()
}

/// Σ D·(a − b)²
pub(crate) fn weighted_sq_distance(a: &RewardTensor, b: &RewardTensor, dist: &Distribution) -> f64 {
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .zip(dist.as_slice())
        .map(|((x, y), w)| w * (x - y) * (x - y))
        .sum()
}

/// Potential φ minimizing `‖shape(reward, φ) − target‖` weighted by `dist`.
///
/// Solves the normal equations of the weighted least-squares problem
/// directly. Entries with zero weight do not constrain φ.
pub fn closest_potential(
    reward: &RewardTensor,
    target: &RewardTensor,
    dist: &Distribution,
    discount: f64,
) -> Result<Potential> {
    check_discount(discount)?;
    reward.check_same_shape(target.shape(), "closest potential target")?;
    check_dist(reward, dist)?;

    let ns = reward.n_states();
    let na = reward.n_actions();
    let mut normal = vec![0.0; ns * ns];
    let mut rhs = vec![0.0; ns];

    for s in 0..ns {
        for t in 0..ns {
            let mut weight = 0.0;
            let mut moment = 0.0;
            for a in 0..na {
                let w = dist.get(s, a, t);
                if w == 0.0 {
                    continue;
                }
                weight += w;
                moment += w * (reward.get(s, a, t) - target.get(s, a, t));
            }
            if weight == 0.0 {
                continue;
            }
            // Residual is moment/weight + γφ(t) − φ(s).
            let terms = [(t, discount), (s, -1.0)];
            for &(i, ci) in &terms {
                rhs[i] -= ci * moment;
                for &(j, cj) in &terms {
                    normal[i * ns + j] += weight * ci * cj;
                }
            }
        }
    }

    let scale = (0..ns).map(|i| normal[i * ns + i]).fold(0.0, f64::max);
    let ridge = POTENTIAL_RIDGE * (1.0 + scale);
    for i in 0..ns {
        normal[i * ns + i] += ridge;
    }

    linalg::solve(normal, rhs, "closest potential").map(Potential::new)
}

/// Result of projecting a source reward onto a target's shaping class.
#[derive(Debug, Clone)]
pub struct ClosestReward {
    /// `scale·source + γφ(s') − φ(s)`
    pub reward: RewardTensor,
    pub potential: Potential,
    /// Non-negative scale applied to the source.
    pub scale: f64,
    /// Alternating iterations actually run.
    pub iterations: usize,
    /// Weighted squared residual to the target.
    pub loss: f64,
}

/// Closest reward to `target` among positive rescalings and potential
/// shapings of `source`.
///
/// Alternates between the exact potential for the current scale and the
/// exact non-negative scale for the current potential. The loss is
/// non-increasing; iteration stops after `n_iter` rounds or once the
/// relative improvement falls below 1e-12.
pub fn closest_reward_am(
    source: &RewardTensor,
    target: &RewardTensor,
    dist: &Distribution,
    n_iter: usize,
    discount: f64,
) -> Result<ClosestReward> {
    if n_iter == 0 {
        return Err(MathError::ZeroIterations);
    }
    check_discount(discount)?;
    source.check_same_shape(target.shape(), "closest reward target")?;
    check_dist(source, dist)?;

    let source_sq = weighted_inner(source, source, dist);
    let mut scale = 1.0;
    let mut potential = Potential::zeros(source.n_states());
    let mut closest = source.clone();
    let mut loss = weighted_sq_distance(&closest, target, dist);
    let mut iterations = 0;

    for i in 0..n_iter {
        iterations = i + 1;
        let scaled = source.scaled(scale);
        potential = closest_potential(&scaled, target, dist, discount)?;
        let term = shaping_term(&potential, source.n_actions(), discount)?;

        scale = if source_sq > 0.0 {
            let unshaped_target = target.sub(&term)?;
            (weighted_inner(source, &unshaped_target, dist) / source_sq).max(0.0)
        } else {
            0.0
        };
        closest = source.scaled(scale).add(&term)?;

        let previous = loss;
        loss = weighted_sq_distance(&closest, target, dist);
        if loss == 0.0 || (i > 0 && (previous - loss).abs() <= CONVERGENCE_TOL * previous) {
            break;
        }
    }

    Ok(ClosestReward {
        reward: closest,
        potential,
        scale,
        iterations,
        loss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(ns: usize, na: usize) -> RewardTensor {
        RewardTensor::from_fn(ns, na, |s, a, t| {
            ((s * 7 + a * 3 + t * 5) % 11) as f64 / 11.0 - 0.4
        })
    }

    #[test]
    fn shape_matches_definition() {
        let r = RewardTensor::zeros(2, 1);
        let phi = Potential::new(vec![1.0, 2.0]);
        let shaped = shape(&r, &phi, 0.5).unwrap();
        // s=0 -> s'=1: 0 + 0.5*2 - 1 = 0
        assert_eq!(shaped.get(0, 0, 1), 0.0);
        // s=1 -> s'=0: 0 + 0.5*1 - 2 = -1.5
        assert_eq!(shaped.get(1, 0, 0), -1.5);
    }

    #[test]
    fn shape_rejects_wrong_potential_length() {
        let r = RewardTensor::zeros(3, 2);
        let err = shape(&r, &Potential::zeros(2), 0.9).unwrap_err();
        assert!(matches!(err, MathError::ShapeMismatch { .. }));
    }

    #[test]
    fn shape_rejects_discount_of_one() {
        let r = RewardTensor::zeros(2, 2);
        let err = shape(&r, &Potential::zeros(2), 1.0).unwrap_err();
        assert_eq!(err, MathError::InvalidDiscount { discount: 1.0 });
    }

    #[test]
    fn closest_potential_recovers_shaping() {
        let r = ramp(4, 2);
        let phi = Potential::new(vec![0.3, -1.2, 2.0, 0.5]);
        let target = shape(&r, &phi, 0.9).unwrap();
        let dist = Distribution::uniform(4, 2);
        let found = closest_potential(&r, &target, &dist, 0.9).unwrap();
        for (a, b) in found.as_slice().iter().zip(phi.as_slice()) {
            assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
        }
    }

    #[test]
    fn closest_reward_recovers_scale_and_shaping() {
        let r = ramp(3, 2);
        let phi = Potential::new(vec![1.0, -0.5, 0.25]);
        let target = shape(&r.scaled(3.0), &phi, 0.8).unwrap();
        let dist = Distribution::uniform(3, 2);
        let closest = closest_reward_am(&r, &target, &dist, 1000, 0.8).unwrap();
        assert!((closest.scale - 3.0).abs() < 1e-4, "scale {}", closest.scale);
        assert!(closest.loss < 1e-8, "loss {}", closest.loss);
    }

    #[test]
    fn closest_reward_scale_is_never_negative() {
        let r = ramp(3, 2);
        let target = r.scaled(-2.0);
        let dist = Distribution::uniform(3, 2);
        let closest = closest_reward_am(&r, &target, &dist, 50, 0.9).unwrap();
        assert!(closest.scale >= 0.0);
    }

    #[test]
    fn closest_reward_rejects_zero_iterations() {
        let r = ramp(2, 2);
        let dist = Distribution::uniform(2, 2);
        let err = closest_reward_am(&r, &r, &dist, 0, 0.9).unwrap_err();
        assert_eq!(err, MathError::ZeroIterations);
    }
}
