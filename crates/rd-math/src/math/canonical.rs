//! Canonical representatives of potential-shaping equivalence classes.
//!
//! Each canonicalizer computes a state function `g` from the reward and
//! returns `C(R)(s,a,s') = R(s,a,s') + γ·g(s') − g(s) − γ·E_S[g(S)]`.
//! Shaping `R` by any potential shifts `g` by exactly the terms that cancel
//! in `C`, so shaping-equivalent rewards share a canonical form.

use super::tensor::RewardTensor;
use crate::error::{check_discount, Result};
use serde::{Deserialize, Serialize};

/// Reference state and action for the singleton canonical form.
const SINGLETON_STATE: usize = 0;
const SINGLETON_ACTION: usize = 0;

/// Deshaping procedure used to canonicalize a reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalForm {
    /// Point masses on a reference state and action.
    Singleton,
    /// Uniform over actions and next states.
    FullyConnectedRandom,
    /// Greedy over actions, uniform over next states.
    FullyConnectedGreedy,
}

impl CanonicalForm {
    pub const ALL: &'static [CanonicalForm] = &[
        CanonicalForm::Singleton,
        CanonicalForm::FullyConnectedRandom,
        CanonicalForm::FullyConnectedGreedy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalForm::Singleton => "singleton",
            CanonicalForm::FullyConnectedRandom => "fully_connected_random",
            CanonicalForm::FullyConnectedGreedy => "fully_connected_greedy",
        }
    }

    /// Canonicalize `reward` under this form.
    pub fn apply(&self, reward: &RewardTensor, discount: f64) -> Result<RewardTensor> {
        match self {
            CanonicalForm::Singleton => singleton_shaping_canonical_reward(reward, discount),
            CanonicalForm::FullyConnectedRandom => {
                fully_connected_random_canonical_reward(reward, discount)
            }
            CanonicalForm::FullyConnectedGreedy => {
                fully_connected_greedy_canonical_reward(reward, discount)
            }
        }
    }
}

impl std::fmt::Display for CanonicalForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn canonicalize_with(reward: &RewardTensor, discount: f64, g: &[f64], baseline: f64) -> RewardTensor {
    reward.map_indexed(|s, _a, t, r| r + discount * g[t] - g[s] - discount * baseline)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Canonical form with transitions fixed to a single reference state and
/// action: `g(s) = R(s, a0, s0)`.
pub fn singleton_shaping_canonical_reward(reward: &RewardTensor, discount: f64) -> Result<RewardTensor> {
    check_discount(discount)?;
    let g: Vec<f64> = (0..reward.n_states())
        .map(|s| reward.get(s, SINGLETON_ACTION, SINGLETON_STATE))
        .collect();
    let baseline = g[SINGLETON_STATE];
    Ok(canonicalize_with(reward, discount, &g, baseline))
}

/// Canonical form under uniformly random actions and next states:
/// `g(s) = E_{A,S'}[R(s, A, S')]`.
pub fn fully_connected_random_canonical_reward(
    reward: &RewardTensor,
    discount: f64,
) -> Result<RewardTensor> {
    check_discount(discount)?;
    let (ns, na, _) = reward.shape();
    let g: Vec<f64> = (0..ns)
        .map(|s| {
            let mut total = 0.0;
            for a in 0..na {
                for t in 0..ns {
                    total += reward.get(s, a, t);
                }
            }
            total / (na * ns) as f64
        })
        .collect();
    let baseline = mean(&g);
    Ok(canonicalize_with(reward, discount, &g, baseline))
}

/// Canonical form under greedy actions and uniform next states:
/// `g(s) = E_{S'}[max_a R(s, a, S')]`.
pub fn fully_connected_greedy_canonical_reward(
    reward: &RewardTensor,
    discount: f64,
) -> Result<RewardTensor> {
    check_discount(discount)?;
    let (ns, na, _) = reward.shape();
    let g: Vec<f64> = (0..ns)
        .map(|s| {
            let total: f64 = (0..ns)
                .map(|t| {
                    (0..na)
                        .map(|a| reward.get(s, a, t))
                        .fold(f64::NEG_INFINITY, f64::max)
                })
                .sum();
            total / ns as f64
        })
        .collect();
    let baseline = mean(&g);
    Ok(canonicalize_with(reward, discount, &g, baseline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::shaping::shape;
    use crate::math::tensor::Potential;

    fn sample_reward() -> RewardTensor {
        RewardTensor::from_fn(4, 3, |s, a, t| {
            (((s + 1) * (a + 2) * (t + 3)) % 7) as f64 - 3.0
        })
    }

    fn max_abs_diff(a: &RewardTensor, b: &RewardTensor) -> f64 {
        a.as_slice()
            .iter()
            .zip(b.as_slice())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn every_form_is_shaping_invariant() {
        let r = sample_reward();
        let shaped = shape(&r, &Potential::new(vec![2.0, -1.0, 0.5, 4.0]), 0.9).unwrap();
        for form in CanonicalForm::ALL {
            let a = form.apply(&r, 0.9).unwrap();
            let b = form.apply(&shaped, 0.9).unwrap();
            assert!(max_abs_diff(&a, &b) < 1e-9, "{} not invariant", form);
        }
    }

    #[test]
    fn canonical_form_is_idempotent_for_random() {
        let r = sample_reward();
        let once = fully_connected_random_canonical_reward(&r, 0.5).unwrap();
        let twice = fully_connected_random_canonical_reward(&once, 0.5).unwrap();
        assert!(max_abs_diff(&once, &twice) < 1e-9);
    }

    #[test]
    fn zero_reward_stays_zero() {
        let zero = RewardTensor::zeros(3, 2);
        for form in CanonicalForm::ALL {
            let c = form.apply(&zero, 0.99).unwrap();
            assert!(c.as_slice().iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn rejects_invalid_discount() {
        let r = sample_reward();
        assert!(singleton_shaping_canonical_reward(&r, 1.5).is_err());
    }

    #[test]
    fn serde_names_are_snake_case() {
        let json = serde_json::to_string(&CanonicalForm::FullyConnectedGreedy).unwrap();
        assert_eq!(json, "\"fully_connected_greedy\"");
        let back: CanonicalForm = serde_json::from_str("\"singleton\"").unwrap();
        assert_eq!(back, CanonicalForm::Singleton);
    }
}
