//! Reward divergence math: tabular tensors, potential shaping and
//! shaping-invariant pseudometrics.

pub mod error;
pub mod math;

pub use error::{check_discount, MathError, Result};
pub use math::canonical::{
    fully_connected_greedy_canonical_reward, fully_connected_random_canonical_reward,
    singleton_shaping_canonical_reward, CanonicalForm,
};
pub use math::distance::*;
pub use math::shaping::{closest_potential, closest_reward_am, shape, shaping_term, ClosestReward};
pub use math::stats::{median, quantile};
pub use math::tensor::{Distribution, Potential, RewardTensor};
