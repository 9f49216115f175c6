//! Dense tabular arrays over a finite MDP.
//!
//! Rewards and visitation distributions are indexed by
//! (state, action, next-state) and stored row-major in a flat `Vec<f64>`.

use crate::error::{MathError, Result};

/// Tolerance used when checking that a distribution sums to one.
pub const DIST_SUM_TOL: f64 = 1e-6;

fn shape_string(n_states: usize, n_actions: usize) -> String {
    format!("({}, {}, {})", n_states, n_actions, n_states)
}

fn check_dims(context: &str, n_states: usize, n_actions: usize, len: usize) -> Result<()> {
    if n_states == 0 || n_actions == 0 {
        return Err(MathError::Empty(format!(
            "{} with shape {}",
            context,
            shape_string(n_states, n_actions)
        )));
    }
    let expected = n_states * n_actions * n_states;
    if len != expected {
        return Err(MathError::ShapeMismatch {
            context: context.to_string(),
            expected: format!("{} elements for shape {}", expected, shape_string(n_states, n_actions)),
            actual: format!("{} elements", len),
        });
    }
    Ok(())
}

/// Reward function R[s, a, s'] over a finite MDP.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardTensor {
    n_states: usize,
    n_actions: usize,
    data: Vec<f64>,
}

impl RewardTensor {
    /// Build a tensor from row-major data.
    pub fn new(n_states: usize, n_actions: usize, data: Vec<f64>) -> Result<Self> {
        check_dims("reward tensor", n_states, n_actions, data.len())?;
        Ok(Self {
            n_states,
            n_actions,
            data,
        })
    }

    /// All-zero reward, the baseline every other reward is compared against.
    pub fn zeros(n_states: usize, n_actions: usize) -> Self {
        Self {
            n_states,
            n_actions,
            data: vec![0.0; n_states * n_actions * n_states],
        }
    }

    /// Build a tensor by evaluating `f(s, a, s')` for every index.
    pub fn from_fn(
        n_states: usize,
        n_actions: usize,
        mut f: impl FnMut(usize, usize, usize) -> f64,
    ) -> Self {
        let mut data = Vec::with_capacity(n_states * n_actions * n_states);
        for s in 0..n_states {
            for a in 0..n_actions {
                for t in 0..n_states {
                    data.push(f(s, a, t));
                }
            }
        }
        Self {
            n_states,
            n_actions,
            data,
        }
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// (n_states, n_actions, n_states)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_states, self.n_actions, self.n_states)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn index(&self, s: usize, a: usize, t: usize) -> usize {
        (s * self.n_actions + a) * self.n_states + t
    }

    #[inline]
    pub fn get(&self, s: usize, a: usize, t: usize) -> f64 {
        self.data[self.index(s, a, t)]
    }

    /// Apply `f(s, a, s', value)` to every entry.
    pub fn map_indexed(&self, mut f: impl FnMut(usize, usize, usize, f64) -> f64) -> Self {
        Self::from_fn(self.n_states, self.n_actions, |s, a, t| f(s, a, t, self.get(s, a, t)))
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            n_states: self.n_states,
            n_actions: self.n_actions,
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }

    pub fn add(&self, other: &RewardTensor) -> Result<Self> {
        self.zip_with(other, "tensor addition", |a, b| a + b)
    }

    pub fn sub(&self, other: &RewardTensor) -> Result<Self> {
        self.zip_with(other, "tensor subtraction", |a, b| a - b)
    }

    fn zip_with(
        &self,
        other: &RewardTensor,
        context: &str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Self> {
        self.check_same_shape(other.shape(), context)?;
        Ok(Self {
            n_states: self.n_states,
            n_actions: self.n_actions,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| f(*a, *b))
                .collect(),
        })
    }

    pub(crate) fn check_same_shape(&self, other: (usize, usize, usize), context: &str) -> Result<()> {
        if self.shape() != other {
            return Err(MathError::ShapeMismatch {
                context: context.to_string(),
                expected: format!("{:?}", self.shape()),
                actual: format!("{:?}", other),
            });
        }
        Ok(())
    }
}

/// State potential φ[s] used for potential-based shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct Potential(Vec<f64>);

impl Potential {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn zeros(n_states: usize) -> Self {
        Self(vec![0.0; n_states])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for Potential {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Visitation distribution D[s, a, s'], non-negative and summing to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    n_states: usize,
    n_actions: usize,
    data: Vec<f64>,
}

impl Distribution {
    /// Wrap probabilities that already sum to one.
    pub fn new(n_states: usize, n_actions: usize, data: Vec<f64>) -> Result<Self> {
        check_dims("distribution", n_states, n_actions, data.len())?;
        if let Some(bad) = data.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(MathError::InvalidDistribution(format!(
                "entries must be finite and non-negative, found {}",
                bad
            )));
        }
        let total: f64 = data.iter().sum();
        if (total - 1.0).abs() > DIST_SUM_TOL {
            return Err(MathError::InvalidDistribution(format!(
                "must sum to 1, sums to {}",
                total
            )));
        }
        Ok(Self {
            n_states,
            n_actions,
            data,
        })
    }

    /// Normalize non-negative weights into a distribution.
    pub fn from_weights(n_states: usize, n_actions: usize, weights: Vec<f64>) -> Result<Self> {
        check_dims("distribution weights", n_states, n_actions, weights.len())?;
        let total: f64 = weights.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(MathError::InvalidDistribution(format!(
                "weights must have a positive finite total, got {}",
                total
            )));
        }
        Self::new(
            n_states,
            n_actions,
            weights.into_iter().map(|w| w / total).collect(),
        )
    }

    /// Uniform distribution over every (s, a, s') triple.
    pub fn uniform(n_states: usize, n_actions: usize) -> Self {
        let len = n_states * n_actions * n_states;
        Self {
            n_states,
            n_actions,
            data: vec![1.0 / len as f64; len],
        }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_states, self.n_actions, self.n_states)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, s: usize, a: usize, t: usize) -> f64 {
        self.data[(s * self.n_actions + a) * self.n_states + t]
    }
}
