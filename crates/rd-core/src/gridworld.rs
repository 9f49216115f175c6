//! Tabular gridworld rewards.
//!
//! A grid reward is a state-only reward `R[i][j]` plus a potential grid
//! that shapes it. States are numbered row-major, `s = i * ylen + j`, where
//! `xlen` is the number of rows and `ylen` the number of columns.

use rd_common::{Error, Result, ZERO_REWARD};
use rd_math::{shape, Distribution, Potential, RewardTensor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Stay, up, down, left, right.
pub const N_ACTIONS: usize = 5;

const MOVES: [(isize, isize); N_ACTIONS] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

/// One catalog entry: a state reward and the potential shaping it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    pub state_reward: Vec<Vec<f64>>,
    pub potential: Vec<Vec<f64>>,
}

impl RewardConfig {
    /// Build a config, rejecting ragged or mismatched grids.
    pub fn new(state_reward: Vec<Vec<f64>>, potential: Vec<Vec<f64>>) -> Result<Self> {
        let cfg = Self {
            state_reward,
            potential,
        };
        cfg.grid_shape()?;
        Ok(cfg)
    }

    /// Unshaped config with a zero potential.
    pub fn unshaped(state_reward: Vec<Vec<f64>>) -> Result<Self> {
        let (xlen, ylen) = grid_dims(&state_reward, "state_reward")?;
        Self::new(state_reward, vec![vec![0.0; ylen]; xlen])
    }

    /// `(xlen, ylen)` of the grid, checking both grids agree.
    pub fn grid_shape(&self) -> Result<(usize, usize)> {
        let reward = grid_dims(&self.state_reward, "state_reward")?;
        let potential = grid_dims(&self.potential, "potential")?;
        if reward != potential {
            return Err(Error::ShapeMismatch(format!(
                "state_reward is {}x{} but potential is {}x{}",
                reward.0, reward.1, potential.0, potential.1
            )));
        }
        Ok(reward)
    }
}

fn grid_dims(grid: &[Vec<f64>], what: &str) -> Result<(usize, usize)> {
    let xlen = grid.len();
    let ylen = grid.first().map(Vec::len).unwrap_or(0);
    if xlen == 0 || ylen == 0 {
        return Err(Error::ShapeMismatch(format!("{} grid is empty", what)));
    }
    if let Some(row) = grid.iter().position(|r| r.len() != ylen) {
        return Err(Error::ShapeMismatch(format!(
            "{} grid is ragged: row {} has {} columns, expected {}",
            what,
            row,
            grid[row].len(),
            ylen
        )));
    }
    Ok((xlen, ylen))
}

fn flatten(grid: &[Vec<f64>]) -> Vec<f64> {
    grid.iter().flatten().copied().collect()
}

/// Tile a state-only reward `R[s]` into `R[s, a, s']`.
pub fn state_to_3d(reward: &[f64], n_states: usize, n_actions: usize) -> Result<RewardTensor> {
    if reward.len() != n_states {
        return Err(Error::ShapeMismatch(format!(
            "state reward has {} entries, expected {}",
            reward.len(),
            n_states
        )));
    }
    Ok(RewardTensor::from_fn(n_states, n_actions, |s, _a, _t| {
        reward[s]
    }))
}

/// Tile a grid state reward `R[i][j]` into `R[s, a, s']` with five actions.
pub fn grid_to_3d(grid: &[Vec<f64>]) -> Result<RewardTensor> {
    let (xlen, ylen) = grid_dims(grid, "state_reward")?;
    state_to_3d(&flatten(grid), xlen * ylen, N_ACTIONS)
}

/// Deterministic gridworld dynamics as a 0/1 array indexed `[s][a][s']`.
///
/// Action order is stay, up, down, left, right; moves into a wall stay put.
pub fn build_transitions(xlen: usize, ylen: usize, n_actions: usize) -> Result<Vec<f64>> {
    if n_actions > N_ACTIONS {
        return Err(Error::Config(format!(
            "gridworld has at most {} actions, got {}",
            N_ACTIONS, n_actions
        )));
    }
    let n_states = xlen * ylen;
    let mut transitions = vec![0.0; n_states * n_actions * n_states];
    for i in 0..xlen {
        for j in 0..ylen {
            let s = i * ylen + j;
            for (a, (di, dj)) in MOVES.iter().take(n_actions).enumerate() {
                let ni = (i as isize + di).clamp(0, xlen as isize - 1) as usize;
                let nj = (j as isize + dj).clamp(0, ylen as isize - 1) as usize;
                let t = ni * ylen + nj;
                transitions[(s * n_actions + a) * n_states + t] = 1.0;
            }
        }
    }
    Ok(transitions)
}

/// Uniform visitation distribution over the transitions of the grid.
pub fn build_dist(xlen: usize, ylen: usize, n_actions: usize) -> Result<Distribution> {
    let transitions = build_transitions(xlen, ylen, n_actions)?;
    Ok(Distribution::from_weights(
        xlen * ylen,
        n_actions,
        transitions,
    )?)
}

/// State reward of `cfg` tiled to 3-D and shaped by its potential.
pub fn make_reward(cfg: &RewardConfig, discount: f64) -> Result<RewardTensor> {
    cfg.grid_shape()?;
    let state_reward = grid_to_3d(&cfg.state_reward)?;
    let potential = Potential::new(flatten(&cfg.potential));
    Ok(shape(&state_reward, &potential, discount)?)
}

/// Insertion-ordered collection of named grid rewards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardCatalog {
    entries: Vec<(String, RewardConfig)>,
}

impl RewardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, cfg: RewardConfig) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = cfg,
            None => self.entries.push((name, cfg)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RewardConfig> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RewardConfig)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Catalog restricted to `names`, in the order given.
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut out = Self::new();
        for name in names {
            let name = name.as_ref();
            let cfg = self
                .get(name)
                .ok_or_else(|| Error::UnknownReward(name.to_string()))?;
            out.insert(name, cfg.clone());
        }
        debug!(requested = names.len(), kept = out.len(), "Selected reward subset");
        Ok(out)
    }

    /// Parse `{"<name>": {"state_reward": [[..]], "potential": [[..]]}, ..}`.
    ///
    /// A missing `potential` means an unshaped reward.
    pub fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct RawEntry {
            state_reward: Vec<Vec<f64>>,
            #[serde(default)]
            potential: Option<Vec<Vec<f64>>>,
        }

        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid reward catalog: {}", e)))?;
        let mut catalog = Self::new();
        for (name, value) in map {
            let raw: RawEntry = serde_json::from_value(value)
                .map_err(|e| Error::Config(format!("reward '{}': {}", name, e)))?;
            let cfg = match raw.potential {
                Some(potential) => RewardConfig::new(raw.state_reward, potential),
                None => RewardConfig::unshaped(raw.state_reward),
            }
            .map_err(|e| Error::Config(format!("reward '{}': {}", name, e)))?;
            catalog.insert(name, cfg);
        }
        Ok(catalog)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// The built-in 3x3 gridworld rewards. The goal is the bottom-right cell.
    pub fn builtin() -> Self {
        let zeros = || vec![vec![0.0; 3]; 3];
        let sparse_goal = vec![
            vec![0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ];
        // Negative Manhattan distance to the goal.
        let goal_distance = vec![
            vec![-4.0, -3.0, -2.0],
            vec![-3.0, -2.0, -1.0],
            vec![-2.0, -1.0, 0.0],
        ];
        let negate = |grid: &Vec<Vec<f64>>| -> Vec<Vec<f64>> {
            grid.iter()
                .map(|row| row.iter().map(|v| -v).collect())
                .collect()
        };

        let entries: Vec<(&str, Vec<Vec<f64>>, Vec<Vec<f64>>)> = vec![
            ("sparse_goal", sparse_goal.clone(), zeros()),
            (
                // Scaled, offset and shaped copy of sparse_goal.
                "transformed_goal",
                sparse_goal
                    .iter()
                    .map(|row| row.iter().map(|v| 10.0 * v - 1.0).collect())
                    .collect(),
                vec![
                    vec![-1.0, 0.0, 1.0],
                    vec![0.0, 1.0, 2.0],
                    vec![1.0, 2.0, 3.0],
                ],
            ),
            (
                "center_goal",
                vec![
                    vec![0.0, 0.0, 0.0],
                    vec![0.0, 1.0, 0.0],
                    vec![0.0, 0.0, 0.0],
                ],
                zeros(),
            ),
            ("sparse_penalty", negate(&sparse_goal), zeros()),
            (
                "dirt_path",
                vec![
                    vec![0.0, -1.0, 0.0],
                    vec![0.0, -1.0, 0.0],
                    vec![0.0, 0.0, 1.0],
                ],
                zeros(),
            ),
            (
                "cliff_walk",
                vec![
                    vec![0.0, 0.0, 0.0],
                    vec![0.0, 0.0, 0.0],
                    vec![-10.0, -10.0, 10.0],
                ],
                zeros(),
            ),
            ("dense_goal", sparse_goal.clone(), goal_distance.clone()),
            ("antidense_goal", sparse_goal, negate(&goal_distance)),
            (ZERO_REWARD, zeros(), zeros()),
        ];

        let mut catalog = Self::new();
        for (name, state_reward, potential) in entries {
            catalog.insert(
                name,
                RewardConfig {
                    state_reward,
                    potential,
                },
            );
        }
        catalog
    }
}
