//! Divergence measures selectable from configuration.

use crate::validate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which distance `compute_divergence` evaluates for each reward pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DivergenceKind {
    /// EPIC residual between source and the target's shaping class.
    #[default]
    DirectDivergence,
    /// Direct divergence relative to the Zero reward's divergence.
    Asymmetric,
    /// Mean of both asymmetric directions.
    Symmetric,
    /// Minimum of both asymmetric directions.
    SymmetricMin,
    SingletonCanonicalDistance,
    FullyConnectedRandomCanonicalDistance,
    FullyConnectedGreedyCanonicalDistance,
}

impl DivergenceKind {
    pub const ALL: &'static [DivergenceKind] = &[
        DivergenceKind::DirectDivergence,
        DivergenceKind::Asymmetric,
        DivergenceKind::Symmetric,
        DivergenceKind::SymmetricMin,
        DivergenceKind::SingletonCanonicalDistance,
        DivergenceKind::FullyConnectedRandomCanonicalDistance,
        DivergenceKind::FullyConnectedGreedyCanonicalDistance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DivergenceKind::DirectDivergence => "direct_divergence",
            DivergenceKind::Asymmetric => "asymmetric",
            DivergenceKind::Symmetric => "symmetric",
            DivergenceKind::SymmetricMin => "symmetric_min",
            DivergenceKind::SingletonCanonicalDistance => "singleton_canonical_distance",
            DivergenceKind::FullyConnectedRandomCanonicalDistance => {
                "fully_connected_random_canonical_distance"
            }
            DivergenceKind::FullyConnectedGreedyCanonicalDistance => {
                "fully_connected_greedy_canonical_distance"
            }
        }
    }

    /// Comma-separated list of every accepted name.
    pub fn known_names() -> String {
        Self::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for DivergenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DivergenceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownKind {
                kind: s.to_string(),
                known: Self::known_names(),
            })
    }
}

impl TryFrom<String> for DivergenceKind {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DivergenceKind> for String {
    fn from(kind: DivergenceKind) -> Self {
        kind.as_str().to_string()
    }
}
