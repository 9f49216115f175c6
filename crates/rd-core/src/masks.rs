//! Reward-pair masks for heatmaps.
//!
//! A mask marks the cells to hide: a (source, target) pair is hidden unless
//! at least one predicate of its group matches it.

use rd_common::labels::{SOURCE_REWARD_TYPE, TARGET_REWARD_TYPE};
use rd_common::{Error, LabeledSeries, Result, ZERO_REWARD};
use rd_config::{MaskFilter, MaskGroup};
use regex::Regex;

/// Decides whether a (source, target) pair is shown.
pub trait PairPredicate: std::fmt::Debug {
    fn matches(&self, source: &str, target: &str) -> bool;
}

/// Shows every pair.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysTrue;

impl PairPredicate for AlwaysTrue {
    fn matches(&self, _source: &str, _target: &str) -> bool {
        true
    }
}

/// Shows pairs comparing a reward with itself.
#[derive(Debug, Clone, Copy)]
pub struct Same;

impl PairPredicate for Same {
    fn matches(&self, source: &str, target: &str) -> bool {
        source == target
    }
}

/// Shows pairs involving the Zero reward.
#[derive(Debug, Clone, Copy)]
pub struct Zero;

impl PairPredicate for Zero {
    fn matches(&self, source: &str, target: &str) -> bool {
        source == ZERO_REWARD || target == ZERO_REWARD
    }
}

/// Shows pairs whose names fully match both patterns.
#[derive(Debug, Clone)]
pub struct Matching {
    source: Regex,
    target: Regex,
}

impl Matching {
    pub fn new(source: &str, target: &str) -> Result<Self> {
        Ok(Self {
            source: anchored(source)?,
            target: anchored(target)?,
        })
    }
}

fn anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| Error::Config(format!("invalid mask pattern '{}': {}", pattern, e)))
}

impl PairPredicate for Matching {
    fn matches(&self, source: &str, target: &str) -> bool {
        self.source.is_match(source) && self.target.is_match(target)
    }
}

/// Build the predicate a configured filter describes.
pub fn predicate_from_filter(filter: &MaskFilter) -> Result<Box<dyn PairPredicate>> {
    Ok(match filter {
        MaskFilter::AlwaysTrue => Box::new(AlwaysTrue),
        MaskFilter::Same => Box::new(Same),
        MaskFilter::Zero => Box::new(Zero),
        MaskFilter::Matching { source, target } => Box::new(Matching::new(source, target)?),
    })
}

/// A named set of predicates; each group yields one figure.
#[derive(Debug)]
pub struct RewardMask {
    pub name: String,
    pub predicates: Vec<Box<dyn PairPredicate>>,
}

impl RewardMask {
    pub fn new(name: impl Into<String>, predicates: Vec<Box<dyn PairPredicate>>) -> Self {
        Self {
            name: name.into(),
            predicates,
        }
    }

    pub fn from_group(group: &MaskGroup) -> Result<Self> {
        let predicates = group
            .filters
            .iter()
            .map(predicate_from_filter)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(group.name.clone(), predicates))
    }
}

/// `true` for every entry no predicate matches, i.e. the cells to hide.
pub fn compute_mask<T>(
    series: &LabeledSeries<T>,
    predicates: &[Box<dyn PairPredicate>],
) -> Result<LabeledSeries<bool>> {
    let source_idx = series.require_level(SOURCE_REWARD_TYPE)?;
    let target_idx = series.require_level(TARGET_REWARD_TYPE)?;
    Ok(series.map_values(|key, _| {
        !predicates
            .iter()
            .any(|p| p.matches(&key[source_idx], &key[target_idx]))
    }))
}
