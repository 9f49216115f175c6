//! Reward names and index level names shared by the pipeline.

/// Sentinel name of the all-zero reward.
pub const ZERO_REWARD: &str = "evaluating_rewards/Zero-v0";

/// Index level holding the source reward name.
pub const SOURCE_REWARD_TYPE: &str = "source_reward_type";
/// Index level holding the target reward name.
pub const TARGET_REWARD_TYPE: &str = "target_reward_type";

/// Display name for source levels after reformatting.
pub const SOURCE_DISPLAY: &str = "Source";
/// Display name for target levels after reformatting.
pub const TARGET_DISPLAY: &str = "Target";

pub const PATH_SUFFIX: &str = "_path";
pub const TYPE_SUFFIX: &str = "_type";
pub const SEED_SUFFIX: &str = "_seed";

/// Display name of an index level: source and target levels become
/// `Source` / `Target`, anything else is shown as-is.
pub fn display_level(name: &str) -> &str {
    match name {
        "source_reward_type" | "source_reward_path" => SOURCE_DISPLAY,
        "target_reward_type" | "target_reward_path" => TARGET_DISPLAY,
        other => other,
    }
}

/// Levels aggregated by median-over-seeds.
pub fn is_seed_level(name: &str) -> bool {
    name.contains("seed")
}
