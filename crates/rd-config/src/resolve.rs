//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI arguments → environment variables → XDG paths → defaults.

use std::path::{Path, PathBuf};

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPath {
    /// Path to the plot configuration (or None if not found).
    pub path: Option<PathBuf>,

    /// Where the path came from (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "RD_CONFIG";
pub const ENV_CONFIG_DIR: &str = "RD_CONFIG_DIR";
pub const ENV_OUTPUT_DIR: &str = "RD_OUTPUT_DIR";

/// Standard config file name.
const CONFIG_FILENAME: &str = "plot.json";

/// Application name for XDG directories.
const APP_NAME: &str = "reward-divergence";

/// Output root used when nothing else is configured.
const DEFAULT_OUTPUT_DIR: &str = "output";

/// Resolve the configuration path.
///
/// Resolution order:
/// 1. Explicit CLI path (if provided)
/// 2. RD_CONFIG environment variable
/// 3. RD_CONFIG_DIR environment variable + plot.json
/// 4. XDG config directory (~/.config/reward-divergence/)
/// 5. Built-in defaults (None)
///
/// An explicit CLI path is returned even when it does not exist, so that
/// loading it reports the missing file instead of silently using defaults.
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPath {
    // 1. CLI argument
    if let Some(path) = cli_path {
        return ConfigPath {
            path: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return ConfigPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return ConfigPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return ConfigPath {
                path: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    // 5. Built-in default (None)
    ConfigPath::default()
}

/// Root directory for run outputs.
///
/// Order: CLI argument, then the configuration's `log_root`, then
/// RD_OUTPUT_DIR, then `./output`.
pub fn resolve_output_root(cli: Option<&Path>, configured: Option<&Path>) -> PathBuf {
    if let Some(path) = cli.or(configured) {
        return path.to_path_buf();
    }
    match std::env::var(ENV_OUTPUT_DIR) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_OUTPUT_DIR),
    }
}

/// Get the XDG config directory for reward-divergence.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
