//! Logging configuration from `RD_LOG`, `RUST_LOG`, `RD_LOG_FORMAT` and the
//! `-v`/`-q`/`--log-format` flags.

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

/// Log level for the workspace crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    /// Reports each stage and every saved figure.
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Level selected by `-v`/`-q`, or `None` when neither was given.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Option<Self> {
        match (quiet, verbose) {
            (true, _) => Some(LogLevel::Error),
            (false, 0) => None,
            (false, 1) => Some(LogLevel::Debug),
            (false, _) => Some(LogLevel::Trace),
        }
    }

    /// Most verbose level named anywhere in a `RUST_LOG` directive.
    fn most_verbose_in(directive: &str) -> Option<Self> {
        let directive = directive.to_ascii_lowercase();
        LogLevel::value_variants()
            .iter()
            .copied()
            .find(|level| directive.contains(level.as_str()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogConfig {
    /// `RD_LOG` wins over `RUST_LOG`; CLI values win over both.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let env_level = match lookup("RD_LOG") {
            Some(val) => LogLevel::from_str(val.trim(), true).ok(),
            None => lookup("RUST_LOG").and_then(|val| LogLevel::most_verbose_in(&val)),
        };
        let env_format =
            lookup("RD_LOG_FORMAT").and_then(|val| LogFormat::from_str(val.trim(), true).ok());

        LogConfig {
            format: cli_format.or(env_format).unwrap_or_default(),
            level: cli_level.or(env_level).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(LogLevel::from_verbosity(0, false), None);
        assert_eq!(LogLevel::from_verbosity(1, false), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_verbosity(3, false), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_verbosity(2, true), Some(LogLevel::Error));
    }

    #[test]
    fn test_defaults_without_env() {
        let config = LogConfig::from_lookup(env(&[]), None, None);
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.level, LogLevel::Info);
    }

    #[test]
    fn test_rd_log_applies_without_flags() {
        let config = LogConfig::from_lookup(env(&[("RD_LOG", "Warn")]), None, None);
        assert_eq!(config.level, LogLevel::Warn);
    }

    #[test]
    fn test_rd_log_beats_rust_log() {
        let config = LogConfig::from_lookup(
            env(&[("RD_LOG", "warn"), ("RUST_LOG", "trace")]),
            None,
            None,
        );
        assert_eq!(config.level, LogLevel::Warn);

        let config = LogConfig::from_lookup(
            env(&[("RUST_LOG", "rd_report=warn,rd_core=debug")]),
            None,
            None,
        );
        assert_eq!(config.level, LogLevel::Debug);
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = LogConfig::from_lookup(
            env(&[("RD_LOG", "warn"), ("RD_LOG_FORMAT", "json")]),
            Some(LogLevel::Trace),
            Some(LogFormat::Human),
        );
        assert_eq!(config.level, LogLevel::Trace);
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn test_unparsable_env_falls_back() {
        let config = LogConfig::from_lookup(
            env(&[("RD_LOG", "loud"), ("RD_LOG_FORMAT", "xml")]),
            None,
            None,
        );
        assert_eq!(config, LogConfig::default());
    }
}
