//! Structured logging for rd-core.
//!
//! stdout is reserved for command payloads (paths, JSON); all log output
//! goes to stderr, either as human-readable lines or as JSON objects.
//!
//! ```ignore
//! use rd_core::logging::{init_logging, LogConfig, Stage};
//!
//! init_logging(&LogConfig::from_env(None, None));
//! tracing::info!(stage = %Stage::Compute, "Computing divergence table");
//! ```

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events the default filter lets through.
const LOG_TARGETS: &[&str] = &["rd_core", "rd_report", "rd_config"];

/// Pipeline stages, attached to events as the `stage` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Load,
    Compute,
    Render,
    Save,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Compute => "compute",
            Stage::Render => "render",
            Stage::Save => "save",
        };
        write!(f, "{}", s)
    }
}

/// Filter directive used when `RUST_LOG` is unset or invalid.
pub fn default_directive(level: LogLevel) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the logging subsystem.
///
/// Only the first call installs a subscriber; later calls are no-ops.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.level)));

    let installed = match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_ansi(use_ansi),
                )
                .try_init()
        }
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_covers_workspace() {
        let directive = default_directive(LogLevel::Debug);
        assert_eq!(directive, "rd_core=debug,rd_report=debug,rd_config=debug");
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Compute.to_string(), "compute");
        assert_eq!(Stage::Save.to_string(), "save");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LogConfig {
            level: LogLevel::Error,
            ..LogConfig::default()
        };
        init_logging(&config);
        init_logging(&config);
    }
}
