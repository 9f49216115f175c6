//! Error types for reward divergence plotting.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for exit codes
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Reorder Mismatch
//!   Reason: order does not match target labels: missing [Dense], extra []
//!   Fix: List every reward exactly once in the heatmap order.
//! ```

use rd_math::MathError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for reward divergence operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid configuration, options or parameters.
    Config,
    /// Malformed or inconsistent divergence data.
    Data,
    /// Numerical failures inside the distance engine.
    Numeric,
    /// Figure rendering failures.
    Render,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Data => write!(f, "data"),
            ErrorCategory::Numeric => write!(f, "numeric"),
            ErrorCategory::Render => write!(f, "render"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for reward divergence plotting.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown divergence kind '{kind}' (expected one of: {known})")]
    UnknownKind { kind: String, known: String },

    #[error("discount must lie in [0, 1), got {discount}")]
    InvalidDiscount { discount: f64 },

    #[error("unknown reward '{0}'")]
    UnknownReward(String),

    #[error("unknown {what} '{name}'")]
    UnknownName { what: &'static str, name: String },

    #[error("order does not match {axis} labels: missing {missing:?}, extra {extra:?}")]
    ReorderMismatch {
        axis: String,
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    // Data errors (20-29)
    #[error("data error: {0}")]
    Data(String),

    #[error("missing index level '{level}' (available: {available:?})")]
    MissingLevel {
        level: String,
        available: Vec<String>,
    },

    #[error("duplicate entry for row {row:?}, column '{column}'")]
    DuplicateLabel { row: Vec<String>, column: String },

    #[error("no Zero baseline for target '{target}'")]
    MissingBaseline { target: String },

    // Numeric errors (30-39)
    #[error("numerical failure: {0}")]
    Numeric(String),

    // Render errors (40-49)
    #[error("render failed: {0}")]
    Render(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Data errors
    /// - 30-39: Numeric errors
    /// - 40-49: Render errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::UnknownKind { .. } => 11,
            Error::InvalidDiscount { .. } => 12,
            Error::UnknownReward(_) => 13,
            Error::UnknownName { .. } => 14,
            Error::ReorderMismatch { .. } => 15,
            Error::ShapeMismatch(_) => 16,
            Error::InvalidDistribution(_) => 17,
            Error::Data(_) => 20,
            Error::MissingLevel { .. } => 21,
            Error::DuplicateLabel { .. } => 22,
            Error::MissingBaseline { .. } => 23,
            Error::Numeric(_) => 30,
            Error::Render(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_)
            | Error::UnknownKind { .. }
            | Error::InvalidDiscount { .. }
            | Error::UnknownReward(_)
            | Error::UnknownName { .. }
            | Error::ReorderMismatch { .. }
            | Error::ShapeMismatch(_)
            | Error::InvalidDistribution(_) => ErrorCategory::Config,

            Error::Data(_)
            | Error::MissingLevel { .. }
            | Error::DuplicateLabel { .. }
            | Error::MissingBaseline { .. } => ErrorCategory::Data,

            Error::Numeric(_) => ErrorCategory::Numeric,
            Error::Render(_) => ErrorCategory::Render,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Run 'rd-core check' to validate the configuration file.",
            Error::UnknownKind { .. } => {
                "Pick a divergence kind from the list above, e.g. 'direct_divergence'."
            }
            Error::InvalidDiscount { .. } => "Set 'discount' to a value in [0, 1), e.g. 0.99.",
            Error::UnknownReward(_) => {
                "Run 'rd-core rewards' to list the rewards available in the catalog."
            }
            Error::UnknownName { .. } => "Check the spelling against the documented names.",
            Error::ReorderMismatch { .. } => {
                "List every reward exactly once in the heatmap order."
            }
            Error::ShapeMismatch(_) => {
                "State reward and potential grids must be rectangular and the same size."
            }
            Error::InvalidDistribution(_) => {
                "Visitation weights must be non-negative and sum to a positive total."
            }
            Error::Data(_) => "Inspect the divergence data for missing or malformed entries.",
            Error::MissingLevel { .. } => {
                "Divergence data must be indexed by source and target reward levels."
            }
            Error::DuplicateLabel { .. } => {
                "Each (source, target) pair may appear once; aggregate seeds before plotting."
            }
            Error::MissingBaseline { .. } => {
                "Include the Zero reward as a source, or disable normalization."
            }
            Error::Numeric(_) => "Check the reward tensors for non-finite values.",
            Error::Render(_) => "Retry with a different output format or style.",
            Error::Io(_) => "Check disk space and permissions of the output directory.",
            Error::Json(_) => "Invalid JSON in file. Check syntax with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::UnknownKind { .. } => "Unknown Divergence Kind",
            Error::InvalidDiscount { .. } => "Invalid Discount",
            Error::UnknownReward(_) => "Unknown Reward",
            Error::UnknownName { .. } => "Unknown Name",
            Error::ReorderMismatch { .. } => "Reorder Mismatch",
            Error::ShapeMismatch(_) => "Shape Mismatch",
            Error::InvalidDistribution(_) => "Invalid Distribution",
            Error::Data(_) => "Data Error",
            Error::MissingLevel { .. } => "Missing Index Level",
            Error::DuplicateLabel { .. } => "Duplicate Label",
            Error::MissingBaseline { .. } => "Missing Zero Baseline",
            Error::Numeric(_) => "Numerical Failure",
            Error::Render(_) => "Render Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

impl From<MathError> for Error {
    fn from(err: MathError) -> Self {
        match err {
            MathError::ShapeMismatch { .. } => Error::ShapeMismatch(err.to_string()),
            MathError::InvalidDiscount { discount } => Error::InvalidDiscount { discount },
            MathError::InvalidDistribution(msg) => Error::InvalidDistribution(msg),
            MathError::InvalidNorm { .. }
            | MathError::InvalidQuantile { .. }
            | MathError::ZeroIterations => Error::Config(err.to_string()),
            MathError::Empty(_) => Error::Data(err.to_string()),
            MathError::Singular(_) => Error::Numeric(err.to_string()),
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Remediation hint.
    pub remediation: String,

    /// Additional structured context.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::UnknownKind { kind, .. } => {
                context.insert("kind".to_string(), serde_json::json!(kind));
            }
            Error::ReorderMismatch {
                axis,
                missing,
                extra,
            } => {
                context.insert("axis".to_string(), serde_json::json!(axis));
                context.insert("missing".to_string(), serde_json::json!(missing));
                context.insert("extra".to_string(), serde_json::json!(extra));
            }
            Error::DuplicateLabel { row, column } => {
                context.insert("row".to_string(), serde_json::json!(row));
                context.insert("column".to_string(), serde_json::json!(column));
            }
            Error::MissingLevel { level, .. } => {
                context.insert("level".to_string(), serde_json::json!(level));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            remediation: err.remediation().to_string(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::Config("test".into()).code(), 10);
        assert_eq!(Error::DuplicateLabel { row: vec![], column: "A".into() }.code(), 22);
        assert_eq!(Error::Render("x".into()).code(), 40);
    }

    #[test]
    fn test_error_category() {
        let reorder = Error::ReorderMismatch {
            axis: "target".into(),
            missing: vec!["A".into()],
            extra: vec![],
        };
        assert_eq!(reorder.category(), ErrorCategory::Config);
        assert_eq!(
            Error::MissingBaseline { target: "A".into() }.category(),
            ErrorCategory::Data
        );
    }

    #[test]
    fn test_from_math_error() {
        let err: Error = MathError::InvalidDiscount { discount: 1.0 }.into();
        assert!(matches!(err, Error::InvalidDiscount { discount } if discount == 1.0));

        let err: Error = MathError::Singular("potential".into()).into();
        assert_eq!(err.category(), ErrorCategory::Numeric);

        let err: Error = MathError::ZeroIterations.into();
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::UnknownKind {
            kind: "bogus".into(),
            known: "direct_divergence".into(),
        };
        let json = StructuredError::from(&err).to_json();

        assert!(json.contains(r#""code":11"#));
        assert!(json.contains(r#""category":"config""#));
        assert!(json.contains(r#""kind":"bogus""#));
    }

    #[test]
    fn test_format_error_human() {
        let err = Error::MissingBaseline {
            target: "Dense".into(),
        };
        let formatted = crate::format_error_human(&err, false);

        assert!(formatted.contains("Missing Zero Baseline"));
        assert!(formatted.contains("no Zero baseline for target 'Dense'"));
        assert!(formatted.contains("disable normalization"));
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Config.to_string(), "config");
        assert_eq!(ErrorCategory::Render.to_string(), "render");
    }
}
