//! Configuration validation errors and semantic validation.

use crate::plot::{MaskFilter, PlotConfig};
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("unknown divergence kind '{kind}' (expected one of: {known})")]
    UnknownKind { kind: String, known: String },

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
            ValidationError::UnknownKind { .. } => 67,
            ValidationError::UnknownPreset(_) => 68,
        }
    }
}

impl From<ValidationError> for rd_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnknownKind { kind, known } => {
                rd_common::Error::UnknownKind { kind, known }
            }
            ValidationError::IoError(msg) => rd_common::Error::Io(std::io::Error::other(msg)),
            other => rd_common::Error::Config(other.to_string()),
        }
    }
}

/// Validate a plot configuration semantically.
pub fn validate_plot_config(config: &PlotConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if !(0.0..1.0).contains(&config.discount) {
        return Err(ValidationError::InvalidValue {
            field: "discount".to_string(),
            message: format!("Must be in [0, 1), got {}", config.discount),
        });
    }

    if config.n_iter == 0 {
        return Err(ValidationError::InvalidValue {
            field: "n_iter".to_string(),
            message: "Must be positive".to_string(),
        });
    }

    if let Some(ref subset) = config.reward_subset {
        if subset.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "reward_subset".to_string(),
                message: "Must name at least one reward".to_string(),
            });
        }
        check_unique("reward_subset", subset)?;
    }

    if let Some(ref order) = config.heatmap.order {
        check_unique("heatmap.order", order)?;
    }

    let fraction = config.heatmap.cbar_fraction;
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(ValidationError::InvalidValue {
            field: "heatmap.cbar_fraction".to_string(),
            message: format!("Must be in (0, 1), got {}", fraction),
        });
    }

    if config.heatmap.precision > 15 {
        return Err(ValidationError::InvalidValue {
            field: "heatmap.precision".to_string(),
            message: format!("Must be at most 15, got {}", config.heatmap.precision),
        });
    }

    if let Some(ref groups) = config.heatmap.masks {
        if groups.is_empty() {
            return Err(ValidationError::SemanticError(
                "heatmap.masks must contain at least one group".to_string(),
            ));
        }
        let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
        check_unique("heatmap.masks", &names)?;
        for group in groups {
            for filter in &group.filters {
                validate_filter(&group.name, filter)?;
            }
        }
    }

    Ok(())
}

fn check_unique(field: &str, values: &[String]) -> ValidationResult<()> {
    let mut seen = HashSet::new();
    for v in values {
        if !seen.insert(v.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                message: format!("Duplicate entry '{}'", v),
            });
        }
    }
    Ok(())
}

fn validate_filter(group: &str, filter: &MaskFilter) -> ValidationResult<()> {
    if let MaskFilter::Matching { source, target } = filter {
        for (side, pattern) in [("source", source), ("target", target)] {
            Regex::new(pattern).map_err(|e| ValidationError::InvalidValue {
                field: format!("heatmap.masks.{}.{}", group, side),
                message: format!("Invalid regex: {}", e),
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::MaskGroup;

    #[test]
    fn default_config_is_valid() {
        validate_plot_config(&PlotConfig::default()).unwrap();
    }

    #[test]
    fn rejects_discount_of_one() {
        let cfg = PlotConfig {
            discount: 1.0,
            ..PlotConfig::default()
        };
        let err = validate_plot_config(&cfg).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "discount"));
    }

    #[test]
    fn rejects_duplicate_order() {
        let mut cfg = PlotConfig::default();
        cfg.heatmap.order = Some(vec!["a".into(), "b".into(), "a".into()]);
        assert!(validate_plot_config(&cfg).is_err());
    }

    #[test]
    fn rejects_bad_regex() {
        let mut cfg = PlotConfig::default();
        cfg.heatmap.masks = Some(vec![MaskGroup {
            name: "broken".into(),
            filters: vec![MaskFilter::Matching {
                source: "(".into(),
                target: ".*".into(),
            }],
        }]);
        let err = validate_plot_config(&cfg).unwrap_err();
        assert_eq!(err.code(), 65);
    }

    #[test]
    fn rejects_version_mismatch() {
        let cfg = PlotConfig {
            schema_version: "0.1.0".to_string(),
            ..PlotConfig::default()
        };
        assert!(matches!(
            validate_plot_config(&cfg),
            Err(ValidationError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn converts_into_common_error() {
        let err: rd_common::Error = ValidationError::UnknownKind {
            kind: "x".into(),
            known: "y".into(),
        }
        .into();
        assert_eq!(err.code(), 11);
        let err: rd_common::Error = ValidationError::ParseError("bad".into()).into();
        assert_eq!(err.category(), rd_common::ErrorCategory::Config);
    }
}
