//! Error types for figure rendering.

use thiserror::Error;

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while building, drawing or saving figures.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Drawing backend failure.
    #[error("drawing error: {0}")]
    DrawError(String),

    /// Unknown style sheet name.
    #[error("unknown style '{name}' (available: {available})")]
    UnknownStyle { name: String, available: String },

    /// Unknown colormap name.
    #[error("unknown colormap '{name}' (available: {available})")]
    UnknownColormap { name: String, available: String },

    /// Figure data is inconsistent.
    #[error("invalid figure: {0}")]
    InvalidFigure(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ReportError {
    /// Wrap any drawing backend error.
    pub(crate) fn draw(err: impl std::fmt::Display) -> Self {
        ReportError::DrawError(err.to_string())
    }
}

impl From<ReportError> for rd_common::Error {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::UnknownStyle { name, .. } => rd_common::Error::UnknownName {
                what: "style",
                name,
            },
            ReportError::UnknownColormap { name, .. } => rd_common::Error::UnknownName {
                what: "colormap",
                name,
            },
            ReportError::InvalidFigure(msg) => rd_common::Error::Data(msg),
            ReportError::DrawError(msg) => rd_common::Error::Render(msg),
            ReportError::JsonError(e) => rd_common::Error::Json(e),
            ReportError::IoError(e) => rd_common::Error::Io(e),
        }
    }
}
