//! Figure output formats.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Supported file formats for saved figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureFormat {
    /// Standalone SVG image (default). There is no PDF backend.
    #[default]
    Svg,

    /// Self-contained HTML page embedding the SVG
    Html,
}

impl FigureFormat {
    /// File extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FigureFormat::Svg => "svg",
            FigureFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for FigureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_svg() {
        assert_eq!(FigureFormat::default(), FigureFormat::Svg);
        assert_eq!(FigureFormat::Html.to_string(), "html");
    }

    #[test]
    fn serde_lowercase() {
        let fmt: FigureFormat = serde_json::from_str("\"html\"").unwrap();
        assert_eq!(fmt, FigureFormat::Html);
    }

    #[test]
    fn pdf_is_not_a_format() {
        assert!(serde_json::from_str::<FigureFormat>("\"pdf\"").is_err());
        assert!(FigureFormat::from_str("pdf", true).is_err());
    }
}
