//! Error types for the reward math engine.

use thiserror::Error;

/// Result type for math operations.
pub type Result<T> = std::result::Result<T, MathError>;

/// Errors raised by tensor construction and distance computations.
///
/// Every variant is a caller error: the engine is a pure computation over
/// in-memory arrays and has no transient failure modes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    #[error("discount must lie in [0, 1), got {discount}")]
    InvalidDiscount { discount: f64 },

    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("invalid norm order p={p}: must be finite and >= 1")]
    InvalidNorm { p: f64 },

    #[error("quantile must lie in [0, 1], got {q}")]
    InvalidQuantile { q: f64 },

    #[error("iteration count must be positive")]
    ZeroIterations,

    #[error("empty tensor: {0}")]
    Empty(String),

    #[error("singular linear system while solving {0}")]
    Singular(String),
}

/// Check that a discount factor lies in the half-open interval [0, 1).
///
/// NaN is rejected along with out-of-range values.
pub fn check_discount(discount: f64) -> Result<()> {
    if (0.0..1.0).contains(&discount) {
        Ok(())
    } else {
        Err(MathError::InvalidDiscount { discount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_range() {
        assert!(check_discount(0.0).is_ok());
        assert!(check_discount(0.99).is_ok());
        assert_eq!(
            check_discount(1.0),
            Err(MathError::InvalidDiscount { discount: 1.0 })
        );
        assert!(check_discount(-0.1).is_err());
        assert!(check_discount(f64::NAN).is_err());
    }
}
