//! Order statistics used when aggregating seeds and picking colour limits.

use crate::error::{MathError, Result};

fn sorted_non_nan(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

/// Quantile `q` in [0, 1] of the non-NaN values, linearly interpolated
/// between the two nearest ranks (NumPy's default method). Infinities take
/// part in the ranking.
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidQuantile { q });
    }
    let sorted = sorted_non_nan(values);
    if sorted.is_empty() {
        return Err(MathError::Empty("quantile of only NaN values".to_string()));
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    if frac == 0.0 || sorted[lo] == sorted[hi] {
        return Ok(sorted[lo]);
    }
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Median of the non-NaN values; the mean of the middle pair for even counts.
pub fn median(values: &[f64]) -> Result<f64> {
    quantile(values, 0.5)
}
