//! Small dense linear solves.
//!
//! The systems solved here are the normal equations of potential fitting,
//! with one unknown per state, so a direct O(n^3) elimination is adequate.

use crate::error::{MathError, Result};

/// Solve `matrix * x = rhs` for square row-major `matrix` of size n x n.
///
/// Gaussian elimination with partial pivoting.
pub fn solve(mut matrix: Vec<f64>, mut rhs: Vec<f64>, context: &str) -> Result<Vec<f64>> {
    let n = rhs.len();
    if matrix.len() != n * n {
        return Err(MathError::ShapeMismatch {
            context: context.to_string(),
            expected: format!("{} matrix entries", n * n),
            actual: format!("{}", matrix.len()),
        });
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| {
                matrix[a * n + col]
                    .abs()
                    .total_cmp(&matrix[b * n + col].abs())
            })
            .unwrap_or(col);
        let pivot = matrix[pivot_row * n + col];
        if pivot == 0.0 || !pivot.is_finite() {
            return Err(MathError::Singular(context.to_string()));
        }
        if pivot_row != col {
            for k in 0..n {
                matrix.swap(col * n + k, pivot_row * n + k);
            }
            rhs.swap(col, pivot_row);
        }

        for row in (col + 1)..n {
            let factor = matrix[row * n + col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row * n + k] -= factor * matrix[col * n + k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for k in (row + 1)..n {
            acc -= matrix[row * n + k] * x[k];
        }
        x[row] = acc / matrix[row * n + row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_two_by_two() {
        // 2x + y = 5, x + 3y = 10
        let x = solve(vec![2.0, 1.0, 1.0, 3.0], vec![5.0, 10.0], "test").unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn pivots_on_zero_diagonal() {
        let x = solve(vec![0.0, 1.0, 1.0, 0.0], vec![2.0, 3.0], "test").unwrap();
        assert_eq!(x, vec![3.0, 2.0]);
    }

    #[test]
    fn singular_matrix_errors() {
        let err = solve(vec![1.0, 2.0, 2.0, 4.0], vec![1.0, 2.0], "test").unwrap_err();
        assert!(matches!(err, MathError::Singular(_)));
    }
}
