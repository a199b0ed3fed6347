//! Small dense linear algebra for penalised least squares

use crate::error::{ForecastError, Result};
use ndarray::{Array1, Array2};

const PIVOT_TOLERANCE: f64 = 1e-12;

/// Solve `(XᵀX + diag(penalty)) β = Xᵀy`
pub(crate) fn penalised_least_squares(
    design: &Array2<f64>,
    targets: &Array1<f64>,
    penalty: &Array1<f64>,
) -> Result<Array1<f64>> {
    if design.nrows() != targets.len() {
        return Err(ForecastError::ModelError(format!(
            "Design has {} rows but {} targets",
            design.nrows(),
            targets.len()
        )));
    }
    if design.ncols() != penalty.len() {
        return Err(ForecastError::ModelError(format!(
            "Design has {} columns, expected {}",
            design.ncols(),
            penalty.len()
        )));
    }

    let mut gram = design.t().dot(design);
    gram.diag_mut()
        .zip_mut_with(penalty, |entry, &lambda| *entry += lambda);
    let rhs = design.t().dot(targets);

    solve(gram, rhs)
}

/// Gaussian elimination with partial pivoting
pub(crate) fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);

        if !a[[pivot, col]].is_finite() || a[[pivot, col]].abs() < PIVOT_TOLERANCE {
            return Err(ForecastError::ModelError(
                "Singular regression system".to_string(),
            ));
        }

        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let mut tail = 0.0;
        for k in row + 1..n {
            tail += a[[row, k]] * x[k];
        }
        x[row] = (b[row] - tail) / a[[row, row]];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::ModelError(
            "Regression coefficients are not finite".to_string(),
        ));
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array};

    #[test]
    fn test_solve_small_system() {
        // 2x + y = 5, x + 3y = 10
        let x = solve(array![[2.0, 1.0], [1.0, 3.0]], array![5.0, 10.0]).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_needs_row_swap() {
        // Zero in the first pivot position
        let x = solve(array![[0.0, 1.0], [1.0, 1.0]], array![2.0, 3.0]).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_singular() {
        let result = solve(array![[1.0, 2.0], [2.0, 4.0]], array![1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::ModelError(_))));
    }

    #[test]
    fn test_least_squares_recovers_line() {
        let design = Array2::from_shape_fn((10, 2), |(i, j)| if j == 0 { 1.0 } else { i as f64 });
        let targets = Array::from_iter((0..10).map(|i| 3.0 + 2.0 * i as f64));

        let beta = penalised_least_squares(&design, &targets, &Array1::zeros(2)).unwrap();
        assert_relative_eq!(beta[0], 3.0, epsilon = 1e-9);
        assert_relative_eq!(beta[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_penalty_makes_collinear_columns_solvable() {
        let design = Array2::from_shape_fn((5, 2), |(i, _)| i as f64);
        let targets = Array::from_iter((0..5).map(|i| i as f64));

        assert!(penalised_least_squares(&design, &targets, &Array1::zeros(2)).is_err());
        let beta =
            penalised_least_squares(&design, &targets, &Array1::from_elem(2, 1e-3)).unwrap();
        assert_relative_eq!(beta[0] + beta[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_mismatched_shapes() {
        let design = Array2::<f64>::zeros((3, 2));
        assert!(penalised_least_squares(&design, &Array1::zeros(2), &Array1::zeros(2)).is_err());
        assert!(penalised_least_squares(&design, &Array1::zeros(3), &Array1::zeros(3)).is_err());
    }
}
