//! Least-squares fitting used for trend estimation
//!
//! Contains:
//! - Ordinary least squares line fit (slope and intercept)
//! - Ridge regression solved through the normal equations and a Cholesky
//!   factorisation, with a separate penalty per coefficient

use crate::{MathError, Result};

/// Slope and intercept of a fitted line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Evaluate the line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a straight line through `(xs[i], ys[i])` by ordinary least squares.
///
/// A single point (or identical x values) yields a flat line through the mean.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Result<LinearFit> {
    if xs.len() != ys.len() {
        return Err(MathError::InvalidInput(format!(
            "x and y lengths differ ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    if xs.is_empty() {
        return Err(MathError::InsufficientData(
            "Need at least one point for a line fit".to_string(),
        ));
    }

    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean) * (x - x_mean);
    }

    let slope = if denominator.abs() < 1e-12 {
        0.0
    } else {
        numerator / denominator
    };

    Ok(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

/// Solve `min ||y - X b||^2 + sum_j penalties[j] * b_j^2`.
///
/// `design` holds one row per observation, every row with the same number of
/// columns as `penalties`. Penalties must be non-negative; the penalised
/// normal matrix must be positive definite, otherwise a
/// [`MathError::CalculationError`] is returned.
pub fn ridge_solve(design: &[Vec<f64>], targets: &[f64], penalties: &[f64]) -> Result<Vec<f64>> {
    if design.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but there are {} targets",
            design.len(),
            targets.len()
        )));
    }
    if design.is_empty() {
        return Err(MathError::InsufficientData(
            "Need at least one observation for regression".to_string(),
        ));
    }

    let p = penalties.len();
    if p == 0 {
        return Err(MathError::InvalidInput(
            "Design must have at least one column".to_string(),
        ));
    }
    if let Some(bad) = penalties.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(MathError::InvalidInput(format!(
            "Penalties must be finite and non-negative, got {}",
            bad
        )));
    }

    // Normal equations: (X'X + diag(penalties)) b = X'y
    let mut gram = vec![vec![0.0; p]; p];
    let mut rhs = vec![0.0; p];
    for (row, &y) in design.iter().zip(targets) {
        if row.len() != p {
            return Err(MathError::InvalidInput(format!(
                "Design row has {} columns, expected {}",
                row.len(),
                p
            )));
        }
        for i in 0..p {
            let xi = row[i];
            if xi == 0.0 {
                continue;
            }
            rhs[i] += xi * y;
            for j in 0..=i {
                gram[i][j] += xi * row[j];
            }
        }
    }
    for i in 0..p {
        gram[i][i] += penalties[i];
        for j in 0..i {
            gram[j][i] = gram[i][j];
        }
    }

    let lower = cholesky(&gram)?;
    Ok(cholesky_solve(&lower, &rhs))
}

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix
fn cholesky(matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let n = matrix.len();
    let mut lower = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let dot: f64 = (0..j).map(|k| lower[i][k] * lower[j][k]).sum();
            if i == j {
                let pivot = matrix[i][i] - dot;
                // Rounding leaves singular systems with tiny pivots of either sign
                let tolerance = f64::EPSILON * n as f64 * matrix[i][i].abs().max(1.0);
                if pivot <= tolerance || !pivot.is_finite() {
                    return Err(MathError::CalculationError(format!(
                        "Normal matrix is not positive definite (pivot {} at column {})",
                        pivot, i
                    )));
                }
                lower[i][j] = pivot.sqrt();
            } else {
                lower[i][j] = (matrix[i][j] - dot) / lower[j][j];
            }
        }
    }

    Ok(lower)
}

/// Solve `L L' x = b` by forward then backward substitution
fn cholesky_solve(lower: &[Vec<f64>], rhs: &[f64]) -> Vec<f64> {
    let n = lower.len();

    let mut z = vec![0.0; n];
    for i in 0..n {
        let dot: f64 = (0..i).map(|k| lower[i][k] * z[k]).sum();
        z[i] = (rhs[i] - dot) / lower[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let dot: f64 = (i + 1..n).map(|k| lower[k][i] * x[k]).sum();
        x[i] = (z[i] - dot) / lower[i][i];
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_fit_recovers_line() {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x - 2.0).collect();

        let fit = linear_fit(&xs, &ys).unwrap();
        assert_relative_eq!(fit.slope, 3.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, -2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.predict(20.0), 58.0, epsilon = 1e-9);
    }

    #[test]
    fn test_linear_fit_single_point_is_flat() {
        let fit = linear_fit(&[5.0], &[7.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 7.0);
    }

    #[test]
    fn test_linear_fit_validates_input() {
        assert!(linear_fit(&[], &[]).is_err());
        assert!(linear_fit(&[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn test_ridge_without_penalty_matches_ols() {
        let design: Vec<Vec<f64>> = (0..20).map(|i| vec![1.0, i as f64]).collect();
        let targets: Vec<f64> = (0..20).map(|i| 4.0 + 0.5 * i as f64).collect();

        let coef = ridge_solve(&design, &targets, &[0.0, 0.0]).unwrap();
        assert_relative_eq!(coef[0], 4.0, epsilon = 1e-9);
        assert_relative_eq!(coef[1], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_ridge_penalty_shrinks_redundant_column() {
        // Second and third columns are identical; only the penalty makes the system solvable.
        let design: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![1.0, i as f64, i as f64])
            .collect();
        let targets: Vec<f64> = (0..10).map(|i| 2.0 * i as f64).collect();

        let coef = ridge_solve(&design, &targets, &[0.0, 1e-6, 1e-6]).unwrap();
        assert_relative_eq!(coef[1], coef[2], epsilon = 1e-6);
        assert_relative_eq!(coef[1] + coef[2], 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_ridge_rejects_singular_system() {
        let design = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let result = ridge_solve(&design, &[1.0, 1.0], &[0.0, 0.0]);
        assert!(matches!(result, Err(MathError::CalculationError(_))));
    }

    #[test]
    fn test_ridge_rejects_negative_penalty() {
        let design = vec![vec![1.0]];
        assert!(ridge_solve(&design, &[1.0], &[-1.0]).is_err());
    }
}
