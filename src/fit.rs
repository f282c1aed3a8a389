//! Least-squares polynomial fitting via column-scaled Householder QR.

use serde::Serialize;

use crate::error::FitError;
use crate::types::{CalibrationCurve, COEFFICIENTS, DEGREE};

/// Fits `y ≈ p(x)` with a polynomial of the given degree.
///
/// Coefficients come back highest degree first (`[c_n, ..., c_1, c_0]`), the
/// usual least-squares convention. See [`CalibrationCurve::fit`] for the order
/// the config file wants.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if let Some(index) = x
        .iter()
        .zip(y)
        .position(|(a, b)| !a.is_finite() || !b.is_finite())
    {
        return Err(FitError::NonFinite { index });
    }

    let m = degree + 1;
    let distinct = count_distinct(x);
    if distinct < m {
        return Err(FitError::Underdetermined {
            degree,
            distinct,
            required: m,
        });
    }

    let n = x.len();

    // Vandermonde, column j holds x^(degree - j)
    let mut a: Vec<Vec<f64>> = x
        .iter()
        .map(|&xi| (0..m).map(|j| xi.powi((degree - j) as i32)).collect())
        .collect();
    let mut b = y.to_vec();

    let mut scale = vec![0.0; m];
    for (j, s) in scale.iter_mut().enumerate() {
        let norm = a.iter().map(|row| row[j] * row[j]).sum::<f64>().sqrt();
        *s = if norm == 0.0 { 1.0 } else { norm };
        for row in a.iter_mut() {
            row[j] /= *s;
        }
    }

    // Householder QR, R ends up in the upper triangle of `a`, Q^T b in `b`
    for k in 0..m {
        let norm = (k..n).map(|i| a[i][k] * a[i][k]).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(FitError::Singular { degree });
        }
        let alpha = if a[k][k] > 0.0 { -norm } else { norm };

        let mut v: Vec<f64> = (k..n).map(|i| a[i][k]).collect();
        v[0] -= alpha;
        let v_norm2: f64 = v.iter().map(|e| e * e).sum();

        if v_norm2 > 0.0 {
            for j in k..m {
                let dot: f64 = (k..n).map(|i| v[i - k] * a[i][j]).sum();
                let f = 2.0 * dot / v_norm2;
                for i in k..n {
                    a[i][j] -= f * v[i - k];
                }
            }
            let dot: f64 = (k..n).map(|i| v[i - k] * b[i]).sum();
            let f = 2.0 * dot / v_norm2;
            for i in k..n {
                b[i] -= f * v[i - k];
            }
        }
    }

    // Same cutoff least-squares solvers use for singular values
    let largest = (0..m).map(|k| a[k][k].abs()).fold(0.0, f64::max);
    let tolerance = largest * n as f64 * f64::EPSILON;
    if (0..m).any(|k| a[k][k].abs() <= tolerance) {
        return Err(FitError::Singular { degree });
    }

    let mut coefficients = vec![0.0; m];
    for k in (0..m).rev() {
        let tail: f64 = (k + 1..m).map(|j| a[k][j] * coefficients[j]).sum();
        coefficients[k] = (b[k] - tail) / a[k][k];
    }
    for (c, s) in coefficients.iter_mut().zip(&scale) {
        *c /= s;
    }

    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(FitError::Singular { degree });
    }
    Ok(coefficients)
}

fn count_distinct(x: &[f64]) -> usize {
    let mut sorted = x.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

impl CalibrationCurve {
    /// Degree-5 least-squares fit of `y` against raw readings `x`.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self, FitError> {
        let mut natural = polyfit(x, y, DEGREE)?;
        // polyfit is highest-degree-first; the config stores constant term first.
        natural.reverse();

        let mut coefficients = [0.0; COEFFICIENTS];
        coefficients.copy_from_slice(&natural);
        Ok(Self::from_lowest_first(coefficients))
    }
}

/// Residual statistics for one fitted curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitStats {
    pub samples: usize,
    pub rms_residual: f64,
    pub max_residual: f64,
    pub r_squared: f64,
}

impl FitStats {
    pub fn measure(curve: &CalibrationCurve, x: &[f64], y: &[f64]) -> Self {
        let n = x.len().min(y.len());
        if n == 0 {
            return Self {
                samples: 0,
                rms_residual: 0.0,
                max_residual: 0.0,
                r_squared: 0.0,
            };
        }

        let mut ss_res = 0.0;
        let mut max_residual = 0.0f64;
        for (xi, yi) in x.iter().zip(y) {
            let r = curve.evaluate(*xi) - yi;
            ss_res += r * r;
            max_residual = max_residual.max(r.abs());
        }

        let mean = y[..n].iter().sum::<f64>() / n as f64;
        let ss_tot: f64 = y[..n].iter().map(|yi| (yi - mean) * (yi - mean)).sum();
        let r_squared = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Self {
            samples: n,
            rms_residual: (ss_res / n as f64).sqrt(),
            max_residual,
            r_squared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_line_as_degree_one() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let c = polyfit(&x, &y, 1).unwrap();
        assert!((c[0] - 2.0).abs() < 1e-12);
        assert!((c[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn least_squares_line_through_noisy_points() {
        // Classic example: best fit of (0,6), (1,0), (2,0) is y = 5 - 3x
        let c = polyfit(&[0.0, 1.0, 2.0], &[6.0, 0.0, 0.0], 1).unwrap();
        assert!((c[0] + 3.0).abs() < 1e-12, "{:?}", c);
        assert!((c[1] - 5.0).abs() < 1e-12, "{:?}", c);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = polyfit(&[1.0, 2.0], &[1.0], 1).unwrap_err();
        assert_eq!(err, FitError::LengthMismatch { x: 2, y: 1 });
    }

    #[test]
    fn nan_input_is_rejected() {
        let err = polyfit(&[0.0, 1.0, f64::NAN], &[0.0, 1.0, 2.0], 1).unwrap_err();
        assert_eq!(err, FitError::NonFinite { index: 2 });
    }

    #[test]
    fn repeated_x_counts_once() {
        let x = [1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 5.0];
        let y = [0.0; 8];
        let err = polyfit(&x, &y, 5).unwrap_err();
        assert_eq!(
            err,
            FitError::Underdetermined {
                degree: 5,
                distinct: 5,
                required: 6
            }
        );
    }

    #[test]
    fn empty_input_is_underdetermined() {
        assert!(matches!(
            CalibrationCurve::fit(&[], &[]),
            Err(FitError::Underdetermined { distinct: 0, .. })
        ));
    }

    #[test]
    fn all_zero_x_is_underdetermined() {
        // only one distinct value, caught before the solver
        let err = polyfit(&[0.0; 10], &[1.0; 10], 2).unwrap_err();
        assert!(matches!(err, FitError::Underdetermined { distinct: 1, .. }));
    }

    #[test]
    fn overflowing_powers_are_singular_not_nan() {
        // x^5 overflows to infinity for every sample
        let x = [1e70, 2e70, 3e70, 4e70, 5e70, 6e70, 7e70];
        let err = CalibrationCurve::fit(&x, &x).unwrap_err();
        assert_eq!(err, FitError::Singular { degree: 5 });
    }

    #[test]
    fn stats_for_exact_fit() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let curve = CalibrationCurve::fit(&x, &y).unwrap();
        let stats = FitStats::measure(&curve, &x, &y);
        assert_eq!(stats.samples, 10);
        assert!(stats.rms_residual < 1e-9);
        assert!(stats.max_residual < 1e-9);
        assert!((stats.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn stats_for_constant_offset() {
        let curve = CalibrationCurve::from_lowest_first([0.0; 6]);
        let stats = FitStats::measure(&curve, &[1.0, 2.0], &[3.0, 3.0]);
        assert_eq!(stats.max_residual, 3.0);
        assert_eq!(stats.rms_residual, 3.0);
        assert_eq!(stats.r_squared, 0.0);
    }
}
