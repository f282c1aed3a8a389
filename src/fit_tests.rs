#[cfg(test)]
mod tests {
    use crate::fit::polyfit;
    use crate::types::CalibrationCurve;
    use crate::error::FitError;

    // =========================================================================
    // Regression Tests: Coefficient Order
    // Convention: config coefficients are constant term FIRST.
    // polyfit hands them back highest degree first, so CalibrationCurve::fit
    // has to flip them. Getting this backwards silently produces garbage
    // voltages on the sensor service, so pin it from several angles.
    // =========================================================================

    #[test]
    fn test_square_recovers_unit_x2_term() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [0.0, 1.0, 4.0, 9.0, 16.0, 25.0];

        let curve = CalibrationCurve::fit(&x, &y).unwrap();
        let expected = [0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        for (i, (got, want)) in curve.coefficients().iter().zip(expected).enumerate() {
            assert!(
                (got - want).abs() < 1e-6,
                "coeff[{}] = {}, expected {} (full: {:?})",
                i,
                got,
                want,
                curve.coefficients()
            );
        }
    }

    #[test]
    fn test_curve_is_reverse_of_polyfit() {
        let x: Vec<f64> = (0..12).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|v| 4.0 - v + 0.25 * v * v * v).collect();

        let natural = polyfit(&x, &y, 5).unwrap();
        let curve = CalibrationCurve::fit(&x, &y).unwrap();

        let mut reversed = natural.clone();
        reversed.reverse();
        assert_eq!(curve.coefficients().to_vec(), reversed);
        // natural order ends with the constant term, ours starts with it
        assert!((natural[5] - 4.0).abs() < 1e-8);
        assert!((curve.coefficients()[0] - 4.0).abs() < 1e-8);
    }

    #[test]
    fn test_power_sum_reproduces_fit() {
        // y = 3 + 2x, evaluated the way the sensor service does it
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 + 2.0 * v).collect();
        let curve = CalibrationCurve::fit(&x, &y).unwrap();

        for (xi, yi) in x.iter().zip(&y) {
            let mut sum = 0.0;
            for (i, c) in curve.coefficients().iter().enumerate() {
                sum += c * xi.powi(i as i32);
            }
            assert!((sum - yi).abs() < 1e-8, "x={} sum={} y={}", xi, sum, yi);
            assert!((curve.evaluate(*xi) - sum).abs() < 1e-9);
        }
    }

    #[test]
    fn test_adc_scale_quintic() {
        // 10-bit ADC counts, ground truth in watts
        let truth = |c: f64| 0.2 + 1.5e-3 * c + 6.0e-5 * c * c - 2.0e-8 * c.powi(3) + 4.0e-12 * c.powi(4) + 1.0e-15 * c.powi(5);
        let x: Vec<f64> = (0..20).map(|i| 12.0 + 53.0 * i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&c| truth(c)).collect();

        let curve = CalibrationCurve::fit(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(&y) {
            let got = curve.evaluate(*xi);
            assert!(
                (got - yi).abs() <= 1e-7 * yi.abs().max(1.0),
                "x={} got={} want={}",
                xi,
                got,
                yi
            );
        }
    }

    #[test]
    fn test_noisy_data_stays_close() {
        // alternating +/- 0.01 wobble on a cubic
        let x: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| 1.0 + 0.1 * v * v - 0.002 * v * v * v + if i % 2 == 0 { 0.01 } else { -0.01 })
            .collect();

        let curve = CalibrationCurve::fit(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(&y) {
            assert!((curve.evaluate(*xi) - yi).abs() < 0.02, "x={}", xi);
        }
    }

    #[test]
    fn test_five_distinct_points_fail() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 1.0, 4.0, 9.0, 16.0];
        assert_eq!(
            CalibrationCurve::fit(&x, &y),
            Err(FitError::Underdetermined {
                degree: 5,
                distinct: 5,
                required: 6
            })
        );
    }

    #[test]
    fn test_fit_is_deterministic() {
        let x: Vec<f64> = (0..15).map(|i| (i * i) as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v.sqrt() * 0.3).collect();
        let a = CalibrationCurve::fit(&x, &y).unwrap();
        let b = CalibrationCurve::fit(&x, &y).unwrap();
        assert_eq!(a, b);
    }
}
