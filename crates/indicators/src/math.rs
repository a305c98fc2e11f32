//! Shared numeric building blocks for the indicator engine.
//!
//! Series helpers return one value per input element, `f64::NAN` before
//! the seed window fills. Latest-value helpers return `Option` so callers
//! can map short histories straight onto absent indicator fields.

/// Unweighted mean of the last `period` values
pub fn sma_last(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Population standard deviation of the last `period` values
pub fn stddev_last(values: &[f64], period: usize) -> Option<f64> {
    let mean = sma_last(values, period)?;
    let window = &values[values.len() - period..];
    let variance = window
        .iter()
        .map(|value| {
            let diff = value - mean;
            diff * diff
        })
        .sum::<f64>()
        / period as f64;
    Some(variance.sqrt())
}

/// Exponential moving average series, seeded with the SMA of the first
/// `period` values
///
/// Entries before the seed index are NaN. Alpha = 2 / (period + 1).
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = seed;

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = seed;
    for i in period..n {
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}

/// Wilder smoothing: alpha = 1/period, seeded with the mean of the first
/// `period` values
///
/// Entries before the seed index are NaN.
pub fn wilder_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = seed;

    let alpha = 1.0 / period as f64;
    let mut prev = seed;
    for i in period..n {
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}

/// Last value of a series, skipping a NaN-only (too short) series
pub fn last_finite(series: &[f64]) -> Option<f64> {
    series.last().copied().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn sma_last_takes_trailing_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_approx(sma_last(&values, 3).unwrap(), 4.0);
        assert_approx(sma_last(&values, 5).unwrap(), 3.0);
        assert!(sma_last(&values, 6).is_none());
    }

    #[test]
    fn stddev_is_population_not_sample() {
        // mean = 3, squared diffs = 4+1+0+1+4 = 10, variance = 10/5 = 2
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_approx(stddev_last(&values, 5).unwrap(), 2.0_f64.sqrt());
    }

    #[test]
    fn stddev_constant_series_is_zero() {
        let values = [7.0; 8];
        assert_approx(stddev_last(&values, 5).unwrap(), 0.0);
    }

    #[test]
    fn ema_seed_is_sma_of_first_window() {
        let values = [2.0, 4.0, 6.0, 8.0];
        let ema = ema_series(&values, 3);
        assert!(ema[0].is_nan());
        assert!(ema[1].is_nan());
        assert_approx(ema[2], 4.0); // mean(2,4,6)
        // alpha = 0.5: 0.5*8 + 0.5*4 = 6
        assert_approx(ema[3], 6.0);
    }

    #[test]
    fn wilder_uses_one_over_period_alpha() {
        let values = [8.0, 9.0, 6.0, 6.0];
        let smoothed = wilder_series(&values, 3);
        assert_approx(smoothed[2], 23.0 / 3.0);
        // (1/3)*6 + (2/3)*(23/3) = 64/9
        assert_approx(smoothed[3], 64.0 / 9.0);
    }

    #[test]
    fn too_short_series_is_all_nan() {
        let ema = ema_series(&[1.0, 2.0], 5);
        assert!(ema.iter().all(|value| value.is_nan()));
        assert!(last_finite(&ema).is_none());
    }
}
