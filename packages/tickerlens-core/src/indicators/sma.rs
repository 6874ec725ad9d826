//! Simple Moving Average (SMA) and Exponential Moving Average (EMA) indicators.

use crate::types::{IndicatorPoint, Sample};

/// Calculate Simple Moving Average.
///
/// # Arguments
///
/// * `series` - Ordered samples (closes for price points)
/// * `period` - Lookback period
///
/// # Returns
///
/// One value per index from `period - 1` onwards, tagged with that sample's
/// timestamp. Empty when `period` is zero or longer than the series.
///
/// # Example
///
/// ```rust
/// use tickerlens_core::{sma, IndicatorPoint};
///
/// let prices: Vec<IndicatorPoint> = [10.0, 11.0, 12.0, 11.0, 10.0]
///     .iter()
///     .enumerate()
///     .map(|(i, &p)| IndicatorPoint::new(i as i64, p))
///     .collect();
/// let sma_values = sma(&prices, 3);
///
/// // SMA at index 2 = (10 + 11 + 12) / 3 = 11.0
/// assert!((sma_values[0].value - 11.0).abs() < 0.001);
/// assert_eq!(sma_values[0].timestamp, 2);
/// ```
pub fn sma<S: Sample>(series: &[S], period: usize) -> Vec<IndicatorPoint> {
    let n = series.len();
    if period == 0 || period > n {
        return Vec::new();
    }

    // Each window is summed on its own so a large value leaving the window
    // leaves no rounding residue behind.
    series
        .windows(period)
        .map(|window| {
            let sum: f64 = window.iter().map(Sample::price).sum();
            IndicatorPoint::new(window[period - 1].timestamp(), sum / period as f64)
        })
        .collect()
}

/// Calculate Exponential Moving Average.
///
/// Seeded with the SMA of the first `period` samples, then
/// `EMA[i] = (price[i] - EMA[i-1]) * k + EMA[i-1]` with `k = 2 / (period + 1)`.
///
/// # Returns
///
/// `series.len() - period + 1` values, the first tagged with the timestamp at
/// index `period - 1`. Empty under the same guard as [`sma`].
pub fn ema<S: Sample>(series: &[S], period: usize) -> Vec<IndicatorPoint> {
    let n = series.len();
    if period == 0 || period > n {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = series[..period].iter().map(Sample::price).sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(n - period + 1);
    result.push(IndicatorPoint::new(series[period - 1].timestamp(), seed));

    let mut prev = seed;
    for sample in &series[period..] {
        prev = (sample.price() - prev) * k + prev;
        result.push(IndicatorPoint::new(sample.timestamp(), prev));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn points(data: &[f64]) -> Vec<IndicatorPoint> {
        data.iter()
            .enumerate()
            .map(|(i, &p)| IndicatorPoint::new(i as i64 * 1000, p))
            .collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = points(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert_abs_diff_eq!(result[0].value, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result[1].value, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result[2].value, 4.0, epsilon = 1e-9);
        assert_eq!(result[0].timestamp, 2000);
        assert_eq!(result[2].timestamp, 4000);
    }

    #[test]
    fn test_sma_period_1() {
        let data = points(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = sma(&data, 1);

        // Period 1 SMA should equal the data
        assert_eq!(result, data);
    }

    #[test]
    fn test_sma_recovers_after_large_value() {
        let data = points(&[1e16, 1.0, 1.0, 1.0]);
        let result = sma(&data, 2);

        assert_eq!(result.len(), 3);
        assert_eq!(result[1].value, 1.0);
        assert_eq!(result[2].value, 1.0);
    }

    #[test]
    fn test_sma_period_larger_than_data() {
        let data = points(&[1.0, 2.0, 3.0]);
        assert!(sma(&data, 10).is_empty());
        assert!(sma(&data, 0).is_empty());
    }

    #[test]
    fn test_ema_seed_is_sma() {
        let data = points(&[10.0, 11.0, 12.0, 11.0, 10.0, 11.0, 12.0, 13.0]);
        let result = ema(&data, 3);
        let seed = sma(&data[..3], 3);

        assert_eq!(result.len(), data.len() - 3 + 1);
        assert_abs_diff_eq!(result[0].value, seed[0].value, epsilon = 1e-9);
        assert_eq!(result[0].timestamp, 2000);
    }

    #[test]
    fn test_ema_recurrence() {
        let data = points(&[10.0, 11.0, 12.0, 13.0]);
        let result = ema(&data, 3);

        // seed = 11, k = 0.5 -> (13 - 11) * 0.5 + 11 = 12
        assert_abs_diff_eq!(result[1].value, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ema_responsiveness() {
        // EMA should react faster to price changes than SMA
        let data = points(
            &(0..20)
                .map(|i| if i < 10 { 100.0 } else { 150.0 })
                .collect::<Vec<_>>(),
        );

        let sma_result = sma(&data, 5);
        let ema_result = ema(&data, 5);

        // Both start at index 4, so offsets line up
        assert!(ema_result[7].value > sma_result[7].value);
        assert!(ema_result[6].value > sma_result[6].value);
    }

    #[test]
    fn test_empty_data() {
        let data: Vec<IndicatorPoint> = vec![];
        assert!(sma(&data, 3).is_empty());
        assert!(ema(&data, 3).is_empty());
    }
}
