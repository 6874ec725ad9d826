//! Relative Strength Index (RSI) indicator.

use crate::types::{IndicatorPoint, Sample};

/// Default RSI lookback.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Relative strength substituted when the average loss is zero.
const ZERO_LOSS_RS: f64 = 100.0;

const NEUTRAL_RSI: f64 = 50.0;

/// Calculate RSI value from average gain and average loss.
///
/// A zero average loss uses `RS = 100`, so a series with no losses saturates
/// at `100 - 100 / 101` (about 99.0099) rather than at 100.
// TODO: confirm with product whether zero-loss windows should read exactly 100.
#[inline]
fn calculate_rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = if avg_loss == 0.0 {
        ZERO_LOSS_RS
    } else {
        avg_gain / avg_loss
    };
    if rs.is_nan() {
        // Averages overflowed; treat gains and losses as balanced
        return NEUTRAL_RSI;
    }
    100.0 - (100.0 / (1.0 + rs))
}

/// Calculate Relative Strength Index.
///
/// Formula:
/// 1. Calculate price changes between neighbouring samples
/// 2. Separate gains and losses (losses stored as positive magnitudes)
/// 3. Seed average gain/loss with the mean of the first `period` changes
/// 4. Wilder smoothing: `avg = (prev_avg * (period - 1) + current) / period`
/// 5. RSI = 100 - (100 / (1 + RS))
///
/// # Arguments
///
/// * `series` - Ordered samples (closes for price points)
/// * `period` - Lookback period (typically 14)
///
/// # Returns
///
/// `series.len() - period` values in `[0, 100]`, each tagged with the later
/// timestamp of its comparison pair. Empty when fewer than `period + 1`
/// samples are available.
///
/// # Example
///
/// ```rust
/// use tickerlens_core::{rsi, IndicatorPoint};
///
/// let prices: Vec<IndicatorPoint> = [44.0, 44.25, 44.5, 43.75, 44.5, 44.25, 44.5, 44.0,
///     43.5, 44.0, 44.25, 44.0, 43.5, 44.0, 44.5, 44.25, 44.0]
///     .iter()
///     .enumerate()
///     .map(|(i, &p)| IndicatorPoint::new(i as i64, p))
///     .collect();
/// let rsi_values = rsi(&prices, 14);
///
/// assert_eq!(rsi_values.len(), 3);
/// for point in &rsi_values {
///     assert!(point.value >= 0.0 && point.value <= 100.0);
/// }
/// ```
pub fn rsi<S: Sample>(series: &[S], period: usize) -> Vec<IndicatorPoint> {
    let n = series.len();
    if period == 0 || n < period + 1 {
        return Vec::new();
    }

    // changes[j] compares series[j] with series[j + 1]. Changes are halved so
    // the difference of two extreme prices stays finite; RS is scale-free.
    let (gains, losses): (Vec<f64>, Vec<f64>) = series
        .windows(2)
        .map(|pair| {
            let change = pair[1].price() * 0.5 - pair[0].price() * 0.5;
            if change > 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            }
        })
        .unzip();

    let p = period as f64;
    let mut avg_gain: f64 = gains[..period].iter().map(|g| g / p).sum();
    let mut avg_loss: f64 = losses[..period].iter().map(|l| l / p).sum();

    let mut result = Vec::with_capacity(n - period);
    result.push(IndicatorPoint::new(
        series[period].timestamp(),
        calculate_rsi_value(avg_gain, avg_loss),
    ));

    // Wilder smoothing, (avg * (p - 1) + x) / p, in a form that cannot overflow
    for j in period..gains.len() {
        avg_gain += (gains[j] - avg_gain) / p;
        avg_loss += (losses[j] - avg_loss) / p;

        result.push(IndicatorPoint::new(
            series[j + 1].timestamp(),
            calculate_rsi_value(avg_gain, avg_loss),
        ));
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
            .map(|(i, &p)| IndicatorPoint::new(i as i64, p))
            .collect()
    }

    #[test]
    fn test_rsi_basic() {
        // Trending down strongly should give low RSI
        let down: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let rsi_down = rsi(&points(&down), 14);
        assert!(rsi_down.last().unwrap().value < 30.0);

        // Mostly up with small dips should give high RSI
        let up: Vec<f64> = (0..20)
            .map(|i| 100.0 + i as f64 * 2.0 - if i % 5 == 0 { 3.0 } else { 0.0 })
            .collect();
        let rsi_up = rsi(&points(&up), 14);
        assert!(rsi_up.last().unwrap().value > 70.0);
    }

    #[test]
    fn test_rsi_length_and_timestamps() {
        let data: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64).sin()).collect();
        let result = rsi(&points(&data), 14);

        assert_eq!(result.len(), 30 - 14);
        assert_eq!(result[0].timestamp, 14);
        assert_eq!(result.last().unwrap().timestamp, 29);
    }

    #[test]
    fn test_rsi_range() {
        let data: Vec<f64> = (0..50)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 10.0)
            .collect();

        for point in rsi(&points(&data), 14) {
            assert!(point.value >= 0.0 && point.value <= 100.0);
        }
    }

    #[test]
    fn test_rsi_zero_loss_convention() {
        let up: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let result = rsi(&points(&up), 14);

        let expected = 100.0 - 100.0 / 101.0;
        for point in &result {
            assert_abs_diff_eq!(point.value, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rsi_flat_series_uses_zero_loss_convention() {
        let flat = vec![50.0; 16];
        let result = rsi(&points(&flat), 14);
        assert_abs_diff_eq!(result[0].value, 100.0 - 100.0 / 101.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rsi_all_losses() {
        let down: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let result = rsi(&points(&down), 14);
        assert_abs_diff_eq!(result[0].value, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rsi_wilder_smoothing() {
        // period 2: changes +2, -1, +1
        let result = rsi(&points(&[10.0, 12.0, 11.0, 12.0]), 2);
        assert_eq!(result.len(), 2);

        // seed: gain 1.0, loss 0.5 -> RS 2 -> 66.67
        assert_abs_diff_eq!(result[0].value, 100.0 - 100.0 / 3.0, epsilon = 1e-9);
        // gain (1 + 1) / 2 = 1, loss (0.5 + 0) / 2 = 0.25 -> RS 4 -> 80
        assert_abs_diff_eq!(result[1].value, 80.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rsi_extreme_prices_stay_in_range() {
        let result = rsi(&points(&[1e308, -1e308, 1e308, -1e308]), 2);
        assert_eq!(result.len(), 2);

        // changes -2e308, +2e308, -2e308: seed balanced, then losses dominate
        assert_abs_diff_eq!(result[0].value, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result[1].value, 25.0, epsilon = 1e-9);

        let swings = points(&[f64::MAX, f64::MIN, f64::MAX, f64::MIN, f64::MAX]);
        for point in rsi(&swings, 2) {
            assert!((0.0..=100.0).contains(&point.value));
        }
    }

    #[test]
    fn test_rsi_value_with_infinite_averages() {
        assert_eq!(calculate_rsi_value(f64::INFINITY, f64::INFINITY), 50.0);
        assert_eq!(calculate_rsi_value(f64::INFINITY, 1.0), 100.0);
        assert_eq!(calculate_rsi_value(1.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_rsi_short_data() {
        let data = points(&[100.0, 101.0, 102.0, 101.0, 100.0]);
        assert!(rsi(&data, 14).is_empty());
        assert!(rsi(&data, 0).is_empty());

        // Exactly period samples is still one short
        let fourteen = points(&[1.0; 14]);
        assert!(rsi(&fourteen, 14).is_empty());
    }
}
