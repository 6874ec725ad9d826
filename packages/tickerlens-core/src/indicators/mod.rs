//! Technical indicators for chart overlays.
//!
//! All functions are pure: they take an ordered series and return new
//! sequences tagged with the timestamps they belong to. Warm-up samples are
//! omitted rather than zero-filled, and insufficient data yields empty output
//! instead of an error.
//!
//! - **SMA**: Simple Moving Average
//! - **EMA**: Exponential Moving Average
//! - **RSI**: Relative Strength Index
//! - **MACD**: Moving Average Convergence Divergence
//! - **Bollinger Bands**: SMA envelope at a multiple of the population std dev

mod registry;
mod rsi;
mod sma;

use serde::{Deserialize, Serialize};

use crate::types::{IndicatorPoint, Sample};

pub use registry::{
    available_indicators, descriptor, IndicatorDescriptor, IndicatorId, IndicatorOutput,
};
pub use rsi::{rsi, DEFAULT_RSI_PERIOD};
pub use sma::{ema, sma};

/// Default Bollinger lookback.
pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;

/// Default Bollinger band width in standard deviations.
pub const DEFAULT_BOLLINGER_MULTIPLIER: f64 = 2.0;

/// Default MACD periods (fast, slow, signal).
pub const DEFAULT_MACD_PERIODS: (usize, usize, usize) = (12, 26, 9);

/// Bollinger Bands result. All three bands share timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    /// Upper band (middle + multiplier * std)
    pub upper: Vec<IndicatorPoint>,
    /// Middle band (SMA)
    pub middle: Vec<IndicatorPoint>,
    /// Lower band (middle - multiplier * std)
    pub lower: Vec<IndicatorPoint>,
}

impl BollingerBands {
    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }
}

/// Calculate Bollinger Bands.
///
/// # Arguments
///
/// * `series` - Ordered samples
/// * `period` - Lookback period (typically 20)
/// * `multiplier` - Number of standard deviations (typically 2.0)
///
/// # Returns
///
/// Bands aligned with `sma(series, period)`. The deviation is the population
/// standard deviation of each window (divides by `period`).
pub fn bollinger_bands<S: Sample>(series: &[S], period: usize, multiplier: f64) -> BollingerBands {
    let middle = sma(series, period);
    if middle.is_empty() {
        return BollingerBands::default();
    }

    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());

    for (offset, mid) in middle.iter().enumerate() {
        let window = &series[offset..offset + period];
        let variance = window
            .iter()
            .map(|s| (s.price() - mid.value).powi(2))
            .sum::<f64>()
            / period as f64;
        let band = multiplier * variance.sqrt();

        upper.push(IndicatorPoint::new(mid.timestamp, mid.value + band));
        lower.push(IndicatorPoint::new(mid.timestamp, mid.value - band));
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

/// MACD (Moving Average Convergence Divergence) result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    /// MACD line (fast EMA - slow EMA)
    pub macd_line: Vec<IndicatorPoint>,
    /// Signal line (EMA of MACD line)
    pub signal_line: Vec<IndicatorPoint>,
    /// Histogram (MACD - Signal)
    pub histogram: Vec<IndicatorPoint>,
}

impl Macd {
    pub fn is_empty(&self) -> bool {
        self.macd_line.is_empty()
    }
}

/// Calculate MACD indicator.
///
/// # Arguments
///
/// * `series` - Ordered samples
/// * `fast_period` - Fast EMA period (typically 12)
/// * `slow_period` - Slow EMA period (typically 26)
/// * `signal_period` - Signal line EMA period (typically 9)
///
/// # Returns
///
/// The MACD line starts at the slow EMA's first timestamp. The signal line is
/// an EMA over the MACD line, and the histogram follows the signal line's
/// timestamps. Everything is empty when the series is shorter than the slow
/// period.
pub fn macd<S: Sample>(
    series: &[S],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Macd {
    let longest = fast_period.max(slow_period);
    if fast_period == 0 || slow_period == 0 || series.len() < longest {
        return Macd::default();
    }

    let fast_ema = ema(series, fast_period);
    let slow_ema = ema(series, slow_period);

    // ema(p)[k] belongs to series[k + p - 1]
    let macd_line: Vec<IndicatorPoint> = (longest - 1..series.len())
        .map(|i| {
            let fast = fast_ema[i + 1 - fast_period].value;
            let slow = slow_ema[i + 1 - slow_period].value;
            IndicatorPoint::new(series[i].timestamp(), fast - slow)
        })
        .collect();

    let signal_line = ema(&macd_line, signal_period);

    let histogram = signal_line
        .iter()
        .enumerate()
        .map(|(j, signal)| {
            let line = macd_line[j + signal_period - 1];
            IndicatorPoint::new(signal.timestamp, line.value - signal.value)
        })
        .collect();

    Macd {
        macd_line,
        signal_line,
        histogram,
    }
}
