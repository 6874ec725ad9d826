//! Core data types for the TickerLens chart engine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Anything carrying a timestamp and a single price an indicator can consume.
///
/// Price points feed their close; indicator points feed their value, which is
/// how MACD runs an EMA over its own output.
pub trait Sample {
    fn timestamp(&self) -> i64;
    fn price(&self) -> f64;
}

/// One sanitized sample of a price series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Primary series value (close price)
    pub value: f64,
    pub open: f64,
    /// Always the maximum of open/high/low/close
    pub high: f64,
    /// Always the minimum of open/high/low/close
    pub low: f64,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl PricePoint {
    /// Timestamp as a UTC datetime, if it is representable.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

impl Sample for PricePoint {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn price(&self) -> f64 {
        self.close
    }
}

/// A numeric field as delivered by an upstream API: either a JSON number or a
/// numeric string such as `"187.42"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    /// Coerce to a finite `f64`, or `None` when the field is unusable.
    pub fn coerce(&self) -> Option<f64> {
        let value = match self {
            RawNumber::Number(n) => *n,
            RawNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Number(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

/// An unvalidated point from a data source.
///
/// `value` and `close` are interchangeable: whichever is missing is taken from
/// the other during sanitization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawPoint {
    #[serde(default)]
    pub timestamp: Option<RawNumber>,
    #[serde(default)]
    pub value: Option<RawNumber>,
    #[serde(default)]
    pub open: Option<RawNumber>,
    #[serde(default)]
    pub high: Option<RawNumber>,
    #[serde(default)]
    pub low: Option<RawNumber>,
    #[serde(default)]
    pub close: Option<RawNumber>,
    #[serde(default)]
    pub volume: Option<RawNumber>,
}

impl RawPoint {
    /// Raw OHLC point with close doubling as value.
    pub fn ohlc(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp: Some(RawNumber::Number(timestamp as f64)),
            value: None,
            open: Some(open.into()),
            high: Some(high.into()),
            low: Some(low.into()),
            close: Some(close.into()),
            volume: None,
        }
    }

    /// Raw point where every price field equals `close`.
    pub fn from_close(timestamp: i64, close: f64) -> Self {
        Self::ohlc(timestamp, close, close, close, close)
    }

    /// Attach a volume.
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume.into());
        self
    }
}

/// One output sample of an indicator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: i64,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

impl Sample for IndicatorPoint {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn price(&self) -> f64 {
        self.value
    }
}

/// Vertical extent of a visible slice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceDomain {
    pub min: f64,
    pub max: f64,
}

/// Visible fraction of a series, as percentages in `[0, 100]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ZoomWindow {
    pub from: f64,
    pub to: f64,
}

impl ZoomWindow {
    /// The whole series.
    pub const FULL: ZoomWindow = ZoomWindow {
        from: 0.0,
        to: 100.0,
    };

    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    /// Width of the window in percent.
    pub fn width(&self) -> f64 {
        self.to - self.from
    }

    /// Midpoint of the window in percent.
    pub fn center(&self) -> f64 {
        (self.from + self.to) / 2.0
    }
}

impl Default for ZoomWindow {
    fn default() -> Self {
        Self::FULL
    }
}

/// Chart time range offered by the data sources.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum TimeRange {
    #[serde(rename = "1D")]
    #[strum(serialize = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    #[strum(serialize = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    #[strum(serialize = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    #[strum(serialize = "3M")]
    ThreeMonths,
    #[serde(rename = "1Y")]
    #[strum(serialize = "1Y")]
    OneYear,
    #[serde(rename = "ALL")]
    #[strum(serialize = "ALL")]
    All,
}

impl TimeRange {
    /// How far back the range reaches; `None` for the full history.
    pub fn lookback(&self) -> Option<Duration> {
        match self {
            TimeRange::OneDay => Some(Duration::days(1)),
            TimeRange::OneWeek => Some(Duration::weeks(1)),
            TimeRange::OneMonth => Some(Duration::days(30)),
            TimeRange::ThreeMonths => Some(Duration::days(90)),
            TimeRange::OneYear => Some(Duration::days(365)),
            TimeRange::All => None,
        }
    }

    /// Earliest instant covered by this range when viewed at `now`.
    pub fn start_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.lookback().map(|lookback| now - lookback)
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::OneMonth
    }
}

/// Header figures for a visible slice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeriesSummary {
    /// First close in the slice
    pub first: f64,
    /// Last close in the slice
    pub last: f64,
    /// `last - first`
    pub change: f64,
    /// Change relative to `first`; 0 when `first` is 0
    pub change_percent: f64,
    /// Highest high in the slice
    pub high: f64,
    /// Lowest low in the slice
    pub low: f64,
}

impl SeriesSummary {
    /// Summarize a slice; `None` when it is empty.
    pub fn from_points(points: &[PricePoint]) -> Option<Self> {
        let first = points.first()?.close;
        let last = points.last()?.close;
        let change = last - first;
        let change_percent = if first != 0.0 {
            (change / first) * 100.0
        } else {
            0.0
        };
        let high = points.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
        let low = points.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);

        Some(Self {
            first,
            last,
            change,
            change_percent,
            high,
            low,
        })
    }
}

/// API response envelope used by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
