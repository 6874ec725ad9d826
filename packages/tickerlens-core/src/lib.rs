//! TickerLens Core - Technical indicators and zoomable chart series.
//!
//! This crate is the numeric heart of the TickerLens portfolio app:
//!
//! - **Indicator engine**: SMA, EMA, RSI, MACD, Bollinger Bands over a price series
//! - **Indicator registry**: a closed set of chart overlays addressable by id
//! - **Chart series**: sanitizing, sorting and trimming raw OHLC points
//! - **Zoom window**: percentage-based zoom/pan with a minimum visible floor
//! - **Chart session**: Loading/Ready/Error state machine with stale-fetch gating
//! - **Portfolio valuation**: holdings priced from the latest close of a series
//!
//! # Example
//!
//! ```rust
//! use tickerlens_core::{ingest, sma, RawPoint, MAX_SERIES_POINTS};
//!
//! let raw: Vec<RawPoint> = (0..50)
//!     .map(|i| RawPoint::from_close(i * 86_400_000, 100.0 + i as f64))
//!     .collect();
//! let report = ingest(&raw, MAX_SERIES_POINTS).unwrap();
//! let sma20 = sma(report.series.points(), 20);
//! assert_eq!(sma20.len(), 31);
//! ```

pub mod cache;
pub mod chart;
pub mod config;
pub mod indicators;
pub mod portfolio;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, IndicatorPoint, PriceDomain, PricePoint, RawNumber, RawPoint, Sample,
    SeriesSummary, TimeRange, ZoomWindow,
};

// Re-export main functionality
pub use cache::{InMemoryCache, NoopCache, SeriesCache};
pub use chart::{
    compute_overlays, domain, ingest, ChartSession, FetchOutcome, FetchTicket, IndicatorOverlay,
    IngestReport, PendingFetch, Series, SessionState, ZoomLimits, ZoomState,
};
pub use config::{ChartConfig, MAX_SERIES_POINTS, MIN_VISIBLE_POINTS, MIN_ZOOM_WIDTH_PERCENT};
pub use indicators::{
    available_indicators, bollinger_bands, descriptor, ema, macd, rsi, sma, BollingerBands,
    IndicatorDescriptor, IndicatorId, IndicatorOutput, Macd,
};
pub use portfolio::{valuate, Holding, HoldingValuation, Holdings, PortfolioValuation};
pub use source::{CachedSource, DataSource, StaticSource};

/// Message shown when a fetch produced no usable points.
pub const EMPTY_SERIES_MESSAGE: &str = "No chart data available";

/// Message shown when an upstream failure carried no text of its own.
pub const FETCH_FALLBACK_MESSAGE: &str = "Failed to load chart data";

/// Error types for tickerlens-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("No chart data available")]
    EmptySeries,

    #[error("{0}")]
    Fetch(String),

    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("Holding not found: {0}")]
    HoldingNotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Build a fetch error from an upstream failure, substituting the generic
    /// message when the upstream one is blank.
    pub fn fetch(err: &anyhow::Error) -> Self {
        let message = err.to_string();
        if message.trim().is_empty() {
            Error::Fetch(FETCH_FALLBACK_MESSAGE.to_string())
        } else {
            Error::Fetch(message)
        }
    }
}

/// Result type for tickerlens-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_message() {
        assert_eq!(Error::EmptySeries.to_string(), EMPTY_SERIES_MESSAGE);
    }

    #[test]
    fn test_fetch_error_keeps_upstream_message() {
        let err = anyhow::anyhow!("503 Service Unavailable");
        assert_eq!(Error::fetch(&err).to_string(), "503 Service Unavailable");
    }

    #[test]
    fn test_fetch_error_fallback() {
        let err = anyhow::anyhow!("  ");
        assert_eq!(Error::fetch(&err).to_string(), FETCH_FALLBACK_MESSAGE);
    }
}
