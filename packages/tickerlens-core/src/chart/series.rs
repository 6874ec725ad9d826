//! Raw point sanitization and the bounded working series.

use std::ops::Range;

use serde::Serialize;

use crate::types::{PriceDomain, PricePoint, RawNumber, RawPoint};
use crate::{Error, Result};

/// An ordered, sanitized price series.
///
/// Points are sorted ascending by timestamp and satisfy the OHLC envelope
/// (`low <= open, close <= high`). A series is replaced wholesale when the
/// symbol or range changes, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    points: Vec<PricePoint>,
}

impl Series {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Most recent close, used as the quote for portfolio valuation.
    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    /// Points in `range`, clamped to the series bounds.
    pub fn slice(&self, range: Range<usize>) -> &[PricePoint] {
        let end = range.end.min(self.points.len());
        let start = range.start.min(end);
        &self.points[start..end]
    }
}

/// Outcome of ingesting one batch of raw points.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub series: Series,
    /// Points rejected by sanitization
    pub dropped: usize,
    /// Oldest valid points cut to respect the length cap
    pub truncated: usize,
}

fn field(value: &Option<RawNumber>) -> Option<f64> {
    value.as_ref().and_then(RawNumber::coerce)
}

/// Validate and normalize one raw point.
///
/// Returns `None` when any required field (timestamp, value/close, open,
/// high, low) is missing or non-finite. High and low are widened to enclose
/// open and close. An invalid volume is discarded without dropping the point.
pub fn sanitize_point(raw: &RawPoint) -> Option<PricePoint> {
    let timestamp = field(&raw.timestamp)?;
    let value = field(&raw.value).or_else(|| field(&raw.close))?;
    let close = field(&raw.close).or_else(|| field(&raw.value))?;
    let open = field(&raw.open)?;
    let high = field(&raw.high)?;
    let low = field(&raw.low)?;

    let corrected_high = high.max(open).max(close).max(low);
    let corrected_low = low.min(open).min(close).min(high);
    if !corrected_high.is_finite() || !corrected_low.is_finite() {
        return None;
    }

    let volume = field(&raw.volume).filter(|v| *v >= 0.0);

    Some(PricePoint {
        timestamp: timestamp as i64,
        value,
        open,
        high: corrected_high,
        low: corrected_low,
        close,
        volume,
    })
}

/// Sanitize, sort and trim raw points into a working series.
///
/// Invalid points are dropped silently (counted in the report). The result
/// keeps only the most recent `max_points` points.
///
/// # Errors
///
/// [`Error::EmptySeries`] when no point survives sanitization.
pub fn ingest(raw: &[RawPoint], max_points: usize) -> Result<IngestReport> {
    let mut points: Vec<PricePoint> = raw.iter().filter_map(sanitize_point).collect();
    let dropped = raw.len() - points.len();

    if points.is_empty() {
        tracing::debug!("Ingest produced no usable points ({} dropped)", dropped);
        return Err(Error::EmptySeries);
    }

    points.sort_by_key(|p| p.timestamp);

    let cap = max_points.max(1);
    let truncated = points.len().saturating_sub(cap);
    if truncated > 0 {
        points.drain(..truncated);
    }

    tracing::debug!(
        "Ingested {} points ({} dropped, {} truncated)",
        points.len(),
        dropped,
        truncated
    );

    Ok(IngestReport {
        series: Series { points },
        dropped,
        truncated,
    })
}

/// Vertical extent of a slice: the lowest low or value and the highest high
/// or value. `None` for an empty slice.
pub fn domain(points: &[PricePoint]) -> Option<PriceDomain> {
    if points.is_empty() {
        return None;
    }

    let (min, max) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(min, max), p| (min.min(p.low).min(p.value), max.max(p.high).max(p.value)),
    );

    Some(PriceDomain { min, max })
}
