//! Data source trait and wrappers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::SeriesCache;
use crate::types::{RawPoint, TimeRange};

/// Upstream provider of raw price points.
///
/// This trait uses `anyhow::Result`; the chart session turns failures into
/// its own error state. Timeouts and retries are the implementor's concern.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_series(&self, symbol: &str, range: TimeRange) -> anyhow::Result<Vec<RawPoint>>;
}

#[async_trait]
impl<T: DataSource + ?Sized> DataSource for Arc<T> {
    async fn fetch_series(&self, symbol: &str, range: TimeRange) -> anyhow::Result<Vec<RawPoint>> {
        (**self).fetch_series(symbol, range).await
    }
}

/// Source returning a fixed response for every request.
#[derive(Debug, Clone)]
pub struct StaticSource {
    response: std::result::Result<Vec<RawPoint>, String>,
}

impl StaticSource {
    pub fn new(points: Vec<RawPoint>) -> Self {
        Self {
            response: Ok(points),
        }
    }

    /// Source whose every fetch fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
        }
    }

    /// Source backed by a JSON array of raw points.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let points: Vec<RawPoint> = serde_json::from_str(json)?;
        Ok(Self::new(points))
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch_series(&self, _symbol: &str, _range: TimeRange) -> anyhow::Result<Vec<RawPoint>> {
        match &self.response {
            Ok(points) => Ok(points.clone()),
            Err(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }
}

/// Wraps a source with a response cache keyed by symbol and range.
///
/// Only successful responses are cached.
pub struct CachedSource<S, C> {
    inner: S,
    cache: C,
    ttl: Duration,
}

impl<S, C> CachedSource<S, C>
where
    S: DataSource,
    C: SeriesCache,
{
    pub fn new(inner: S, cache: C, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    /// Cache key for a request: `"{SYMBOL}:{range}"`.
    pub fn cache_key(symbol: &str, range: TimeRange) -> String {
        format!("{}:{}", symbol.trim().to_uppercase(), range)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

#[async_trait]
impl<S, C> DataSource for CachedSource<S, C>
where
    S: DataSource,
    C: SeriesCache,
{
    async fn fetch_series(&self, symbol: &str, range: TimeRange) -> anyhow::Result<Vec<RawPoint>> {
        let key = Self::cache_key(symbol, range);

        if let Some(points) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {} ({} points)", key, points.len());
            return Ok(points);
        }

        let points = self.inner.fetch_series(symbol, range).await?;
        self.cache.set(&key, points.clone(), self.ttl);
        Ok(points)
    }
}
