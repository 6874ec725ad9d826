//! Chart session: one symbol and time range, its series, zoom and overlays.
//!
//! A session moves `Loading -> Ready` or `Loading -> Error`. Every fetch is
//! issued with a [`FetchTicket`]; results are applied only while their ticket
//! is current, so a slow response for a previous symbol can never overwrite
//! the newer one. Starting a fetch also aborts the one in flight.

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::overlay::{compute_overlays, IndicatorOverlay};
use super::series::{domain, ingest, Series};
use super::zoom::ZoomState;
use crate::config::ChartConfig;
use crate::indicators::IndicatorId;
use crate::source::DataSource;
use crate::types::{PriceDomain, PricePoint, RawPoint, SeriesSummary, TimeRange, ZoomWindow};
use crate::Error;

/// Session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum SessionState {
    Loading,
    Ready,
    Error(String),
}

/// Identifies one fetch. Only the ticket of the latest fetch is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub symbol: String,
    pub range: TimeRange,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of running a fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    Completed {
        ticket: FetchTicket,
        result: anyhow::Result<Vec<RawPoint>>,
    },
    /// A newer fetch or session teardown cancelled this one
    Aborted(FetchTicket),
}

/// A fetch that has been issued but not yet run.
#[derive(Debug)]
pub struct PendingFetch {
    ticket: FetchTicket,
    registration: AbortRegistration,
}

impl PendingFetch {
    pub fn ticket(&self) -> &FetchTicket {
        &self.ticket
    }

    /// Fetch raw points for this ticket, stopping early if it is aborted.
    pub async fn run<S: DataSource + ?Sized>(self, source: &S) -> FetchOutcome {
        let PendingFetch {
            ticket,
            registration,
        } = self;

        let fetch = source.fetch_series(&ticket.symbol, ticket.range);
        let result = Abortable::new(fetch, registration).await;

        match result {
            Ok(result) => FetchOutcome::Completed { ticket, result },
            Err(_) => FetchOutcome::Aborted(ticket),
        }
    }
}

/// State of one chart view.
#[derive(Debug)]
pub struct ChartSession {
    symbol: String,
    range: TimeRange,
    config: ChartConfig,
    state: SessionState,
    series: Series,
    zoom: ZoomState,
    active: Vec<IndicatorId>,
    generation: u64,
    in_flight: Option<AbortHandle>,
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

impl ChartSession {
    /// Create a session in `Loading`, using the configured default range.
    pub fn new(symbol: &str, config: ChartConfig) -> Self {
        let zoom = ZoomState::new(0, config.zoom_limits());
        Self {
            symbol: normalize_symbol(symbol),
            range: config.default_range,
            config,
            state: SessionState::Loading,
            series: Series::empty(),
            zoom,
            active: Vec::new(),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn time_range(&self) -> TimeRange {
        self.range
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Message to show when the session is in `Error`.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn zoom_window(&self) -> ZoomWindow {
        self.zoom.window()
    }

    /// Issue a fetch for the current symbol and range.
    ///
    /// Aborts any fetch in flight, invalidates its ticket and moves the
    /// session to `Loading` with an empty series.
    pub fn begin_fetch(&mut self) -> PendingFetch {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }

        self.generation += 1;
        let (handle, registration) = AbortHandle::new_pair();
        self.in_flight = Some(handle);
        self.state = SessionState::Loading;
        self.series = Series::empty();

        debug!(
            "Fetch #{} for {} {}",
            self.generation, self.symbol, self.range
        );

        PendingFetch {
            ticket: FetchTicket {
                generation: self.generation,
                symbol: self.symbol.clone(),
                range: self.range,
            },
            registration,
        }
    }

    /// Switch to another symbol and start fetching it.
    pub fn set_symbol(&mut self, symbol: &str) -> PendingFetch {
        self.symbol = normalize_symbol(symbol);
        self.zoom.set_len(0);
        info!("Chart symbol set to {} ({})", self.symbol, self.range);
        self.begin_fetch()
    }

    /// Switch to another time range and start fetching it.
    pub fn set_time_range(&mut self, range: TimeRange) -> PendingFetch {
        self.range = range;
        self.zoom.set_len(0);
        info!("Chart range set to {} for {}", self.range, self.symbol);
        self.begin_fetch()
    }

    /// Fetch the current symbol and range again, keeping the zoom window.
    pub fn retry(&mut self) -> PendingFetch {
        info!("Retrying {} {}", self.symbol, self.range);
        self.begin_fetch()
    }

    /// Whether results for `ticket` may still be applied.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
            && ticket.symbol == self.symbol
            && ticket.range == self.range
    }

    /// Apply the result of a fetch.
    ///
    /// Returns `false` and leaves the session untouched when the ticket is
    /// stale. Otherwise the session becomes `Ready`, or `Error` when the
    /// fetch failed or produced no usable points.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: anyhow::Result<Vec<RawPoint>>,
    ) -> bool {
        if !self.is_current(ticket) {
            warn!(
                "Discarding stale response for {} {} (fetch #{}, current #{})",
                ticket.symbol, ticket.range, ticket.generation, self.generation
            );
            return false;
        }

        self.in_flight = None;

        let report = result
            .map_err(|err| Error::fetch(&err))
            .and_then(|raw| ingest(&raw, self.config.max_points));

        match report {
            Ok(report) => {
                self.series = report.series;
                self.zoom.rebase(self.series.len());
                self.state = SessionState::Ready;
                info!(
                    "Chart ready: {} {} with {} points",
                    self.symbol,
                    self.range,
                    self.series.len()
                );
            }
            Err(err) => {
                warn!("Chart load failed for {} {}: {}", self.symbol, self.range, err);
                self.series = Series::empty();
                self.zoom.rebase(0);
                self.state = SessionState::Error(err.to_string());
            }
        }

        true
    }

    /// Apply a finished [`PendingFetch::run`].
    pub fn apply_outcome(&mut self, outcome: FetchOutcome) -> bool {
        match outcome {
            FetchOutcome::Completed { ticket, result } => self.complete_fetch(&ticket, result),
            FetchOutcome::Aborted(ticket) => {
                debug!("Fetch #{} for {} was aborted", ticket.generation, ticket.symbol);
                false
            }
        }
    }

    /// Fetch the current symbol and range from `source` and apply the result.
    pub async fn load<S: DataSource + ?Sized>(&mut self, source: &S) -> bool {
        let pending = self.begin_fetch();
        let outcome = pending.run(source).await;
        self.apply_outcome(outcome)
    }

    /// Abort the fetch in flight, if any. Its result will be discarded.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            self.generation += 1;
        }
    }

    /// Points inside the zoom window. Empty unless `Ready`.
    pub fn visible_slice(&self) -> &[PricePoint] {
        self.series.slice(self.zoom.visible_range())
    }

    /// Vertical extent of the visible slice.
    pub fn domain(&self) -> Option<PriceDomain> {
        domain(self.visible_slice())
    }

    /// Header figures for the visible slice.
    pub fn summary(&self) -> Option<SeriesSummary> {
        SeriesSummary::from_points(self.visible_slice())
    }

    pub fn active_indicators(&self) -> &[IndicatorId] {
        &self.active
    }

    /// Replace the active indicator selection. Duplicates are ignored.
    pub fn set_active_indicators<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = IndicatorId>,
    {
        self.active.clear();
        for id in ids {
            if !self.active.contains(&id) {
                self.active.push(id);
            }
        }
    }

    /// Toggle one indicator. Returns whether it is now active.
    pub fn toggle_indicator(&mut self, id: IndicatorId) -> bool {
        if let Some(pos) = self.active.iter().position(|&active| active == id) {
            self.active.remove(pos);
            false
        } else {
            self.active.push(id);
            true
        }
    }

    /// Overlays for the active indicators, filtered to the visible slice.
    pub fn active_indicator_overlays(&self) -> Vec<IndicatorOverlay> {
        if self.series.is_empty() {
            return Vec::new();
        }
        compute_overlays(self.series.points(), self.visible_slice(), &self.active)
    }

    pub fn set_zoom_window(&mut self, from: f64, to: f64) -> ZoomWindow {
        self.zoom.set_window(from, to)
    }

    pub fn apply_pinch(&mut self, scale: f64, center_percent: f64) -> ZoomWindow {
        self.zoom.pinch(scale, center_percent)
    }

    pub fn apply_pan(&mut self, delta_percent: f64) -> ZoomWindow {
        self.zoom.pan(delta_percent)
    }

    pub fn apply_pan_pixels(&mut self, translation_px: f64, chart_width_px: f64) -> ZoomWindow {
        self.zoom.pan_pixels(translation_px, chart_width_px)
    }

    pub fn reset_zoom(&mut self) -> ZoomWindow {
        self.zoom.reset()
    }
}

impl Drop for ChartSession {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
