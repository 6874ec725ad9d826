//! Percentage zoom window over a series.
//!
//! The window is kept in percent of the series so it survives a reload of the
//! same range; the visible index range is derived from it on every change.

use std::ops::Range;

use crate::config::{MIN_VISIBLE_POINTS, MIN_ZOOM_WIDTH_PERCENT};
use crate::types::ZoomWindow;

/// Guards floor/ceil against representation error in `percent * n / 100`.
const INDEX_EPSILON: f64 = 1e-9;

/// Bounds applied to every zoom change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    /// Fewest points a slice may show (capped at the series length)
    pub min_visible_points: usize,
    /// Narrowest window a pinch may produce, in percent
    pub min_width_percent: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_visible_points: MIN_VISIBLE_POINTS,
            min_width_percent: MIN_ZOOM_WIDTH_PERCENT,
        }
    }
}

/// Clamp both edges into `[0, 100]` and order them. Non-finite edges fall
/// back to the series bounds.
fn normalize(window: ZoomWindow) -> ZoomWindow {
    let from = if window.from.is_finite() { window.from.clamp(0.0, 100.0) } else { 0.0 };
    let to = if window.to.is_finite() { window.to.clamp(0.0, 100.0) } else { 100.0 };
    if from <= to {
        ZoomWindow::new(from, to)
    } else {
        ZoomWindow::new(to, from)
    }
}

/// Place a window of `width` percent starting at `from`, slid back inside
/// `[0, 100]` without changing its width.
fn slide(from: f64, width: f64) -> ZoomWindow {
    let width = width.clamp(0.0, 100.0);
    if from < 0.0 {
        ZoomWindow::new(0.0, width)
    } else if from + width > 100.0 {
        ZoomWindow::new(100.0 - width, 100.0)
    } else {
        ZoomWindow::new(from, from + width)
    }
}

/// Index range of an already-normalized window, before the visibility floor.
fn natural_range(window: ZoomWindow, len: usize) -> Range<usize> {
    let n = len as f64;
    let start = ((window.from * n / 100.0) + INDEX_EPSILON).floor() as usize;
    let end = ((window.to * n / 100.0) - INDEX_EPSILON).ceil().max(0.0) as usize;
    let start = start.min(len);
    start..end.clamp(start, len)
}

/// Convert a percentage window into the index range of the visible slice.
///
/// The start is `floor(from% * len)` and the end `ceil(to% * len)`. When that
/// covers fewer than `min(min_visible, len)` points, the start is pulled back
/// first; if it hits index 0 the end is pushed forward instead.
pub fn window_to_range(window: ZoomWindow, len: usize, min_visible: usize) -> Range<usize> {
    if len == 0 {
        return 0..0;
    }

    let Range { mut start, mut end } = natural_range(normalize(window), len);
    let floor = min_visible.min(len);

    if end - start < floor {
        start = end.saturating_sub(floor);
        if end - start < floor {
            end = (start + floor).min(len);
        }
    }

    start..end
}

/// Convert a horizontal drag into a window delta in percent.
///
/// Dragging right (positive translation) reveals older points, so the window
/// moves toward 0. The delta is proportional to the current window width.
pub fn pan_delta_from_pixels(translation_px: f64, chart_width_px: f64, window: ZoomWindow) -> f64 {
    if !translation_px.is_finite() || !chart_width_px.is_finite() || chart_width_px <= 0.0 {
        return 0.0;
    }
    -(translation_px / chart_width_px) * window.width()
}

/// Zoom/pan state for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomState {
    window: ZoomWindow,
    range: Range<usize>,
    len: usize,
    limits: ZoomLimits,
}

impl ZoomState {
    /// Full view over a series of `len` points.
    pub fn new(len: usize, limits: ZoomLimits) -> Self {
        let mut state = Self {
            window: ZoomWindow::FULL,
            range: 0..0,
            len,
            limits,
        };
        state.reset();
        state
    }

    pub fn window(&self) -> ZoomWindow {
        self.window
    }

    pub fn visible_range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Point at a new series, resetting to the full view.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.reset();
    }

    /// Point at a reloaded series, keeping the current window.
    pub fn rebase(&mut self, len: usize) -> ZoomWindow {
        self.len = len;
        let window = self.window;
        self.set_window(window.from, window.to)
    }

    /// Show the whole series.
    pub fn reset(&mut self) -> ZoomWindow {
        self.set_window(0.0, 100.0)
    }

    /// Set the window from explicit percentages.
    ///
    /// When the visibility floor widens the slice, the stored window is
    /// widened to match so later gestures start from what is on screen.
    pub fn set_window(&mut self, from: f64, to: f64) -> ZoomWindow {
        let requested = normalize(ZoomWindow::new(from, to));
        let range = window_to_range(requested, self.len, self.limits.min_visible_points);

        self.window = if self.len > 0 && range != natural_range(requested, self.len) {
            let n = self.len as f64;
            ZoomWindow::new(range.start as f64 * 100.0 / n, range.end as f64 * 100.0 / n)
        } else {
            requested
        };
        self.range = range;
        self.window
    }

    /// Apply a pinch gesture.
    ///
    /// `scale > 1` zooms in. The new width is `width / scale`, bounded by the
    /// minimum zoom width and 100%, centered on `center_percent` and slid back
    /// inside the series when it would overflow an edge.
    pub fn pinch(&mut self, scale: f64, center_percent: f64) -> ZoomWindow {
        if !scale.is_finite() || scale <= 0.0 {
            return self.window;
        }

        let center = if center_percent.is_finite() {
            center_percent.clamp(0.0, 100.0)
        } else {
            self.window.center()
        };
        let width = (self.window.width() / scale)
            .max(self.limits.min_width_percent)
            .min(100.0);

        let target = slide(center - width / 2.0, width);
        tracing::trace!(scale, center, width, "pinch");
        self.set_window(target.from, target.to)
    }

    /// Shift the window by `delta_percent`, preserving its width.
    pub fn pan(&mut self, delta_percent: f64) -> ZoomWindow {
        if !delta_percent.is_finite() {
            return self.window;
        }

        let target = slide(self.window.from + delta_percent, self.window.width());
        tracing::trace!(delta_percent, "pan");
        self.set_window(target.from, target.to)
    }

    /// Shift the window by a horizontal drag measured in pixels.
    pub fn pan_pixels(&mut self, translation_px: f64, chart_width_px: f64) -> ZoomWindow {
        let delta = pan_delta_from_pixels(translation_px, chart_width_px, self.window);
        self.pan(delta)
    }
}
