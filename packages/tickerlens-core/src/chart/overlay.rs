//! Indicator overlays restricted to the visible slice.

use std::collections::HashSet;

use serde::Serialize;

use crate::indicators::{descriptor, IndicatorId, IndicatorOutput};
use crate::types::PricePoint;

/// One overlay ready to draw. Band indicators carry three paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorOverlay {
    pub id: IndicatorId,
    pub name: &'static str,
    pub color: &'static str,
    #[serde(rename = "series")]
    pub data: IndicatorOutput,
}

impl IndicatorOverlay {
    /// Whether the renderer needs upper/middle/lower paths.
    pub fn is_band(&self) -> bool {
        matches!(self.data, IndicatorOutput::Bands(_))
    }
}

/// Timestamps present in a slice.
pub fn visible_timestamps(visible: &[PricePoint]) -> HashSet<i64> {
    visible.iter().map(|p| p.timestamp).collect()
}

/// Compute overlays for `ids` over the full series and keep only samples that
/// fall on a visible timestamp.
///
/// Indicators always see the full history so a moving average near the left
/// edge of a zoomed view is not cut short. An indicator without enough data
/// is left out; the rest of the batch still renders.
pub fn compute_overlays(
    full: &[PricePoint],
    visible: &[PricePoint],
    ids: &[IndicatorId],
) -> Vec<IndicatorOverlay> {
    let timestamps = visible_timestamps(visible);
    let mut overlays = Vec::with_capacity(ids.len());

    for &id in ids {
        let descriptor = descriptor(id);
        let output = (descriptor.compute)(full);

        if output.is_empty() {
            tracing::debug!("Skipping {} overlay: not enough data ({} points)", id, full.len());
            continue;
        }

        overlays.push(IndicatorOverlay {
            id,
            name: descriptor.name,
            color: descriptor.color,
            data: output.retain_timestamps(&timestamps),
        });
    }

    tracing::debug!("Computed {}/{} overlays", overlays.len(), ids.len());
    overlays
}
