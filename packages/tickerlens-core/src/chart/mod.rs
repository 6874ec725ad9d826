//! Chart series management.
//!
//! Turns raw points from a data source into a clean, bounded series, keeps a
//! percentage zoom window over it, and derives the visible slice, its price
//! domain and the indicator overlays that fall inside it.

mod overlay;
mod series;
mod session;
mod zoom;

pub use overlay::{compute_overlays, visible_timestamps, IndicatorOverlay};
pub use series::{domain, ingest, sanitize_point, IngestReport, Series};
pub use session::{ChartSession, FetchOutcome, FetchTicket, PendingFetch, SessionState};
pub use zoom::{pan_delta_from_pixels, window_to_range, ZoomLimits, ZoomState};
