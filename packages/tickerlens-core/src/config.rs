//! Chart engine configuration.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::ZoomLimits;
use crate::types::TimeRange;
use crate::{Error, Result};

/// Longest working series; older points are cut.
pub const MAX_SERIES_POINTS: usize = 600;

/// Fewest points a zoomed slice shows.
pub const MIN_VISIBLE_POINTS: usize = 10;

/// Narrowest window a pinch can produce, in percent.
pub const MIN_ZOOM_WIDTH_PERCENT: f64 = 5.0;

/// Default lifetime of cached source responses.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "TICKERLENS_CONFIG";

/// Tunables for chart sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Maximum points kept after ingest
    pub max_points: usize,
    /// Minimum points in a visible slice
    pub min_visible_points: usize,
    /// Minimum pinch width in percent
    pub min_zoom_width_percent: f64,
    /// TTL for cached source responses, in seconds
    pub cache_ttl_secs: u64,
    /// Range a new session opens with
    pub default_range: TimeRange,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            max_points: MAX_SERIES_POINTS,
            min_visible_points: MIN_VISIBLE_POINTS,
            min_zoom_width_percent: MIN_ZOOM_WIDTH_PERCENT,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            default_range: TimeRange::default(),
        }
    }
}

impl ChartConfig {
    /// Get the default config file path.
    ///
    /// Default path: `<config dir>/tickerlens/config.toml`.
    /// Can be overridden with the `TICKERLENS_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        directories::ProjectDirs::from("", "", "tickerlens")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("tickerlens.toml"))
    }

    /// Load from the default path, falling back to defaults if no file exists.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML content.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is within its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.max_points == 0 {
            return Err(Error::InvalidConfig("max_points must be at least 1".into()));
        }
        if self.min_visible_points == 0 {
            return Err(Error::InvalidConfig(
                "min_visible_points must be at least 1".into(),
            ));
        }
        let width = self.min_zoom_width_percent;
        if !width.is_finite() || width <= 0.0 || width > 100.0 {
            return Err(Error::InvalidConfig(format!(
                "min_zoom_width_percent must be in (0, 100], got {}",
                width
            )));
        }
        Ok(())
    }

    /// Zoom bounds derived from this config.
    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min_visible_points: self.min_visible_points,
            min_width_percent: self.min_zoom_width_percent,
        }
    }

    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache_ttl_secs)
    }
}
