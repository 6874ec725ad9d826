//! Built-in chart overlay indicators.

use std::collections::HashSet;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, IntoEnumIterator};

use super::{bollinger_bands, ema, sma, BollingerBands};
use super::{DEFAULT_BOLLINGER_MULTIPLIER, DEFAULT_BOLLINGER_PERIOD};
use crate::types::{IndicatorPoint, PricePoint};
use crate::{Error, Result};

/// Stable identifiers of the overlays a chart can request.
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
    EnumCount,
    AsRefStr,
)]
#[repr(usize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IndicatorId {
    Sma20,
    Sma50,
    Sma200,
    Ema12,
    Ema26,
    #[serde(rename = "bollinger")]
    #[strum(serialize = "bollinger")]
    BollingerBands,
}

impl IndicatorId {
    /// Parse an id string, rejecting anything outside the registry.
    pub fn parse(id: &str) -> Result<Self> {
        Self::from_str(id.trim()).map_err(|_| Error::UnknownIndicator(id.to_string()))
    }

    /// All registered ids, in display order.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// Result of computing one overlay: a single line, or a three-line band.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorOutput {
    Line(Vec<IndicatorPoint>),
    Bands(BollingerBands),
}

impl IndicatorOutput {
    /// True when warm-up consumed the whole series.
    pub fn is_empty(&self) -> bool {
        match self {
            IndicatorOutput::Line(points) => points.is_empty(),
            IndicatorOutput::Bands(bands) => bands.is_empty(),
        }
    }

    /// Number of samples per line.
    pub fn len(&self) -> usize {
        match self {
            IndicatorOutput::Line(points) => points.len(),
            IndicatorOutput::Bands(bands) => bands.middle.len(),
        }
    }

    /// Keep only samples whose timestamp is in `timestamps`.
    pub fn retain_timestamps(&self, timestamps: &HashSet<i64>) -> Self {
        let keep = |points: &[IndicatorPoint]| -> Vec<IndicatorPoint> {
            points
                .iter()
                .filter(|p| timestamps.contains(&p.timestamp))
                .copied()
                .collect()
        };

        match self {
            IndicatorOutput::Line(points) => IndicatorOutput::Line(keep(points)),
            IndicatorOutput::Bands(bands) => IndicatorOutput::Bands(BollingerBands {
                upper: keep(&bands.upper),
                middle: keep(&bands.middle),
                lower: keep(&bands.lower),
            }),
        }
    }
}

/// An overlay the chart can draw: identity, presentation, and how to compute it.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorDescriptor {
    pub id: IndicatorId,
    /// Human-readable label
    pub name: &'static str,
    /// Display color as `#rrggbb`
    pub color: &'static str,
    /// Computes the overlay over a full series
    pub compute: fn(&[PricePoint]) -> IndicatorOutput,
}

impl Serialize for IndicatorDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("IndicatorDescriptor", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", self.name)?;
        state.serialize_field("color", self.color)?;
        state.end()
    }
}

fn sma20(series: &[PricePoint]) -> IndicatorOutput {
    IndicatorOutput::Line(sma(series, 20))
}

fn sma50(series: &[PricePoint]) -> IndicatorOutput {
    IndicatorOutput::Line(sma(series, 50))
}

fn sma200(series: &[PricePoint]) -> IndicatorOutput {
    IndicatorOutput::Line(sma(series, 200))
}

fn ema12(series: &[PricePoint]) -> IndicatorOutput {
    IndicatorOutput::Line(ema(series, 12))
}

fn ema26(series: &[PricePoint]) -> IndicatorOutput {
    IndicatorOutput::Line(ema(series, 26))
}

fn bollinger(series: &[PricePoint]) -> IndicatorOutput {
    IndicatorOutput::Bands(bollinger_bands(
        series,
        DEFAULT_BOLLINGER_PERIOD,
        DEFAULT_BOLLINGER_MULTIPLIER,
    ))
}

/// Built-in overlays, in `IndicatorId` declaration order.
static INDICATORS: [IndicatorDescriptor; IndicatorId::COUNT] = [
    IndicatorDescriptor {
        id: IndicatorId::Sma20,
        name: "SMA 20",
        color: "#2962ff",
        compute: sma20,
    },
    IndicatorDescriptor {
        id: IndicatorId::Sma50,
        name: "SMA 50",
        color: "#ff6d00",
        compute: sma50,
    },
    IndicatorDescriptor {
        id: IndicatorId::Sma200,
        name: "SMA 200",
        color: "#d500f9",
        compute: sma200,
    },
    IndicatorDescriptor {
        id: IndicatorId::Ema12,
        name: "EMA 12",
        color: "#00c853",
        compute: ema12,
    },
    IndicatorDescriptor {
        id: IndicatorId::Ema26,
        name: "EMA 26",
        color: "#ffd600",
        compute: ema26,
    },
    IndicatorDescriptor {
        id: IndicatorId::BollingerBands,
        name: "Bollinger Bands",
        color: "#78909c",
        compute: bollinger,
    },
];

/// List all available overlays.
pub fn available_indicators() -> &'static [IndicatorDescriptor] {
    &INDICATORS
}

/// Get the descriptor for an id.
pub fn descriptor(id: IndicatorId) -> &'static IndicatorDescriptor {
    &INDICATORS[id as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(n: usize) -> Vec<PricePoint> {
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.2).sin() * 5.0;
                PricePoint {
                    timestamp: i as i64 * 60_000,
                    value: close,
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: None,
                }
            })
            .collect()
    }

    #[test]
    fn test_list_indicators() {
        let ids: Vec<IndicatorId> = available_indicators().iter().map(|d| d.id).collect();
        assert_eq!(ids, IndicatorId::all());
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_descriptor_matches_id() {
        for id in IndicatorId::iter() {
            assert_eq!(descriptor(id).id, id);
        }
    }

    #[test]
    fn test_registry_in_declaration_order() {
        assert_eq!(available_indicators().len(), IndicatorId::COUNT);
        for (position, descriptor) in available_indicators().iter().enumerate() {
            assert_eq!(descriptor.id as usize, position);
        }
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(IndicatorId::parse("sma20").unwrap(), IndicatorId::Sma20);
        assert_eq!(IndicatorId::parse("EMA26").unwrap(), IndicatorId::Ema26);
        assert_eq!(
            IndicatorId::parse(" bollinger ").unwrap(),
            IndicatorId::BollingerBands
        );
        assert_eq!(IndicatorId::BollingerBands.to_string(), "bollinger");
    }

    #[test]
    fn test_parse_unknown_id() {
        let result = IndicatorId::parse("vwap");
        assert!(matches!(result, Err(Error::UnknownIndicator(id)) if id == "vwap"));
    }

    #[test]
    fn test_all_indicators_have_labels() {
        for descriptor in available_indicators() {
            assert!(!descriptor.name.is_empty());
            assert!(descriptor.color.starts_with('#') && descriptor.color.len() == 7);
        }
    }

    #[test]
    fn test_compute_shapes() {
        let data = series(60);

        let sma20 = (descriptor(IndicatorId::Sma20).compute)(&data);
        assert!(matches!(sma20, IndicatorOutput::Line(_)));
        assert_eq!(sma20.len(), 41);

        let bands = (descriptor(IndicatorId::BollingerBands).compute)(&data);
        assert!(matches!(bands, IndicatorOutput::Bands(_)));
        assert_eq!(bands.len(), 41);

        let sma200 = (descriptor(IndicatorId::Sma200).compute)(&data);
        assert!(sma200.is_empty());
    }

    #[test]
    fn test_retain_timestamps() {
        let data = series(40);
        let bands = (descriptor(IndicatorId::BollingerBands).compute)(&data);
        let visible: HashSet<i64> = data[30..].iter().map(|p| p.timestamp).collect();

        match bands.retain_timestamps(&visible) {
            IndicatorOutput::Bands(filtered) => {
                assert_eq!(filtered.middle.len(), 10);
                assert_eq!(filtered.upper.len(), 10);
                assert!(filtered.lower.iter().all(|p| visible.contains(&p.timestamp)));
            }
            IndicatorOutput::Line(_) => panic!("expected bands"),
        }
    }

    #[test]
    fn test_descriptor_serializes_without_compute() {
        let json = serde_json::to_value(descriptor(IndicatorId::Ema12)).unwrap();
        assert_eq!(json["id"], "ema12");
        assert_eq!(json["name"], "EMA 12");
        assert!(json.get("compute").is_none());
    }
}
