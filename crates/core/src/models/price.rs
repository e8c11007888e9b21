use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use super::event::ChangeEvent;

/// Accepted naive timestamp layouts, tried in order after RFC 3339.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A single sampled price observation.
///
/// The timestamp is kept exactly as received. A point whose timestamp fails
/// to parse is still charted, but never matches any calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub track_time: String,
    pub current_price: f64,
}

impl PricePoint {
    pub fn new(track_time: impl Into<String>, current_price: f64) -> Self {
        Self {
            track_time: track_time.into(),
            current_price,
        }
    }

    /// Parsed timestamp, or `None` if the raw value is malformed.
    ///
    /// Offset-bearing timestamps keep their wall-clock time as written.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.track_time)
    }

    /// Calendar day of this sample.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        self.timestamp().map(|ts| ts.date())
    }
}

/// Parse a backend timestamp in any of the accepted layouts.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Price history of one stock together with the change events to overlay.
///
/// Fetched together per stock and held only while the row is expanded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDetail {
    /// Ordered samples; the order is the chart's x-axis order
    #[serde(default)]
    pub price_data: Vec<PricePoint>,

    /// Malformed marks are skipped; they never fail the whole detail
    #[serde(default, deserialize_with = "lenient_marks")]
    pub marks: Vec<ChangeEvent>,
}

fn lenient_marks<'de, D>(deserializer: D) -> Result<Vec<ChangeEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<ChangeEvent>(value) {
            Ok(event) => Some(event),
            Err(e) => {
                log::debug!("Skipping malformed mark: {e}");
                None
            }
        })
        .collect())
}

impl StockDetail {
    pub fn is_empty(&self) -> bool {
        self.price_data.is_empty()
    }
}
