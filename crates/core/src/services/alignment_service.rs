use chrono::NaiveDate;
use std::collections::HashMap;

use crate::format::{format_number, format_price};
use crate::models::chart::Marker;
use crate::models::event::ChangeEvent;
use crate::models::price::PricePoint;

/// Anchors change events onto a price series.
///
/// Pure business logic: no I/O, never fails. An event whose trade date has
/// no sample in the series produces no marker.
pub struct AlignmentService;

impl AlignmentService {
    pub fn new() -> Self {
        Self
    }

    /// Produce at most one marker per event, in event order.
    ///
    /// For each event:
    /// 1. Candidates are the samples on the event's calendar date.
    /// 2. No candidates → the event is dropped.
    /// 3. No reference price → the first candidate in series order.
    /// 4. Otherwise the candidate closest in price; ties go to the earlier sample.
    ///
    /// The marker's `series_index` is the position in `series` itself.
    pub fn align(&self, series: &[PricePoint], events: &[ChangeEvent]) -> Vec<Marker> {
        // Index sample positions by calendar date; unparseable timestamps never match
        let mut by_date: HashMap<NaiveDate, Vec<usize>> = HashMap::new();
        for (idx, point) in series.iter().enumerate() {
            if let Some(date) = point.calendar_date() {
                by_date.entry(date).or_default().push(idx);
            }
        }

        let mut markers = Vec::with_capacity(events.len());
        for event in events {
            let Some(candidates) = by_date.get(&event.trade_date) else {
                log::debug!(
                    "No price sample on {} for {} event, skipping",
                    event.trade_date,
                    event.label()
                );
                continue;
            };

            let Some(series_index) = Self::closest(series, candidates, event.reference_price())
            else {
                continue;
            };

            markers.push(Marker {
                series_index,
                label: event.label().to_string(),
                display_value: display_value(event),
                color_class: event.change_type,
            });
        }

        markers
    }

    /// Pick the anchor among `candidates` (indices into `series`, ascending).
    fn closest(series: &[PricePoint], candidates: &[usize], target: Option<f64>) -> Option<usize> {
        let first = *candidates.first()?;
        let Some(target) = target else {
            return Some(first);
        };

        let mut best = first;
        let mut best_diff = (series[first].current_price - target).abs();
        for &idx in &candidates[1..] {
            let diff = (series[idx].current_price - target).abs();
            // Strict comparison keeps the earliest sample on ties
            if diff < best_diff {
                best = idx;
                best_diff = diff;
            }
        }
        Some(best)
    }
}

impl Default for AlignmentService {
    fn default() -> Self {
        Self::new()
    }
}

/// "<grouped total> (¥<price>)", or just the grouped total without a price.
pub fn display_value(event: &ChangeEvent) -> String {
    let total = format_number(event.total_price);
    match event.price {
        Some(price) => format!("{total} (¥{})", format_price(price)),
        None => total,
    }
}
