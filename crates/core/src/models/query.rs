use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::event::ChangeKind;
use crate::errors::CoreError;

/// Minimum transaction value applied by default, in yuan.
pub const DEFAULT_MIN_TOTAL_PRICE: f64 = 100_000.0;

/// Server-side sort on the change amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Map a table column sort state ("ascending" / "descending" / cleared).
    pub fn from_column_order(order: Option<&str>) -> Option<Self> {
        match order {
            Some("ascending") => Some(SortOrder::Asc),
            Some("descending") => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for the change listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub change_type: Option<ChangeKind>,
    pub change_sort: Option<SortOrder>,
    /// Minimum total transaction value
    pub total_price: Option<f64>,
}

impl ChangeQuery {
    /// A query over `[start, end]` with the dashboard's default filters
    /// (increases only, unsorted, at least 100,000 in value).
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            change_type: Some(ChangeKind::Increase),
            change_sort: None,
            total_price: Some(DEFAULT_MIN_TOTAL_PRICE),
        }
    }

    /// From the first day of `today`'s month through `today`.
    pub fn current_month(today: NaiveDate) -> Self {
        let start = today.with_day(1).unwrap_or(today);
        Self::new(start, today)
    }

    /// The last `days` days, ending today.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        let start = today
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self::new(start, today)
    }

    /// The last `months` calendar months, ending today.
    /// Clamps to the end of shorter months (Mar 31 - 1 month = Feb 28/29).
    pub fn last_months(today: NaiveDate, months: u32) -> Self {
        let start = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        Self::new(start, today)
    }

    pub fn with_change_type(mut self, change_type: Option<ChangeKind>) -> Self {
        self.change_type = change_type;
        self
    }

    pub fn with_sort(mut self, change_sort: Option<SortOrder>) -> Self {
        self.change_sort = change_sort;
        self
    }

    pub fn with_min_total(mut self, total_price: Option<f64>) -> Self {
        self.total_price = total_price;
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.start > self.end {
            return Err(CoreError::ValidationError(format!(
                "start date ({}) must not be after end date ({})",
                self.start, self.end
            )));
        }
        if let Some(total) = self.total_price {
            if !total.is_finite() || total < 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "minimum total must be finite and non-negative, got {total}"
                )));
            }
        }
        Ok(())
    }

    /// Query-string pairs, omitting unset filters. A zero minimum total is
    /// treated as unset.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("start", self.start.format("%Y-%m-%d").to_string()),
            ("end", self.end.format("%Y-%m-%d").to_string()),
        ];
        if let Some(kind) = self.change_type {
            pairs.push(("changeType", kind.label().to_string()));
        }
        if let Some(sort) = self.change_sort {
            pairs.push(("changeSort", sort.as_str().to_string()));
        }
        if let Some(total) = self.total_price.filter(|t| *t != 0.0) {
            pairs.push(("totalPrice", total.to_string()));
        }
        pairs
    }
}
