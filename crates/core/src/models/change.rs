use serde::{Deserialize, Serialize};

use super::price::StockDetail;

/// One row of the change listing: aggregated increase/decrease amounts
/// for a stock, actor and trade date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    #[serde(default)]
    pub total_increase: f64,

    #[serde(default)]
    pub total_decrease: f64,

    /// Trade date as reported ("YYYY-MM-DD")
    pub trade_date: String,

    pub stock_code: String,

    pub stock_name: String,

    #[serde(default)]
    pub changer_name: String,

    #[serde(default)]
    pub changer_position: String,

    #[serde(default)]
    pub price: Option<f64>,
}

impl ChangeRecord {
    pub fn key(&self) -> RowKey {
        RowKey::new(&self.stock_code, &self.trade_date)
    }

    pub fn is_increase(&self) -> bool {
        self.total_increase > 0.0
    }

    pub fn is_decrease(&self) -> bool {
        self.total_decrease > 0.0
    }

    /// Title of this row's price chart.
    pub fn chart_title(&self) -> String {
        chart_title(&self.stock_name, &self.stock_code)
    }
}

/// "<name> (<code>) Price Trend"
pub fn chart_title(stock_name: &str, stock_code: &str) -> String {
    format!("{stock_name} ({stock_code}) Price Trend")
}

/// Composite identity of a listing row: stock code + trade date.
///
/// The same stock can appear on several dates, so the code alone is
/// not unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey {
    pub stock_code: String,
    pub trade_date: String,
}

impl RowKey {
    pub fn new(stock_code: impl Into<String>, trade_date: impl Into<String>) -> Self {
        Self {
            stock_code: stock_code.into(),
            trade_date: trade_date.into(),
        }
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chart-{}-{}", self.stock_code, self.trade_date)
    }
}

/// A listing row plus its expand/detail state.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRow {
    pub record: ChangeRecord,
    pub expanded: bool,
    /// Set while this row's detail fetch is in flight
    pub chart_loading: bool,
    pub detail: Option<StockDetail>,
}

impl StockRow {
    pub fn new(record: ChangeRecord) -> Self {
        Self {
            record,
            expanded: false,
            chart_loading: false,
            detail: None,
        }
    }

    pub fn key(&self) -> RowKey {
        self.record.key()
    }
}

impl From<ChangeRecord> for StockRow {
    fn from(record: ChangeRecord) -> Self {
        Self::new(record)
    }
}
