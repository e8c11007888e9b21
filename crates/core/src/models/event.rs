use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of an ownership change.
///
/// The backend reports these with their Chinese exchange-filing terms,
/// which are kept verbatim on the wire and as display labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Holding increased (增持)
    #[serde(rename = "增持")]
    Increase,
    /// Holding decreased (减持)
    #[serde(rename = "减持")]
    Decrease,
}

impl ChangeKind {
    /// The wire/display label of this kind.
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Increase => "增持",
            ChangeKind::Decrease => "减持",
        }
    }

    /// Parse a wire label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "增持" => Some(ChangeKind::Increase),
            "减持" => Some(ChangeKind::Decrease),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single ownership-change transaction to annotate on a price chart
/// (the backend calls these "marks").
///
/// `trade_date` has day granularity. `price` is the transaction's reference
/// price and may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Reference price of the transaction, if reported
    #[serde(default)]
    pub price: Option<f64>,

    /// Calendar date of the trade
    pub trade_date: NaiveDate,

    #[serde(default)]
    pub stock_code: Option<String>,

    #[serde(default)]
    pub stock_name: Option<String>,

    /// Increase or Decrease
    pub change_type: ChangeKind,

    /// Total transaction value
    pub total_price: f64,

    /// Who made the change
    #[serde(default)]
    pub changer_name: Option<String>,

    /// Their position in the company
    #[serde(default)]
    pub changer_position: Option<String>,
}

impl ChangeEvent {
    pub fn new(
        trade_date: NaiveDate,
        price: Option<f64>,
        change_type: ChangeKind,
        total_price: f64,
    ) -> Self {
        Self {
            price,
            trade_date,
            stock_code: None,
            stock_name: None,
            change_type,
            total_price,
            changer_name: None,
            changer_position: None,
        }
    }

    /// Display label for the annotation.
    pub fn label(&self) -> &'static str {
        self.change_type.label()
    }

    /// The reference price, when it is usable for proximity matching.
    pub fn reference_price(&self) -> Option<f64> {
        self.price.filter(|p| p.is_finite())
    }
}
