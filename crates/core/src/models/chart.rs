use serde::{Deserialize, Serialize};

use super::event::ChangeKind;

/// Line color of the price series.
pub const LINE_COLOR: &str = "#409EFF";
/// Marker color for holding increases (red).
pub const INCREASE_COLOR: &str = "#f56c6c";
/// Marker color for holding decreases (green).
pub const DECREASE_COLOR: &str = "#67c23a";

impl ChangeKind {
    /// Marker color for this kind of change.
    pub fn color(&self) -> &'static str {
        match self {
            ChangeKind::Increase => INCREASE_COLOR,
            ChangeKind::Decrease => DECREASE_COLOR,
        }
    }
}

/// A change event anchored to a point of a price series.
///
/// The anchor is a position in the series it was computed from, never an
/// independent coordinate, so the marker cannot drift from its series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub series_index: usize,
    pub label: String,
    /// e.g. "5,000,000 (¥10.6)"
    pub display_value: String,
    pub color_class: ChangeKind,
}

/// Price series projected to parallel label/value arrays, plus its markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreparedChart {
    pub labels: Vec<String>,
    pub prices: Vec<f64>,
    pub markers: Vec<Marker>,
}

// ── ECharts-shaped option ───────────────────────────────────────────
//
// Only the parts of the schema the dashboard sets are modelled. Field
// names serialize in the charting library's camelCase.

/// Immutable declarative chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOption {
    pub title: Title,
    pub grid: Grid,
    pub tooltip: Tooltip,
    pub x_axis: CategoryAxis,
    pub y_axis: ValueAxis,
    pub data_zoom: Vec<DataZoom>,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub text: String,
    pub left: String,
    pub text_style: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub left: String,
    pub right: String,
    pub bottom: String,
    pub contain_label: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub trigger: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAxis {
    #[serde(rename = "type")]
    pub axis_type: String,
    pub data: Vec<String>,
    pub axis_label: AxisLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLabel {
    pub interval: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAxis {
    #[serde(rename = "type")]
    pub axis_type: String,
    pub scale: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataZoom {
    /// "inside" for wheel/drag zoom; `None` renders the default slider
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub zoom_type: Option<String>,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    #[serde(rename = "type")]
    pub series_type: String,
    pub data: Vec<f64>,
    pub smooth: bool,
    pub line_style: LineStyle,
    pub mark_point: MarkPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    pub width: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPoint {
    pub symbol: String,
    pub symbol_size: u32,
    pub data: Vec<MarkPointData>,
}

/// One pin on the chart. `coord` is `[x index, price]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPointData {
    pub name: String,
    pub coord: (usize, f64),
    pub value: String,
    pub item_style: ItemStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStyle {
    pub color: String,
}

impl ChartOption {
    /// The line series (there is always exactly one).
    pub fn price_series(&self) -> Option<&LineSeries> {
        self.series.first()
    }

    /// Tooltip HTML for the point with x-axis label `label`.
    ///
    /// Appends the first marker anchored at a point with the same label.
    /// Returns `None` when the label is not on the axis.
    pub fn tooltip_text(&self, label: &str) -> Option<String> {
        let idx = self.x_axis.data.iter().position(|l| l == label)?;
        let series = self.price_series()?;
        let price = series.data.get(idx)?;

        let mut text = format!("{label}<br/>● Price: {price}");

        let mark = series.mark_point.data.iter().find(|m| {
            self.x_axis
                .data
                .get(m.coord.0)
                .is_some_and(|anchor| anchor == label)
        });
        if let Some(mark) = mark {
            text.push_str(&format!(
                "<br/><span style=\"color:{}\">● {}: {}</span>",
                mark.item_style.color, mark.name, mark.value
            ));
        }

        Some(text)
    }
}
