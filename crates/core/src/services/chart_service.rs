use crate::models::chart::{
    AxisLabel, CategoryAxis, ChartOption, DataZoom, Grid, ItemStyle, LineSeries, LineStyle,
    MarkPoint, MarkPointData, PreparedChart, TextStyle, Title, Tooltip, ValueAxis, LINE_COLOR,
};
use crate::models::price::{PricePoint, StockDetail};
use crate::services::alignment_service::AlignmentService;

/// Roughly how many x-axis labels to show regardless of series length.
const X_AXIS_LABEL_COUNT: usize = 8;

/// Generates chart-ready configurations from a stock's detail data.
///
/// The core computes everything: the rendering side only hands the
/// resulting `ChartOption` to the charting library.
pub struct ChartService {
    alignment_service: AlignmentService,
}

impl ChartService {
    pub fn new() -> Self {
        Self {
            alignment_service: AlignmentService::new(),
        }
    }

    /// Project the price series to parallel label/value arrays and align
    /// the detail's change events onto it.
    pub fn prepare_chart_data(&self, detail: &StockDetail) -> PreparedChart {
        let (labels, prices): (Vec<String>, Vec<f64>) = detail
            .price_data
            .iter()
            .map(|p| (axis_label(p), p.current_price))
            .unzip();

        let markers = self.alignment_service.align(&detail.price_data, &detail.marks);

        PreparedChart {
            labels,
            prices,
            markers,
        }
    }

    /// Assemble the declarative chart configuration.
    ///
    /// Markers whose index falls outside the prepared series are skipped,
    /// so a hand-built `PreparedChart` cannot produce a dangling pin.
    pub fn build_chart_option(&self, title: &str, chart: &PreparedChart) -> ChartOption {
        let mark_data = chart
            .markers
            .iter()
            .filter_map(|m| {
                let price = *chart.prices.get(m.series_index)?;
                Some(MarkPointData {
                    name: m.label.clone(),
                    coord: (m.series_index, price),
                    value: m.display_value.clone(),
                    item_style: ItemStyle {
                        color: m.color_class.color().to_string(),
                    },
                })
            })
            .collect();

        ChartOption {
            title: Title {
                text: title.to_string(),
                left: "center".into(),
                text_style: TextStyle { font_size: 14 },
            },
            grid: Grid {
                left: "3%".into(),
                right: "4%".into(),
                bottom: "3%".into(),
                contain_label: true,
            },
            tooltip: Tooltip {
                trigger: "axis".into(),
            },
            x_axis: CategoryAxis {
                axis_type: "category".into(),
                data: chart.labels.clone(),
                axis_label: AxisLabel {
                    interval: chart.labels.len() / X_AXIS_LABEL_COUNT,
                },
            },
            y_axis: ValueAxis {
                axis_type: "value".into(),
                scale: true,
            },
            data_zoom: vec![
                DataZoom {
                    zoom_type: Some("inside".into()),
                    start: 0.0,
                    end: 100.0,
                },
                DataZoom {
                    zoom_type: None,
                    start: 0.0,
                    end: 100.0,
                },
            ],
            series: vec![LineSeries {
                series_type: "line".into(),
                data: chart.prices.clone(),
                smooth: true,
                line_style: LineStyle {
                    width: 2.0,
                    color: LINE_COLOR.into(),
                },
                mark_point: MarkPoint {
                    symbol: "pin".into(),
                    symbol_size: 40,
                    data: mark_data,
                },
            }],
        }
    }

    /// `prepare_chart_data` followed by `build_chart_option`.
    pub fn chart_for_detail(&self, title: &str, detail: &StockDetail) -> ChartOption {
        let prepared = self.prepare_chart_data(detail);
        self.build_chart_option(title, &prepared)
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}

/// "YYYY-MM-DD HH:MM", or the raw timestamp when it cannot be parsed.
fn axis_label(point: &PricePoint) -> String {
    match point.timestamp() {
        Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        None => point.track_time.clone(),
    }
}
