pub mod errors;
pub mod format;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::Arc;

use models::{
    change::{chart_title, ChangeRecord, StockRow},
    chart::ChartOption,
    query::{ChangeQuery, SortOrder},
};
use providers::traits::{ChangeSource, LogNotifier, Notifier};
use services::{
    chart_registry::{ChartRegistry, ChartSurface},
    chart_service::ChartService,
};

use errors::CoreError;

/// Shown when a row's detail cannot be loaded.
const DETAIL_FAILED_MESSAGE: &str = "failed to load stock detail, please retry";

/// Main entry point for the Holding Watch core library.
/// Holds the listing state, per-row detail state and the live charts.
#[must_use]
pub struct HoldingWatch<S: ChangeSource, C: ChartSurface> {
    source: S,
    surface: C,
    chart_service: ChartService,
    registry: ChartRegistry<C::Handle>,
    notifier: Arc<dyn Notifier>,
    query: Option<ChangeQuery>,
    rows: Vec<StockRow>,
}

impl<S: ChangeSource, C: ChartSurface> std::fmt::Debug for HoldingWatch<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldingWatch")
            .field("source", &self.source.name())
            .field("query", &self.query)
            .field("rows", &self.rows.len())
            .field("live_charts", &self.registry.len())
            .finish()
    }
}

impl<S: ChangeSource, C: ChartSurface> HoldingWatch<S, C> {
    pub fn new(source: S, surface: C) -> Self {
        Self {
            source,
            surface,
            chart_service: ChartService::new(),
            registry: ChartRegistry::new(),
            notifier: Arc::new(LogNotifier),
            query: None,
            rows: Vec::new(),
        }
    }

    /// Route user-facing failure messages somewhere other than the log.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    // ── Listing ─────────────────────────────────────────────────────

    /// Run a change query and replace the listing with its results.
    ///
    /// On failure the previous rows stay as they were. On success every
    /// row's detail and chart from the previous listing is discarded.
    pub async fn search(&mut self, query: ChangeQuery) -> Result<usize, CoreError> {
        query.validate()?;
        let records = self.source.fetch_changes(&query).await?;

        self.registry.dispose_all();
        self.rows = records.into_iter().map(StockRow::from).collect();
        self.query = Some(query);
        log::info!("Loaded {} change records", self.rows.len());
        Ok(self.rows.len())
    }

    /// Re-run the current query with a new server-side sort, given the
    /// table's column sort state ("ascending", "descending" or cleared).
    pub async fn sort_by_change_amount(&mut self, order: Option<&str>) -> Result<usize, CoreError> {
        let query = self
            .query
            .clone()
            .ok_or_else(|| CoreError::ValidationError("no query has been run yet".into()))?
            .with_sort(SortOrder::from_column_order(order));
        self.search(query).await
    }

    #[must_use]
    pub fn query(&self) -> Option<&ChangeQuery> {
        self.query.as_ref()
    }

    #[must_use]
    pub fn rows(&self) -> &[StockRow] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&StockRow> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn records(&self) -> Vec<&ChangeRecord> {
        self.rows.iter().map(|r| &r.record).collect()
    }

    /// Number of rows with a positive total increase.
    #[must_use]
    pub fn increase_count(&self) -> usize {
        self.rows.iter().filter(|r| r.record.is_increase()).count()
    }

    /// Number of rows with a positive total decrease.
    #[must_use]
    pub fn decrease_count(&self) -> usize {
        self.rows.iter().filter(|r| r.record.is_decrease()).count()
    }

    // ── Row detail ──────────────────────────────────────────────────

    /// Expand a row: fetch its detail if not loaded yet, then render its chart.
    ///
    /// Rendering only starts after the fetch resolved. Returns whether a
    /// chart was mounted.
    pub async fn expand(&mut self, index: usize) -> Result<bool, CoreError> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(CoreError::RowNotFound(index))?;
        row.expanded = true;

        if row.detail.is_none() {
            row.chart_loading = true;
            let result = self.source.fetch_chart(&row.record.stock_code).await;
            row.chart_loading = false;

            match result {
                Ok(detail) => row.detail = Some(detail),
                Err(e) => {
                    log::error!("Failed to fetch stock detail for {}: {e}", row.key());
                    row.detail = None;
                    self.notifier.error(DETAIL_FAILED_MESSAGE);
                    return Err(e);
                }
            }
        }

        Ok(self.render_row(index))
    }

    /// Collapse a row: dispose its chart and discard its detail data.
    pub fn collapse(&mut self, index: usize) -> Result<(), CoreError> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(CoreError::RowNotFound(index))?;
        row.expanded = false;
        row.detail = None;
        self.registry.dispose(&row.record.key());
        Ok(())
    }

    /// (Re)build and mount the chart of a row that has its detail loaded.
    /// Any chart already live for the row is disposed before the new one
    /// is mounted.
    pub fn render_row(&mut self, index: usize) -> bool {
        let Some(row) = self.rows.get(index) else {
            return false;
        };
        let Some(detail) = &row.detail else {
            return false;
        };

        let key = row.key();
        let option = self
            .chart_service
            .chart_for_detail(&row.record.chart_title(), detail);

        self.registry.dispose(&key);
        match self.surface.mount(&key, &option) {
            Some(handle) => {
                log::debug!("Chart {key} initialized");
                self.registry.insert(key, handle);
                true
            }
            None => {
                log::error!("Chart container {key} does not exist");
                false
            }
        }
    }

    /// Chart configuration for a row with loaded detail, without mounting it.
    #[must_use]
    pub fn chart_option(&self, index: usize) -> Option<ChartOption> {
        let row = self.rows.get(index)?;
        let detail = row.detail.as_ref()?;
        Some(
            self.chart_service
                .chart_for_detail(&row.record.chart_title(), detail),
        )
    }

    /// Re-layout every live chart.
    pub fn resize_charts(&mut self) {
        self.registry.resize_all();
    }

    /// Number of charts currently mounted.
    #[must_use]
    pub fn live_charts(&self) -> usize {
        self.registry.len()
    }

    // ── History detail ──────────────────────────────────────────────

    /// Fetch one actor's change history in a stock and build its chart.
    pub async fn history_chart(
        &self,
        stock_code: &str,
        stock_name: &str,
        changer_name: Option<&str>,
    ) -> Result<ChartOption, CoreError> {
        let detail = self
            .source
            .fetch_history_detail(stock_code, changer_name)
            .await?;
        Ok(self
            .chart_service
            .chart_for_detail(&chart_title(stock_name, stock_code), &detail))
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn surface(&self) -> &C {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut C {
        &mut self.surface
    }
}
