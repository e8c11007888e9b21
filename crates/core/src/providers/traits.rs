use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::change::ChangeRecord;
use crate::models::price::StockDetail;
use crate::models::query::ChangeQuery;

/// Trait abstraction over the change-data backend.
///
/// The dashboard only talks to this trait, so the HTTP client can be
/// swapped for a fixture or a different backend without touching it.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ChangeSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// List ownership changes matching `query`.
    async fn fetch_changes(&self, query: &ChangeQuery) -> Result<Vec<ChangeRecord>, CoreError>;

    /// Price history and change events for one stock.
    async fn fetch_chart(&self, stock_code: &str) -> Result<StockDetail, CoreError>;

    /// Price history and the change events of one actor in one stock.
    async fn fetch_history_detail(
        &self,
        stock_code: &str,
        changer_name: Option<&str>,
    ) -> Result<StockDetail, CoreError>;
}

/// Receives user-facing failure messages (a toast, a status bar, stderr).
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Default notifier: forwards messages to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        log::warn!("{message}");
    }
}
