use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::{ChangeSource, LogNotifier, Notifier};
use crate::errors::CoreError;
use crate::models::change::ChangeRecord;
use crate::models::price::StockDetail;
use crate::models::query::ChangeQuery;
use crate::models::settings::ApiConfig;

const STOCK_CHANGES_PATH: &str = "/api/stocks/changes";
const STOCK_HISTORY_DETAIL_PATH: &str = "/data/api/detail/chart";

/// REST client for the change-data backend.
///
/// - **Endpoints**: `/api/stocks/changes`, `/api/stocks/{code}/chart`,
///   `/data/api/detail/chart`
/// - **Errors**: every failure is logged and its user-facing message is
///   handed to the configured `Notifier` before being returned.
/// - **No retries**: a failed request fails the operation.
pub struct HttpChangeSource {
    client: Client,
    base_url: Url,
    notifier: Arc<dyn Notifier>,
}

impl HttpChangeSource {
    pub fn new(config: &ApiConfig) -> Result<Self, CoreError> {
        let config = config.clone().validated()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| CoreError::Config(format!("invalid base URL '{}': {e}", config.base_url)))?;

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_millis(config.timeout_ms));

        Ok(Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url,
            notifier: Arc::new(LogNotifier),
        })
    }

    /// Route user-facing failure messages somewhere other than the log.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base + path` with the given query pairs appended. A path prefix on
    /// the base URL is kept.
    pub fn endpoint_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, CoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CoreError::Config(format!("base URL '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(path.trim_start_matches('/').split('/'));
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// `/api/stocks/{stock_code}/chart`, with the code percent-encoded.
    pub fn chart_url(&self, stock_code: &str) -> Result<Url, CoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CoreError::Config(format!("base URL '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "stocks", stock_code, "chart"]);
        Ok(url)
    }

    /// GET `url` and decode a JSON body, reporting any failure.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CoreError> {
        log::debug!("API Request: GET {}", url.path());
        let result = self.send_json(&url).await;
        if let Err(e) = &result {
            log::error!("API Response Error: GET {}: {e}", url.path());
            self.notifier.error(&e.user_message());
        }
        result
    }

    async fn send_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, CoreError> {
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        log::debug!("API Response: {} {}", status.as_u16(), url.path());
        if !status.is_success() {
            return Err(CoreError::Http {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            CoreError::Deserialization(format!("unexpected response from {}: {e}", url.path()))
        })
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ChangeSource for HttpChangeSource {
    fn name(&self) -> &str {
        "HTTP backend"
    }

    async fn fetch_changes(&self, query: &ChangeQuery) -> Result<Vec<ChangeRecord>, CoreError> {
        query.validate()?;
        let url = self.endpoint_url(STOCK_CHANGES_PATH, &query.to_query_pairs())?;
        self.get_json(url).await
    }

    async fn fetch_chart(&self, stock_code: &str) -> Result<StockDetail, CoreError> {
        let url = self.chart_url(stock_code)?;
        self.get_json(url).await
    }

    async fn fetch_history_detail(
        &self,
        stock_code: &str,
        changer_name: Option<&str>,
    ) -> Result<StockDetail, CoreError> {
        let query = [
            ("code", stock_code.to_string()),
            ("name", changer_name.unwrap_or_default().to_string()),
        ];
        let url = self.endpoint_url(STOCK_HISTORY_DETAIL_PATH, &query)?;
        self.get_json(url).await
    }
}
