//! stocklens-http
//!
//! Connector implementing `StockConnector` over the dashboard's REST backend:
//! - `GET /api/stock/{symbol}/history` for daily history,
//! - `GET /api/stock/{symbol}` for the latest quote (placeholder seed),
//! - `GET /api/stock/{symbol}/export` for CSV downloads.
//!
//! Non-success responses become `StocklensError::Http` carrying the server's
//! `detail` text. In-flight history requests stop when their `FetchSignal`
//! fires and report `Cancelled`.
#![warn(missing_docs)]

/// reqwest plumbing shared by all endpoints.
pub mod adapter;
mod config;
mod wire;

use std::sync::Arc;

use async_trait::async_trait;
use stocklens_core::{
    ExportRequest, FetchSignal, HistoryQuery, HistorySeries, OhlcSnapshot, StocklensError, Symbol,
    SystemToday, Today,
    connector::{ExportProvider, HistoryProvider, SnapshotProvider, StockConnector},
};

use adapter::RealAdapter;
pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpSourceConfig};

/// Public connector type. Production users will construct with `HttpSource::new_default()`.
pub struct HttpSource {
    api: RealAdapter,
    today: Arc<dyn Today>,
}

impl HttpSource {
    /// Connector name used when tagging errors.
    pub const NAME: &'static str = "stocklens-http";

    /// Connector for the backend at `http://localhost:8000`.
    ///
    /// # Errors
    /// `Transport` if the HTTP client cannot be constructed.
    pub fn new_default() -> Result<Self, StocklensError> {
        Self::new(&HttpSourceConfig::default())
    }

    /// Connector configured by `cfg`.
    ///
    /// # Errors
    /// `InvalidArg` for an unusable base URL, `Transport` if the HTTP client
    /// cannot be constructed.
    pub fn new(cfg: &HttpSourceConfig) -> Result<Self, StocklensError> {
        Ok(Self {
            api: RealAdapter::new(cfg)?,
            today: Arc::new(SystemToday),
        })
    }

    /// Build from a provided `reqwest::Client`; its timeout and headers apply.
    ///
    /// # Errors
    /// `InvalidArg` for an unusable base URL.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, StocklensError> {
        Ok(Self {
            api: RealAdapter::with_client(client, base_url)?,
            today: Arc::new(SystemToday),
        })
    }

    /// Date stamped on quotes the backend returns without one.
    #[must_use]
    pub fn with_today(mut self, today: impl Today + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    /// Backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api.base().as_str()
    }

    async fn fetch_history(&self, query: &HistoryQuery) -> Result<HistorySeries, StocklensError> {
        let url = self.api.endpoint(&query.symbol.as_query(), Some("history"))?;
        let payload: wire::HistoryPayload = self.api.get_json(url, &query.params()).await?;
        payload.into_series()
    }
}

impl StockConnector for HttpSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "REST backend"
    }

    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        Some(self as &dyn HistoryProvider)
    }

    fn as_export_provider(&self) -> Option<&dyn ExportProvider> {
        Some(self as &dyn ExportProvider)
    }

    fn as_snapshot_provider(&self) -> Option<&dyn SnapshotProvider> {
        Some(self as &dyn SnapshotProvider)
    }
}

#[async_trait]
impl HistoryProvider for HttpSource {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "stocklens_http::history",
            skip(self, query, signal),
            fields(symbol = %query.symbol, period = query.period.tag()),
            err
        )
    )]
    async fn history(
        &self,
        query: &HistoryQuery,
        signal: FetchSignal,
    ) -> Result<HistorySeries, StocklensError> {
        // Dropping the request future closes the connection.
        tokio::select! {
            biased;
            () = signal.cancelled() => Err(StocklensError::Cancelled),
            r = self.fetch_history(query) => r,
        }
    }
}

#[async_trait]
impl SnapshotProvider for HttpSource {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "stocklens_http::snapshot", skip(self), err)
    )]
    async fn snapshot(&self, symbol: &Symbol) -> Result<OhlcSnapshot, StocklensError> {
        let url = self.api.endpoint(&symbol.as_query(), None)?;
        let payload: wire::SnapshotPayload = self.api.get_json(url, &[]).await?;
        payload
            .data
            .ohlc_data
            .into_snapshot(self.today.today())
    }
}

#[async_trait]
impl ExportProvider for HttpSource {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "stocklens_http::export",
            skip(self, req),
            fields(symbol = %req.query.symbol, period = req.query.period.tag()),
            err
        )
    )]
    async fn export(&self, req: &ExportRequest) -> Result<String, StocklensError> {
        let url = self
            .api
            .endpoint(&req.query.symbol.as_query(), Some("export"))?;
        self.api.get_text(url, &req.params()).await
    }
}
