use async_trait::async_trait;

use crate::fetch::FetchSignal;
use stocklens_types::{
    ExportRequest, HistoryQuery, HistorySeries, OhlcSnapshot, StocklensError, Symbol,
};

/// Focused role trait for connectors that serve daily history.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Fetch the series described by `query`.
    ///
    /// `signal` flips once the request is superseded. Honoring it is
    /// best-effort: implementations should stop their I/O and return
    /// `StocklensError::Cancelled`, but may also finish normally. The caller
    /// discards late results either way.
    async fn history(
        &self,
        query: &HistoryQuery,
        signal: FetchSignal,
    ) -> Result<HistorySeries, StocklensError>;
}

/// Focused role trait for connectors that serve raw export files.
#[async_trait]
pub trait ExportProvider: Send + Sync {
    /// Download the export described by `req` and return the body as text.
    async fn export(&self, req: &ExportRequest) -> Result<String, StocklensError>;
}

/// Focused role trait for connectors that serve the latest OHLC quote.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Fetch the latest OHLC snapshot for `symbol`.
    async fn snapshot(&self, symbol: &Symbol) -> Result<OhlcSnapshot, StocklensError>;
}

/// Primary connector interface consumed by the history controller.
///
/// Connectors expose capabilities through the `as_*_provider` accessors; the
/// defaults advertise nothing.
pub trait StockConnector: Send + Sync {
    /// Stable connector name used in logs and error tags.
    fn name(&self) -> &'static str;

    /// Vendor or backend description.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// History capability, if supported.
    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        None
    }

    /// Export capability, if supported.
    fn as_export_provider(&self) -> Option<&dyn ExportProvider> {
        None
    }

    /// Snapshot capability, if supported.
    fn as_snapshot_provider(&self) -> Option<&dyn SnapshotProvider> {
        None
    }
}
