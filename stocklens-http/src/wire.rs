//! Response payloads of the REST backend.

use chrono::NaiveDate;
use serde::Deserialize;

use stocklens_core::{HistoryPoint, HistorySeries, OhlcSnapshot, StocklensError};

/// `GET /api/stock/{symbol}/history`
#[derive(Debug, Deserialize)]
pub struct HistoryPayload {
    #[allow(dead_code)]
    pub symbol: Option<String>,
    #[allow(dead_code)]
    pub period: Option<String>,
    pub data: Vec<HistoryPoint>,
}

impl HistoryPayload {
    /// Validate ordering; the backend emits ascending dates.
    pub fn into_series(self) -> Result<HistorySeries, StocklensError> {
        HistorySeries::new(self.data).map_err(|e| StocklensError::Decode(e.to_string()))
    }
}

/// Body of every non-success response.
#[derive(Debug, Deserialize)]
pub struct ErrorPayload {
    pub detail: String,
}

/// `GET /api/stock/{symbol}`
#[derive(Debug, Deserialize)]
pub struct SnapshotPayload {
    pub data: SnapshotData,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotData {
    pub ohlc_data: OhlcData,
}

#[derive(Debug, Deserialize)]
pub struct OhlcData {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default)]
    pub date: Option<String>,
}

impl OhlcData {
    /// Quote dated by its own `date` field, or `fallback` when the feed omits it.
    ///
    /// The feed sometimes sends a full timestamp; only the leading day is read.
    pub fn into_snapshot(self, fallback: NaiveDate) -> Result<OhlcSnapshot, StocklensError> {
        let date = match self.date.as_deref().map(|d| d.get(..10).unwrap_or(d)) {
            Some(day) => NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map_err(|e| StocklensError::Decode(format!("snapshot date '{day}': {e}")))?,
            None => fallback,
        };
        Ok(OhlcSnapshot {
            date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}
