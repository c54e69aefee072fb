use std::sync::Arc;

use stocklens::{HistoryEvent, StockConnector};
use stocklens_http::{HttpSource, HttpSourceConfig};
use tokio::sync::mpsc::UnboundedReceiver;

/// Set to any value to run against fixtures instead of a live backend.
pub const USE_MOCK_ENV: &str = "STOCKLENS_DEMOS_USE_MOCK";
/// Backend base URL; defaults to `http://localhost:8000`.
pub const BASE_URL_ENV: &str = "STOCKLENS_BASE_URL";

/// `true` when the demos run on fixtures.
#[must_use]
pub fn using_mock() -> bool {
    std::env::var_os(USE_MOCK_ENV).is_some()
}

/// Return a connector for demos.
///
/// # Panics
/// Panics if the HTTP client cannot be constructed from the environment.
#[must_use]
pub fn get_source() -> Arc<dyn StockConnector> {
    if using_mock() {
        println!("--- (Using Mock Connector for CI) ---");
        return Arc::new(stocklens_mock::MockConnector::new());
    }
    let cfg = std::env::var(BASE_URL_ENV)
        .map_or_else(|_| HttpSourceConfig::default(), HttpSourceConfig::with_base_url);
    Arc::new(HttpSource::new(&cfg).expect("http client construction failed"))
}

/// One line per event, the way a dashboard log would show it.
#[must_use]
pub fn describe(event: &HistoryEvent) -> String {
    match event {
        HistoryEvent::Loading { token, loading } => format!("{token} loading={loading}"),
        HistoryEvent::Data { token, series } => {
            let last = series
                .last()
                .map_or_else(String::new, |p| format!(", last {} close {:.2}", p.date, p.close));
            format!("{token} data: {} points{last}", series.len())
        }
        HistoryEvent::Error { token, message } => format!("{token} error: {message}"),
        HistoryEvent::Placeholder { token, series } => {
            format!("{token} placeholder: {} synthetic points", series.len())
        }
        HistoryEvent::Cleared { token } => format!("{token} cleared"),
    }
}

/// Print everything already queued on `rx`.
pub fn print_pending(rx: &mut UnboundedReceiver<HistoryEvent>) {
    while let Ok(event) = rx.try_recv() {
        println!("  {}", describe(&event));
    }
}
