use std::fmt::Write as _;

use async_trait::async_trait;
use chrono::Days;
use stocklens_core::connector::{
    ExportProvider, HistoryProvider, SnapshotProvider, StockConnector,
};
use stocklens_core::{
    ExportRequest, FetchSignal, HistoryPoint, HistoryQuery, HistorySeries, OhlcSnapshot,
    PeriodSelector, Preset, StocklensError, Symbol,
};

mod dynamic;
mod fixtures;

pub use dynamic::{MockBehavior, ScriptController, ScriptedSource};

/// Mock connector for CI-safe demos. Provides deterministic data from static fixtures.
///
/// `FAIL` fails every capability; unknown symbols are `NotFound`.
pub struct MockConnector;

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn maybe_fail(symbol: &Symbol, capability: &'static str) -> Result<(), StocklensError> {
        if symbol.display() == "FAIL" {
            return Err(StocklensError::connector(
                "stocklens-mock",
                format!("forced failure: {capability}"),
            ));
        }
        Ok(())
    }

    fn series(symbol: &Symbol) -> Result<HistorySeries, StocklensError> {
        fixtures::history::by_symbol(symbol.display())
            .ok_or_else(|| StocklensError::not_found(format!("history for {symbol}")))
    }

    /// Fixture points inside the query's window.
    ///
    /// Presets count back from the last fixture day rather than from today.
    fn window(query: &HistoryQuery) -> Result<Vec<HistoryPoint>, StocklensError> {
        let series = Self::series(&query.symbol)?;
        let Some(last) = series.last().map(|p| p.date) else {
            return Ok(Vec::new());
        };
        let (from, to) = match query.period {
            PeriodSelector::Preset { preset } => (
                last.checked_sub_days(Days::new(lookback_days(preset) - 1)),
                last,
            ),
            PeriodSelector::Custom { range } => (Some(range.start()), range.end()),
        };
        Ok(series
            .into_points()
            .into_iter()
            .filter(|p| from.is_none_or(|f| p.date >= f) && p.date <= to)
            .collect())
    }
}

const fn lookback_days(preset: Preset) -> u64 {
    match preset {
        Preset::D7 => 7,
        Preset::M1 => 30,
        Preset::M3 => 91,
        Preset::M6 => 182,
        Preset::Y1 => 365,
        Preset::Y2 => 730,
        Preset::Y5 => 1826,
    }
}

/// Render points the way the export endpoint does.
#[must_use]
pub fn render_csv(points: &[HistoryPoint]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for p in points {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            p.date.format("%Y-%m-%d"),
            p.open,
            p.high,
            p.low,
            p.close,
            p.volume
        );
    }
    out
}

impl StockConnector for MockConnector {
    fn name(&self) -> &'static str {
        "stocklens-mock"
    }
    fn vendor(&self) -> &'static str {
        "Mock"
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
impl HistoryProvider for MockConnector {
    async fn history(
        &self,
        query: &HistoryQuery,
        _signal: FetchSignal,
    ) -> Result<HistorySeries, StocklensError> {
        Self::maybe_fail(&query.symbol, "history")?;
        let points = Self::window(query)?;
        if points.is_empty() {
            return Err(StocklensError::http(
                404,
                format!("No historical data available for '{}'", query.symbol.display()),
            ));
        }
        Ok(HistorySeries::new(points)?)
    }
}

#[async_trait]
impl ExportProvider for MockConnector {
    async fn export(&self, req: &ExportRequest) -> Result<String, StocklensError> {
        Self::maybe_fail(&req.query.symbol, "export")?;
        Ok(render_csv(&Self::window(&req.query)?))
    }
}

#[async_trait]
impl SnapshotProvider for MockConnector {
    async fn snapshot(&self, symbol: &Symbol) -> Result<OhlcSnapshot, StocklensError> {
        Self::maybe_fail(symbol, "snapshot")?;
        let series = Self::series(symbol)?;
        let last = series
            .last()
            .ok_or_else(|| StocklensError::not_found(format!("snapshot for {symbol}")))?;
        Ok(OhlcSnapshot {
            date: last.date,
            open: last.open,
            high: last.high,
            low: last.low,
            close: last.close,
            volume: Some(last.volume),
        })
    }
}
