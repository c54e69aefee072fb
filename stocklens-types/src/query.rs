//! Request shapes shared by the fetch and export paths.

use serde::{Deserialize, Serialize};

use crate::{PeriodSelector, Symbol};

/// Parameters of one history request: which symbol, which window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Target symbol (query form includes the exchange suffix).
    pub symbol: Symbol,
    /// Window of history.
    pub period: PeriodSelector,
}

impl HistoryQuery {
    /// Construct a query.
    #[must_use]
    pub fn new(symbol: Symbol, period: impl Into<PeriodSelector>) -> Self {
        Self {
            symbol,
            period: period.into(),
        }
    }

    /// Query-string pairs for the selector: `period` or `start_date`/`end_date`.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match &self.period {
            PeriodSelector::Preset { preset } => vec![("period", preset.code().to_string())],
            PeriodSelector::Custom { range } => vec![
                ("start_date", range.start().format("%Y-%m-%d").to_string()),
                ("end_date", range.end().format("%Y-%m-%d").to_string()),
            ],
        }
    }
}

/// Download formats offered by the export endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values.
    #[default]
    Csv,
}

impl ExportFormat {
    /// Value of the `format` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
        }
    }

    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
        }
    }
}

/// A download derived from the live selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Same query the history fetch uses for this selection.
    pub query: HistoryQuery,
    /// Requested file format.
    pub format: ExportFormat,
}

impl ExportRequest {
    /// Query-string pairs: the selector pairs followed by `format`.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut out = self.query.params();
        out.push(("format", self.format.as_str().to_string()));
        out
    }

    /// `{symbol}_{period}.csv` or `{symbol}_{start}_to_{end}.csv`.
    #[must_use]
    pub fn filename(&self) -> String {
        let sym = self.query.symbol.display();
        let ext = self.format.extension();
        match &self.query.period {
            PeriodSelector::Preset { preset } => format!("{sym}_{}.{ext}", preset.code()),
            PeriodSelector::Custom { range } => format!(
                "{sym}_{}_to_{}.{ext}",
                range.start().format("%Y-%m-%d"),
                range.end().format("%Y-%m-%d")
            ),
        }
    }
}

/// CSV body returned by the export endpoint together with its download name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDownload {
    /// Suggested file name.
    pub filename: String,
    /// Raw CSV text as returned by the service.
    pub body: String,
}
