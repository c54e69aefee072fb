//! Re-export of foundational types from `stocklens-types`.
// Consolidated re-exports so downstream crates can depend on `stocklens-core` only

pub use stocklens_types::{ControllerConfig, DEFAULT_FALLBACK_POINTS, DEFAULT_SNAPSHOT_TIMEOUT};
pub use stocklens_types::{
    CsvDownload, ExportFormat, ExportRequest, HistoryQuery, RequestToken, StocklensError,
    ValidationError,
};
pub use stocklens_types::{DateRange, PeriodSelector, Preset, Symbol};
pub use stocklens_types::{HistoryPoint, HistorySeries, OhlcSnapshot};
