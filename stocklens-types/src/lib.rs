//! stocklens-specific data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod config;
mod error;
mod period;
mod query;
mod series;
mod symbol;
mod token;

pub use config::{ControllerConfig, DEFAULT_FALLBACK_POINTS, DEFAULT_SNAPSHOT_TIMEOUT};
pub use error::{StocklensError, ValidationError};
pub use period::{DateRange, PeriodSelector, Preset};
pub use query::{CsvDownload, ExportFormat, ExportRequest, HistoryQuery};
pub use series::{HistoryPoint, HistorySeries, OhlcSnapshot};
pub use symbol::Symbol;
pub use token::RequestToken;
