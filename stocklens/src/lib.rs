//! Stocklens turns a symbol/time-window selection into history requests and
//! shows only the result of the most recent selection.
//!
//! Overview
//! - Each committed selection change mints a strictly increasing `RequestToken`.
//! - Starting a fetch signals cancellation to the previous one. Cancellation is
//!   best-effort, so every result additionally passes a staleness guard: it is
//!   applied only if its token is still the latest, otherwise it is counted and
//!   dropped.
//! - A failure of the current request is reported and, when a real quote for
//!   the symbol is known, followed by a placeholder series so the chart stays
//!   populated.
//! - CSV exports are derived from the live selection, never from a fetched
//!   result, so they always match what a fetch of that selection would ask for.
//!
//! Key behaviors and trade-offs
//! - Events go through an unbounded channel. Nothing runs user code while the
//!   controller holds its locks, at the cost of unbounded buffering when the
//!   receiver is not drained.
//! - Superseded fetches keep running until their source returns unless the
//!   source honors the `FetchSignal`. Their results are only counted.
//! - Placeholders are random around the last real close; seed them via
//!   `HistoryControllerBuilder::rng_seed` for reproducible output.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use stocklens::{HistoryController, HistoryEvent, Preset};
//!
//! let (mut controller, mut events) = HistoryController::builder()
//!     .with_source(Arc::new(stocklens_http::HttpSource::new_default()?))
//!     .default_exchange("NS")
//!     .build()?;
//!
//! controller.set_symbol("tcs")?;
//! controller.set_preset(Preset::M3);
//! while let Some(event) = events.recv().await {
//!     if let HistoryEvent::Data { series, .. } = event {
//!         println!("{} points", series.len());
//!     }
//! }
//! ```
//!
//! See `demos/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
pub mod session;

pub use core::{HistoryController, HistoryControllerBuilder, tag_err};
pub use session::{
    Completion, CoordinatorStats, ExportBuilder, FallbackSynthesizer, FetchState, HistoryEvent,
    HistoryListener, MAX_DEVIATION, RequestCoordinator, SelectionState, TokenClock, Window,
    forward_events,
};

// Re-export core types for convenience
pub use stocklens_core::{
    ControllerConfig, CsvDownload, DateRange, ExportFormat, ExportRequest, FetchSignal,
    FixedToday, HistoryPoint, HistoryQuery, HistorySeries, OhlcSnapshot, PeriodSelector, Preset,
    RequestToken, StockConnector, StocklensError, Symbol, SystemToday, Today, ValidationError,
};
