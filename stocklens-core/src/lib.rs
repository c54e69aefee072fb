//! stocklens-core
//!
//! Traits and primitives shared by the stocklens controller and its connectors.
//!
//! - `connector`: the `StockConnector` trait and capability provider traits.
//! - `fetch`: cancellation signals and handles for in-flight requests.
//! - `calendar`: the `Today` clock used for placeholder dates.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `fetch::FetchHandle` wraps `tokio::task::JoinHandle<()>` and signals
//! cancellation through `tokio::sync::watch`. Code that drives fetches must
//! run under a Tokio 1.x runtime.
#![warn(missing_docs)]

/// `Today` implementations.
pub mod calendar;
/// Connector capability traits and the primary `StockConnector` interface.
pub mod connector;
/// Cancellation signal and task handle for history requests.
pub mod fetch;
pub mod types;

pub use calendar::{FixedToday, SystemToday, Today};
pub use connector::StockConnector;
pub use fetch::{FetchHandle, FetchSignal};
pub use types::*;
