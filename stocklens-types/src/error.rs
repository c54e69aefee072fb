use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input problems detected locally, before any network call is made.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    /// The symbol was empty after trimming.
    #[error("symbol must not be empty")]
    EmptySymbol,

    /// The symbol contained characters a ticker never carries.
    #[error("invalid symbol '{0}'")]
    InvalidSymbol(String),

    /// An operation needs a symbol but none is selected.
    #[error("no symbol selected")]
    NoSymbol,

    /// Custom range mode without both dates committed.
    #[error("missing range")]
    MissingRange,

    /// Custom range whose start lies after its end.
    #[error("start date {start} is after end date {end}")]
    InvertedRange {
        /// Requested first day.
        start: NaiveDate,
        /// Requested last day.
        end: NaiveDate,
    },

    /// A date later than "today".
    #[error("date {date} is in the future (today is {today})")]
    FutureDate {
        /// Offending date.
        date: NaiveDate,
        /// Calendar day used for the comparison.
        today: NaiveDate,
    },

    /// Unknown preset code.
    #[error("unknown period '{0}'")]
    UnknownPeriod(String),

    /// Series dates are not strictly increasing at `index`.
    #[error("history points out of order at index {index} ({date})")]
    UnorderedSeries {
        /// Index of the first point that does not advance the date.
        index: usize,
        /// Date found at `index`.
        date: NaiveDate,
    },

    /// The placeholder generator was asked for zero points.
    #[error("point count must be at least 1")]
    InvalidPointCount,
}

/// Unified error type for the stocklens workspace.
///
/// Wraps local validation failures, transport and HTTP failures reported by a
/// connector, payload decoding issues, and the cancellation outcome of a
/// superseded fetch.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StocklensError {
    /// Rejected locally; no request was sent.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The server answered with a non-success status.
    #[error("http {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Server-provided `detail`, or the status reason when absent.
        message: String,
    },

    /// The request never produced a response (connect, timeout, I/O).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("decode failure: {0}")]
    Decode(String),

    /// A resource or symbol could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "history for TCS.NS".
        what: String,
    },

    /// The fetch was cancelled because a newer selection superseded it.
    #[error("request cancelled")]
    Cancelled,

    /// The connector does not implement the requested capability.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "snapshot").
        capability: String,
    },

    /// Invalid argument provided by the caller, e.g. an incomplete builder.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An individual connector returned an error.
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },
}

impl StocklensError {
    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `Connector` error with the connector name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `Http` error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Returns true for the outcome of a superseded fetch.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true if this error should be shown to the user.
    ///
    /// Cancellation is the expected result of superseding a request and is
    /// never surfaced.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        !self.is_cancellation()
    }

    /// Human-readable message without the variant prefix.
    ///
    /// For HTTP failures this is the server's `detail` text, which is what the
    /// dashboard shows after its own "Failed to fetch data:" prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(v) => v.to_string(),
            Self::Http { message, .. } | Self::Transport(message) | Self::Decode(message) => {
                message.clone()
            }
            Self::Connector { msg, .. } => msg.clone(),
            other => other.to_string(),
        }
    }
}
