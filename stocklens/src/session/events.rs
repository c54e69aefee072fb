use tokio::sync::mpsc;

use stocklens_core::{HistorySeries, RequestToken};

/// Notifications emitted by the controller, in emission order.
///
/// For every request that is not superseded the sequence is
/// `Loading(true)`, then `Data` or `Error` (an `Error` may be followed by a
/// `Placeholder`), then `Loading(false)`. Superseded requests stop emitting.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    /// A request started (`true`) or finished (`false`).
    Loading {
        /// Request the flag belongs to.
        token: RequestToken,
        /// Whether a request is now in flight.
        loading: bool,
    },
    /// The current request returned a series.
    Data {
        /// Request the series answers.
        token: RequestToken,
        /// History to display.
        series: HistorySeries,
    },
    /// The current request failed.
    Error {
        /// Request that failed.
        token: RequestToken,
        /// Message for display.
        message: String,
    },
    /// Synthetic series shown in place of failed history.
    Placeholder {
        /// Request that failed.
        token: RequestToken,
        /// Generated series; never real data.
        series: HistorySeries,
    },
    /// The symbol was cleared; nothing is displayed any more.
    Cleared {
        /// Token minted by the clear.
        token: RequestToken,
    },
}

impl HistoryEvent {
    /// Token carried by the event.
    #[must_use]
    pub const fn token(&self) -> RequestToken {
        match self {
            Self::Loading { token, .. }
            | Self::Data { token, .. }
            | Self::Error { token, .. }
            | Self::Placeholder { token, .. }
            | Self::Cleared { token } => *token,
        }
    }

    /// Invoke the matching listener callback.
    pub fn dispatch<L: HistoryListener + ?Sized>(self, listener: &mut L) {
        match self {
            Self::Loading { loading, .. } => listener.on_loading(loading),
            Self::Data { series, .. } => listener.on_history_data(series),
            Self::Error { message, .. } => listener.on_error(message),
            Self::Placeholder { series, .. } => listener.on_placeholder(series),
            Self::Cleared { .. } => listener.on_cleared(),
        }
    }
}

/// Callback view of the event stream.
pub trait HistoryListener {
    /// Real history for the current selection.
    fn on_history_data(&mut self, series: HistorySeries);
    /// Loading indicator changes.
    fn on_loading(&mut self, loading: bool);
    /// The current request failed.
    fn on_error(&mut self, message: String);
    /// Placeholder series after a failure.
    fn on_placeholder(&mut self, _series: HistorySeries) {}
    /// The selection was cleared.
    fn on_cleared(&mut self) {}
}

/// Drain `rx` into `listener` until every sender is gone.
pub async fn forward_events<L: HistoryListener + ?Sized>(
    mut rx: mpsc::UnboundedReceiver<HistoryEvent>,
    listener: &mut L,
) {
    while let Some(event) = rx.recv().await {
        event.dispatch(listener);
    }
}
