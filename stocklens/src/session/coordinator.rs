use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;

use stocklens_core::{
    FetchHandle, FetchSignal, HistoryQuery, HistorySeries, OhlcSnapshot, PeriodSelector,
    RequestToken, StockConnector, StocklensError, Symbol, Today,
};

use super::clock::TokenClock;
use super::events::HistoryEvent;
use super::fallback::FallbackSynthesizer;
use crate::core::tag_err;

/// What is currently displayed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    /// Nothing requested.
    #[default]
    Idle,
    /// Waiting for `token`.
    Loading {
        /// Request in flight.
        token: RequestToken,
    },
    /// `token` returned a series.
    Success {
        /// Displayed history.
        series: HistorySeries,
        /// Request that produced it.
        token: RequestToken,
    },
    /// `token` failed.
    Failed {
        /// Failure as reported by the connector.
        error: StocklensError,
        /// Request that failed.
        token: RequestToken,
    },
}

impl FetchState {
    /// Token the state belongs to, `None` when idle.
    #[must_use]
    pub const fn token(&self) -> Option<RequestToken> {
        match self {
            Self::Idle => None,
            Self::Loading { token } | Self::Success { token, .. } | Self::Failed { token, .. } => {
                Some(*token)
            }
        }
    }

    /// `true` while a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Counters describing what the coordinator did with each request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Fetches started.
    pub submitted: u64,
    /// Terminal outcomes delivered to the consumer.
    pub applied: u64,
    /// Results (or submits) dropped because a newer token existed.
    pub stale_discarded: u64,
    /// Cancellation signals sent to superseded fetches.
    pub cancellations_sent: u64,
    /// Source results that were `Cancelled`, stale or not.
    pub cancelled_outcomes: u64,
    /// Results for a token whose outcome had already been delivered.
    pub duplicates_discarded: u64,
}

/// What happened to one result handed to [`RequestCoordinator::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Written to `FetchState` and emitted.
    Applied,
    /// The current request reported cancellation; swallowed.
    Cancelled,
    /// A newer token exists, or this token already had its outcome; dropped
    /// without a trace for the consumer.
    Discarded,
}

struct Inner {
    state: FetchState,
    outstanding: Option<FetchHandle>,
    superseded: Vec<FetchHandle>,
    stats: CoordinatorStats,
    snapshot: Option<(Symbol, OhlcSnapshot)>,
    fallback: FallbackSynthesizer,
    /// Latest token whose outcome reached the consumer.
    delivered: Option<RequestToken>,
    /// Failed token still waiting for its quote before `Loading(false)`.
    closing: Option<RequestToken>,
}

impl Inner {
    /// Signal the outstanding fetch and keep its handle until it returns.
    fn supersede(&mut self) {
        if let Some(mut prev) = self.outstanding.take() {
            if prev.cancel() {
                self.stats.cancellations_sent += 1;
                #[cfg(feature = "tracing")]
                tracing::info!(token = %prev.token(), "cancellation sent to superseded fetch");
            }
            self.superseded.push(prev);
        }
        self.superseded.retain(|h| !h.is_finished());
    }

    /// Forget the handle of a fetch that is delivering its result.
    fn release(&mut self, token: RequestToken) {
        if let Some(h) = self.outstanding.take_if(|h| h.token() == token) {
            h.detach();
        }
        if let Some(pos) = self.superseded.iter().position(|h| h.token() == token) {
            self.superseded.swap_remove(pos).detach();
        }
    }
}

struct Shared {
    clock: Arc<TokenClock>,
    inner: Mutex<Inner>,
    events: mpsc::UnboundedSender<HistoryEvent>,
    today: Arc<dyn Today>,
    fallback_points: usize,
    snapshot_timeout: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: HistoryEvent) {
        // A dropped receiver only means nobody is watching.
        let _ = self.events.send(event);
    }

    fn has_snapshot(&self, symbol: &Symbol) -> bool {
        self.lock()
            .snapshot
            .as_ref()
            .is_some_and(|(s, _)| s == symbol)
    }

    fn store_snapshot(&self, symbol: Symbol, snapshot: OhlcSnapshot) {
        self.lock().snapshot = Some((symbol, snapshot));
    }

    fn complete(
        &self,
        token: RequestToken,
        query: &HistoryQuery,
        result: Result<HistorySeries, StocklensError>,
    ) -> Completion {
        self.deliver(token, query, result, false)
    }

    /// The staleness guard. With `defer_close` a failure is reported at once
    /// but the request stays open until [`Self::close_failure`].
    fn deliver(
        &self,
        token: RequestToken,
        query: &HistoryQuery,
        result: Result<HistorySeries, StocklensError>,
        defer_close: bool,
    ) -> Completion {
        // Clock before state, same order as `submit`.
        let clock = self.clock.hold_if_current(token);
        let mut guard = self.lock();
        let inner = &mut *guard;

        let cancelled = result.as_ref().is_err_and(StocklensError::is_cancellation);
        if cancelled {
            inner.stats.cancelled_outcomes += 1;
        }
        let Some(_clock) = clock else {
            inner.release(token);
            inner.stats.stale_discarded += 1;
            #[cfg(feature = "tracing")]
            tracing::debug!(token = %token, cancelled, "stale result discarded");
            return Completion::Discarded;
        };
        if inner.delivered == Some(token) {
            inner.stats.duplicates_discarded += 1;
            #[cfg(feature = "tracing")]
            tracing::debug!(token = %token, "outcome already delivered; result dropped");
            return Completion::Discarded;
        }
        inner.delivered = Some(token);

        if cancelled {
            inner.release(token);
            inner.state = FetchState::Idle;
            self.emit(HistoryEvent::Loading {
                token,
                loading: false,
            });
            return Completion::Cancelled;
        }

        inner.stats.applied += 1;
        match result {
            Ok(series) => {
                inner.release(token);
                #[cfg(feature = "tracing")]
                tracing::debug!(token = %token, points = series.len(), "history applied");
                inner.state = FetchState::Success {
                    series: series.clone(),
                    token,
                };
                self.emit(HistoryEvent::Data { token, series });
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(token = %token, error = %error, "history fetch failed");
                let message = failure_message(&query.period, &error);
                inner.state = FetchState::Failed { error, token };
                self.emit(HistoryEvent::Error { token, message });
                if defer_close {
                    inner.closing = Some(token);
                    return Completion::Applied;
                }
                inner.release(token);
                if let Some(series) = self.placeholder(inner, &query.symbol) {
                    self.emit(HistoryEvent::Placeholder { token, series });
                }
            }
        }
        self.emit(HistoryEvent::Loading {
            token,
            loading: false,
        });
        Completion::Applied
    }

    /// Close a failure delivered with `defer_close`: placeholder if a quote is
    /// known by now, then `Loading(false)`. Nothing is emitted once stale.
    fn close_failure(&self, token: RequestToken, symbol: &Symbol) {
        let clock = self.clock.hold_if_current(token);
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.release(token);
        let open = inner.closing.take_if(|t| *t == token).is_some();
        if clock.is_none() || !open {
            #[cfg(feature = "tracing")]
            tracing::debug!(token = %token, "failed request superseded before close");
            return;
        }
        if let Some(series) = self.placeholder(inner, symbol) {
            self.emit(HistoryEvent::Placeholder { token, series });
        }
        self.emit(HistoryEvent::Loading {
            token,
            loading: false,
        });
    }

    fn placeholder(&self, inner: &mut Inner, symbol: &Symbol) -> Option<HistorySeries> {
        let (_, snapshot) = inner.snapshot.as_ref().filter(|(s, _)| s == symbol)?;
        match inner
            .fallback
            .synthesize(snapshot, self.fallback_points, self.today.today())
        {
            Ok(series) => Some(series),
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_e, "placeholder generation failed");
                None
            }
        }
    }

    /// Fetch the snapshot a placeholder needs, unless one is cached or the
    /// request went stale meanwhile.
    async fn prefetch_snapshot(
        &self,
        source: &dyn StockConnector,
        symbol: &Symbol,
        token: RequestToken,
        signal: &FetchSignal,
    ) {
        let Some(provider) = source.as_snapshot_provider() else {
            return;
        };
        if !self.clock.is_current(token) || self.has_snapshot(symbol) {
            return;
        }
        let fetched = tokio::select! {
            biased;
            () = signal.cancelled() => return,
            r = tokio::time::timeout(self.snapshot_timeout, provider.snapshot(symbol)) => r,
        };
        match fetched {
            Ok(Ok(snapshot)) => self.store_snapshot(symbol.clone(), snapshot),
            Ok(Err(_e)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(symbol = %symbol, error = %_e, "snapshot unavailable for placeholder");
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(symbol = %symbol, timeout = ?self.snapshot_timeout, "snapshot lookup timed out");
            }
        }
    }
}

fn failure_message(period: &PeriodSelector, error: &StocklensError) -> String {
    match period {
        PeriodSelector::Preset { .. } => {
            format!("Failed to fetch data: {}", error.user_message())
        }
        PeriodSelector::Custom { .. } => {
            format!("Failed to fetch data for date range: {}", error.user_message())
        }
    }
}

async fn run_fetch(
    shared: Arc<Shared>,
    source: Arc<dyn StockConnector>,
    token: RequestToken,
    query: HistoryQuery,
    signal: FetchSignal,
) {
    let result = match source.as_history_provider() {
        Some(provider) => provider
            .history(&query, signal.clone())
            .await
            .map_err(|e| tag_err(source.name(), e)),
        None => Err(StocklensError::unsupported("history")),
    };
    let needs_quote = result.as_ref().is_err_and(StocklensError::is_user_facing)
        && source.as_snapshot_provider().is_some()
        && !shared.has_snapshot(&query.symbol);
    if !needs_quote {
        shared.complete(token, &query, result);
        return;
    }
    // The error goes out now; the placeholder waits for the quote.
    if shared.deliver(token, &query, result, true) != Completion::Applied {
        return;
    }
    shared
        .prefetch_snapshot(source.as_ref(), &query.symbol, token, &signal)
        .await;
    shared.close_failure(token, &query.symbol);
}

/// Runs one fetch per token and applies only the latest token's result.
pub struct RequestCoordinator {
    shared: Arc<Shared>,
    source: Arc<dyn StockConnector>,
}

impl std::fmt::Debug for RequestCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCoordinator")
            .field("source", &self.source.name())
            .field("state", &self.state())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl RequestCoordinator {
    /// Coordinator reading tokens from `clock` and emitting on `events`.
    #[must_use]
    pub fn new(
        clock: Arc<TokenClock>,
        source: Arc<dyn StockConnector>,
        events: mpsc::UnboundedSender<HistoryEvent>,
        fallback: FallbackSynthesizer,
        fallback_points: usize,
        snapshot_timeout: Duration,
        today: Arc<dyn Today>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                clock,
                inner: Mutex::new(Inner {
                    state: FetchState::Idle,
                    outstanding: None,
                    superseded: Vec::new(),
                    stats: CoordinatorStats::default(),
                    snapshot: None,
                    fallback,
                    delivered: None,
                    closing: None,
                }),
                events,
                today,
                fallback_points,
                snapshot_timeout,
            }),
            source,
        }
    }

    /// Start fetching `query` for `token`.
    ///
    /// The previous outstanding fetch is signalled first. Returns `false`, and
    /// counts a stale discard, when `token` is no longer the latest.
    ///
    /// Must be called from within a Tokio runtime.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "stocklens::coordinator::submit",
            skip(self, query),
            fields(token = %token, symbol = %query.symbol, period = query.period.tag()),
        )
    )]
    pub fn submit(&self, token: RequestToken, query: HistoryQuery) -> bool {
        let Some(_clock) = self.shared.clock.hold_if_current(token) else {
            self.shared.lock().stats.stale_discarded += 1;
            #[cfg(feature = "tracing")]
            tracing::debug!("submit for stale token ignored");
            return false;
        };
        let mut guard = self.shared.lock();
        let inner = &mut *guard;
        inner.supersede();
        inner.stats.submitted += 1;

        let (stop_tx, signal) = FetchSignal::pair();
        let join = tokio::spawn(run_fetch(
            Arc::clone(&self.shared),
            Arc::clone(&self.source),
            token,
            query,
            signal,
        ));
        inner.outstanding = Some(FetchHandle::new(token, join, stop_tx));
        inner.state = FetchState::Loading { token };
        // The task cannot complete before this: it needs the clock we hold.
        self.shared.emit(HistoryEvent::Loading {
            token,
            loading: true,
        });
        true
    }

    /// Deliver a result for `token` through the staleness guard.
    ///
    /// Spawned fetches call this themselves; it is public for callers that
    /// drive requests on their own. Only the first result for the latest
    /// token is applied; later ones come back `Discarded`.
    pub fn complete(
        &self,
        token: RequestToken,
        query: &HistoryQuery,
        result: Result<HistorySeries, StocklensError>,
    ) -> Completion {
        self.shared.complete(token, query, result)
    }

    /// Signal the outstanding fetch, return to `Idle` and emit `Cleared`.
    ///
    /// `token` is the token minted by the clear.
    pub fn reset(&self, token: RequestToken) {
        let mut inner = self.shared.lock();
        inner.supersede();
        inner.state = FetchState::Idle;
        self.shared.emit(HistoryEvent::Cleared { token });
    }

    /// Remember the latest real quote for `symbol` as placeholder seed.
    pub fn set_snapshot(&self, symbol: Symbol, snapshot: OhlcSnapshot) {
        self.shared.store_snapshot(symbol, snapshot);
    }

    /// Current display state.
    #[must_use]
    pub fn state(&self) -> FetchState {
        self.shared.lock().state.clone()
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> CoordinatorStats {
        self.shared.lock().stats
    }

    /// Wait until every spawned fetch has returned.
    ///
    /// A source that never returns keeps this pending. Dropping the future
    /// aborts the fetches it has not joined yet.
    pub async fn settle(&self) {
        let handles: Vec<FetchHandle> = {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            inner
                .superseded
                .drain(..)
                .chain(inner.outstanding.take())
                .collect()
        };
        for h in handles {
            h.join().await;
        }
    }

    /// Signal and abort every fetch still running.
    pub fn abort_all(&self) {
        let handles: Vec<FetchHandle> = {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            inner
                .superseded
                .drain(..)
                .chain(inner.outstanding.take())
                .collect()
        };
        for h in handles {
            h.abort();
        }
    }
}

impl Drop for RequestCoordinator {
    fn drop(&mut self) {
        self.abort_all();
    }
}
