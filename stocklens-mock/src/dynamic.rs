use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify, oneshot};

use stocklens_core::connector::{
    ExportProvider, HistoryProvider, SnapshotProvider, StockConnector,
};
use stocklens_core::{
    ExportRequest, FetchSignal, HistoryQuery, HistorySeries, OhlcSnapshot, StocklensError, Symbol,
};

/// Instruction for how a method should behave for a given input.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(StocklensError),
    /// Hang indefinitely (simulate a stalled request).
    Hang,
    /// Park the call until the test releases it with [`ScriptController::release`].
    Gate,
}

type HistoryResult = Result<HistorySeries, StocklensError>;

struct RecordedCall {
    query: HistoryQuery,
    signal: FetchSignal,
}

struct InternalState {
    history_rules: HashMap<Symbol, MockBehavior<HistorySeries>>,
    default_history: Option<MockBehavior<HistorySeries>>,
    snapshot_rules: HashMap<Symbol, MockBehavior<OhlcSnapshot>>,
    export_rules: HashMap<Symbol, MockBehavior<String>>,
    calls: Vec<RecordedCall>,
    gates: HashMap<usize, oneshot::Sender<HistoryResult>>,
    export_requests: Vec<ExportRequest>,
    snapshot_requests: Vec<Symbol>,
    honor_cancellation: bool,
}

impl Default for InternalState {
    fn default() -> Self {
        Self {
            history_rules: HashMap::new(),
            default_history: None,
            snapshot_rules: HashMap::new(),
            export_rules: HashMap::new(),
            calls: Vec::new(),
            gates: HashMap::new(),
            export_requests: Vec::new(),
            snapshot_requests: Vec::new(),
            honor_cancellation: true,
        }
    }
}

#[derive(Default)]
struct Shared {
    state: Mutex<InternalState>,
    called: Notify,
}

/// Controller handle used by tests to drive the scripted source from the outside.
pub struct ScriptController {
    shared: Arc<Shared>,
}

impl ScriptController {
    /// Set the behavior for `history` calls for a specific symbol.
    pub async fn set_history_behavior(
        &self,
        symbol: Symbol,
        behavior: MockBehavior<HistorySeries>,
    ) {
        let mut guard = self.shared.state.lock().await;
        guard.history_rules.insert(symbol, behavior);
    }

    /// Behavior for `history` calls on symbols without a specific rule.
    pub async fn set_default_history(&self, behavior: MockBehavior<HistorySeries>) {
        let mut guard = self.shared.state.lock().await;
        guard.default_history = Some(behavior);
    }

    /// Set the behavior for `snapshot` calls for a specific symbol.
    pub async fn set_snapshot_behavior(
        &self,
        symbol: Symbol,
        behavior: MockBehavior<OhlcSnapshot>,
    ) {
        let mut guard = self.shared.state.lock().await;
        guard.snapshot_rules.insert(symbol, behavior);
    }

    /// Set the behavior for `export` calls for a specific symbol.
    pub async fn set_export_behavior(&self, symbol: Symbol, behavior: MockBehavior<String>) {
        let mut guard = self.shared.state.lock().await;
        guard.export_rules.insert(symbol, behavior);
    }

    /// Whether parked and hanging calls return `Cancelled` once signalled.
    ///
    /// Defaults to `true`. With `false` the source behaves like a transport
    /// that cannot stop in-flight I/O.
    pub async fn honor_cancellation(&self, yes: bool) {
        let mut guard = self.shared.state.lock().await;
        guard.honor_cancellation = yes;
    }

    /// Resolve the parked call number `index` (0-based, in arrival order).
    ///
    /// Returns `false` if the call is not parked or already gave up.
    pub async fn release(&self, index: usize, result: HistoryResult) -> bool {
        let tx = {
            let mut guard = self.shared.state.lock().await;
            guard.gates.remove(&index)
        };
        tx.is_some_and(|tx| tx.send(result).is_ok())
    }

    /// Wait until at least `n` history calls have arrived.
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.shared.called.notified();
            if self.shared.state.lock().await.calls.len() >= n {
                return;
            }
            notified.await;
        }
    }

    /// Queries received so far, in arrival order.
    pub async fn history_queries(&self) -> Vec<HistoryQuery> {
        let guard = self.shared.state.lock().await;
        guard.calls.iter().map(|c| c.query.clone()).collect()
    }

    /// For each call so far, whether its cancellation signal has fired.
    pub async fn cancelled_calls(&self) -> Vec<bool> {
        let guard = self.shared.state.lock().await;
        guard.calls.iter().map(|c| c.signal.is_cancelled()).collect()
    }

    /// Export requests received so far.
    pub async fn export_requests(&self) -> Vec<ExportRequest> {
        self.shared.state.lock().await.export_requests.clone()
    }

    /// Symbols for which a snapshot was requested.
    pub async fn snapshot_requests(&self) -> Vec<Symbol> {
        self.shared.state.lock().await.snapshot_requests.clone()
    }

    /// Clear all configured behaviors and request logs.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.shared.state.lock().await;
        *guard = InternalState::default();
    }
}

enum Plan {
    Ready(HistoryResult),
    Hang,
    Parked(oneshot::Receiver<HistoryResult>),
}

/// A connector that defers all behavior to an external controller.
pub struct ScriptedSource {
    name: &'static str,
    shared: Arc<Shared>,
}

impl ScriptedSource {
    /// Create a new scripted source and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<dyn StockConnector>, ScriptController) {
        let shared = Arc::new(Shared::default());
        let controller = ScriptController {
            shared: Arc::clone(&shared),
        };
        let me = Arc::new(Self { name, shared });
        (me as Arc<dyn StockConnector>, controller)
    }

    async fn wait_cancelled(signal: &FetchSignal, honor: bool) -> HistoryResult {
        if honor {
            signal.cancelled().await;
            return Err(StocklensError::Cancelled);
        }
        std::future::pending().await
    }
}

impl StockConnector for ScriptedSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "ScriptedMock"
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
impl HistoryProvider for ScriptedSource {
    async fn history(&self, query: &HistoryQuery, signal: FetchSignal) -> HistoryResult {
        // Record the call and decide without holding the lock across await points
        let (plan, honor) = {
            let mut guard = self.shared.state.lock().await;
            let index = guard.calls.len();
            guard.calls.push(RecordedCall {
                query: query.clone(),
                signal: signal.clone(),
            });
            let behavior = guard
                .history_rules
                .get(&query.symbol)
                .or(guard.default_history.as_ref())
                .cloned();
            let plan = match behavior {
                Some(MockBehavior::Return(series)) => Plan::Ready(Ok(series)),
                Some(MockBehavior::Fail(e)) => Plan::Ready(Err(e)),
                Some(MockBehavior::Hang) => Plan::Hang,
                Some(MockBehavior::Gate) => {
                    let (tx, rx) = oneshot::channel();
                    guard.gates.insert(index, tx);
                    Plan::Parked(rx)
                }
                None => Plan::Ready(Err(StocklensError::not_found(format!(
                    "history for {}",
                    query.symbol
                )))),
            };
            (plan, guard.honor_cancellation)
        };
        self.shared.called.notify_waiters();

        match plan {
            Plan::Ready(result) => result,
            Plan::Hang => Self::wait_cancelled(&signal, honor).await,
            Plan::Parked(rx) => {
                tokio::select! {
                    biased;
                    r = rx => r.unwrap_or(Err(StocklensError::Cancelled)),
                    r = Self::wait_cancelled(&signal, honor) => r,
                }
            }
        }
    }
}

#[async_trait]
impl SnapshotProvider for ScriptedSource {
    async fn snapshot(&self, symbol: &Symbol) -> Result<OhlcSnapshot, StocklensError> {
        let behavior = {
            let mut guard = self.shared.state.lock().await;
            guard.snapshot_requests.push(symbol.clone());
            guard.snapshot_rules.get(symbol).cloned()
        };

        match behavior {
            Some(MockBehavior::Return(s)) => Ok(s),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang | MockBehavior::Gate) => std::future::pending().await,
            None => Err(StocklensError::unsupported("snapshot")),
        }
    }
}

#[async_trait]
impl ExportProvider for ScriptedSource {
    async fn export(&self, req: &ExportRequest) -> Result<String, StocklensError> {
        let behavior = {
            let mut guard = self.shared.state.lock().await;
            guard.export_requests.push(req.clone());
            guard.export_rules.get(&req.query.symbol).cloned()
        };

        match behavior {
            Some(MockBehavior::Return(body)) => Ok(body),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang | MockBehavior::Gate) => std::future::pending().await,
            None => Err(StocklensError::unsupported("export")),
        }
    }
}
