use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rand::RngCore;
use tokio::sync::mpsc;

use stocklens_core::{
    ControllerConfig, CsvDownload, ExportFormat, ExportRequest, OhlcSnapshot, Preset, RequestToken,
    StockConnector, StocklensError, SystemToday, Today, ValidationError,
};

use crate::session::{
    CoordinatorStats, ExportBuilder, FallbackSynthesizer, FetchState, HistoryEvent,
    RequestCoordinator, SelectionState, TokenClock,
};

/// Acquisition controller for one dashboard session.
///
/// Every committed selection change mints a token and starts one fetch; only
/// the latest token's outcome reaches the event channel. Mutations take
/// `&mut self`, so a session has a single writer while fetches complete
/// concurrently in Tokio tasks.
pub struct HistoryController {
    source: Arc<dyn StockConnector>,
    selection: SelectionState,
    coordinator: RequestCoordinator,
    export: ExportBuilder,
}

/// Builder for a [`HistoryController`] and its event receiver.
pub struct HistoryControllerBuilder {
    source: Option<Arc<dyn StockConnector>>,
    cfg: ControllerConfig,
    today: Arc<dyn Today>,
    rng: Option<Box<dyn RngCore + Send>>,
}

impl Default for HistoryControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryControllerBuilder {
    /// Create a new builder with the default configuration.
    ///
    /// - No source is registered; one must be provided via [`Self::with_source`].
    /// - Symbols get no exchange suffix, the default window is `7d`, placeholders
    ///   hold seven points and are seeded from the OS.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            cfg: ControllerConfig::default(),
            today: Arc::new(SystemToday),
            rng: None,
        }
    }

    /// Register the connector serving history, snapshots and exports.
    ///
    /// Registering again replaces the previous source.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn StockConnector>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: ControllerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Window selected whenever the symbol changes.
    #[must_use]
    pub const fn default_preset(mut self, preset: Preset) -> Self {
        self.cfg.default_preset = preset;
        self
    }

    /// Length of placeholder series after a failure.
    #[must_use]
    pub const fn fallback_points(mut self, points: usize) -> Self {
        self.cfg.fallback_points = points;
        self
    }

    /// Exchange suffix attached to symbols typed without one, e.g. `NS`.
    #[must_use]
    pub fn default_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.cfg.default_exchange = Some(exchange.into());
        self
    }

    /// Seed placeholder generation for reproducible output.
    #[must_use]
    pub const fn rng_seed(mut self, seed: u64) -> Self {
        self.cfg.rng_seed = Some(seed);
        self
    }

    /// Use a specific generator for placeholders. Takes precedence over a seed.
    #[must_use]
    pub fn rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Upper bound on the quote lookup a failed fetch makes for its placeholder.
    #[must_use]
    pub const fn snapshot_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.snapshot_timeout = timeout;
        self
    }

    /// Clock used for future-date checks and placeholder dates.
    #[must_use]
    pub fn today(mut self, today: impl Today + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    /// Build the controller and the receiver its events go to.
    ///
    /// # Errors
    /// - `InvalidArg` if no source was registered.
    /// - `Unsupported` if the source cannot serve history.
    /// - `Validation(InvalidPointCount)` for a zero placeholder length.
    pub fn build(
        self,
    ) -> Result<(HistoryController, mpsc::UnboundedReceiver<HistoryEvent>), StocklensError> {
        let Some(source) = self.source else {
            return Err(StocklensError::InvalidArg(
                "no source registered; add one via with_source(...)".to_string(),
            ));
        };
        if source.as_history_provider().is_none() {
            return Err(StocklensError::unsupported("history"));
        }
        if self.cfg.fallback_points == 0 {
            return Err(ValidationError::InvalidPointCount.into());
        }

        let fallback = match (self.rng, self.cfg.rng_seed) {
            (Some(rng), _) => FallbackSynthesizer::new(rng),
            (None, Some(seed)) => FallbackSynthesizer::seeded(seed),
            (None, None) => FallbackSynthesizer::from_os_rng(),
        };
        let clock = Arc::new(TokenClock::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = RequestCoordinator::new(
            Arc::clone(&clock),
            Arc::clone(&source),
            tx,
            fallback,
            self.cfg.fallback_points,
            self.cfg.snapshot_timeout,
            Arc::clone(&self.today),
        );
        let selection = SelectionState::new(
            clock,
            self.today,
            self.cfg.default_preset,
            self.cfg.default_exchange,
        );

        Ok((
            HistoryController {
                source,
                selection,
                coordinator,
                export: ExportBuilder::new(ExportFormat::Csv),
            },
            rx,
        ))
    }
}

/// Attach the connector name to errors that do not already identify their origin.
pub fn tag_err(connector: &str, e: StocklensError) -> StocklensError {
    match e {
        e @ (StocklensError::Validation(_)
        | StocklensError::Http { .. }
        | StocklensError::NotFound { .. }
        | StocklensError::Cancelled
        | StocklensError::Unsupported { .. }
        | StocklensError::InvalidArg(_)
        | StocklensError::Connector { .. }) => e,
        other => StocklensError::Connector {
            connector: connector.to_string(),
            msg: other.user_message(),
        },
    }
}

impl HistoryController {
    /// Start building a controller.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use stocklens::HistoryController;
    /// use stocklens_http::HttpSource;
    ///
    /// let (mut controller, mut events) = HistoryController::builder()
    ///     .with_source(Arc::new(HttpSource::new_default()?))
    ///     .default_exchange("NS")
    ///     .build()?;
    /// controller.set_symbol("tcs")?;
    /// while let Some(ev) = events.recv().await { /* render */ }
    /// ```
    #[must_use]
    pub fn builder() -> HistoryControllerBuilder {
        HistoryControllerBuilder::new()
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// What is currently displayed.
    #[must_use]
    pub fn fetch_state(&self) -> FetchState {
        self.coordinator.state()
    }

    /// Request counters.
    #[must_use]
    pub fn stats(&self) -> CoordinatorStats {
        self.coordinator.stats()
    }

    /// Token of the latest committed change.
    #[must_use]
    pub fn latest_token(&self) -> RequestToken {
        self.selection.token()
    }

    /// Fetch for the current selection, if it has a complete query.
    fn resubmit(&self, token: RequestToken) {
        if let Ok(query) = self.selection.query() {
            self.coordinator.submit(token, query);
        }
    }

    /// Look up `raw` with the default window.
    ///
    /// # Errors
    /// `Validation` for an empty or malformed symbol; nothing is fetched.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "stocklens::controller::set_symbol", skip(self), err)
    )]
    pub fn set_symbol(&mut self, raw: &str) -> Result<RequestToken, StocklensError> {
        let token = self.selection.set_symbol(raw)?;
        self.resubmit(token);
        Ok(token)
    }

    /// Switch to a preset window.
    ///
    /// Without a symbol the token is minted but nothing is fetched.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "stocklens::controller::set_preset", skip(self), fields(preset = %preset))
    )]
    pub fn set_preset(&mut self, preset: Preset) -> RequestToken {
        let token = self.selection.set_preset(preset);
        self.resubmit(token);
        token
    }

    /// Enter custom range mode; nothing is fetched until dates are committed.
    pub fn choose_custom(&mut self) {
        self.selection.choose_custom();
    }

    /// Commit a custom date range.
    ///
    /// # Errors
    /// `Validation` when a date is missing, the range is inverted, or a date
    /// lies in the future. No fetch is started and nothing is cancelled.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "stocklens::controller::set_custom_range", skip(self), err)
    )]
    pub fn set_custom_range(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<RequestToken, StocklensError> {
        let token = self.selection.set_custom_range(start, end)?;
        self.resubmit(token);
        Ok(token)
    }

    /// Drop the symbol and whatever is displayed.
    pub fn clear(&mut self) -> RequestToken {
        let token = self.selection.clear();
        self.coordinator.reset(token);
        token
    }

    /// Remember the latest real quote for the current symbol.
    ///
    /// # Errors
    /// `Validation(NoSymbol)` without a symbol.
    pub fn set_snapshot(&self, snapshot: OhlcSnapshot) -> Result<(), StocklensError> {
        let symbol = self
            .selection
            .symbol()
            .cloned()
            .ok_or(ValidationError::NoSymbol)?;
        self.coordinator.set_snapshot(symbol, snapshot);
        Ok(())
    }

    /// Fetch and remember the latest real quote for the current symbol.
    ///
    /// # Errors
    /// `Validation(NoSymbol)`, `Unsupported` if the source has no snapshot
    /// capability, or the source's own error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "stocklens::controller::load_snapshot", skip(self), err)
    )]
    pub async fn load_snapshot(&self) -> Result<OhlcSnapshot, StocklensError> {
        let symbol = self
            .selection
            .symbol()
            .cloned()
            .ok_or(ValidationError::NoSymbol)?;
        let provider = self
            .source
            .as_snapshot_provider()
            .ok_or_else(|| StocklensError::unsupported("snapshot"))?;
        let snapshot = provider
            .snapshot(&symbol)
            .await
            .map_err(|e| tag_err(self.source.name(), e))?;
        self.coordinator.set_snapshot(symbol, snapshot.clone());
        Ok(snapshot)
    }

    /// Export request for the current selection.
    ///
    /// # Errors
    /// `Validation(NoSymbol)` or `Validation(MissingRange)`.
    pub fn export_request(&self) -> Result<ExportRequest, StocklensError> {
        Ok(self.export.build(&self.selection)?)
    }

    /// Download the CSV export for the current selection.
    ///
    /// Failures are returned as-is; nothing is synthesized and the display
    /// state is untouched.
    ///
    /// # Errors
    /// Validation errors from [`Self::export_request`], `Unsupported` if the
    /// source cannot export, or the source's own error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "stocklens::controller::download_csv", skip(self), err)
    )]
    pub async fn download_csv(&self) -> Result<CsvDownload, StocklensError> {
        let req = self.export_request()?;
        let provider = self
            .source
            .as_export_provider()
            .ok_or_else(|| StocklensError::unsupported("export"))?;
        let body = provider
            .export(&req)
            .await
            .map_err(|e| tag_err(self.source.name(), e))?;
        Ok(CsvDownload {
            filename: req.filename(),
            body,
        })
    }

    /// Wait until every spawned fetch has returned.
    ///
    /// Stale results are counted as they arrive. A source that never returns
    /// keeps this pending.
    pub async fn settle(&self) {
        self.coordinator.settle().await;
    }

    /// Invalidate everything outstanding and abort the fetch tasks.
    pub fn shutdown(&mut self) {
        let token = self.selection.clear();
        self.coordinator.reset(token);
        self.coordinator.abort_all();
    }
}
