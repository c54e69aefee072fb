use std::sync::Arc;

use chrono::NaiveDate;

use stocklens_core::{
    DateRange, HistoryQuery, PeriodSelector, Preset, RequestToken, Symbol, Today, ValidationError,
};

use super::clock::TokenClock;

/// Time window the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// A preset lookback.
    Preset(Preset),
    /// Custom range mode; dates stay `None` until the user commits both.
    Custom {
        /// Committed first day.
        start: Option<NaiveDate>,
        /// Committed last day.
        end: Option<NaiveDate>,
    },
}

impl Window {
    /// `true` in custom range mode, committed or not.
    #[must_use]
    pub const fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }

    /// Selector for this window.
    ///
    /// # Errors
    /// `MissingRange` in custom mode without both dates.
    pub fn selector(&self) -> Result<PeriodSelector, ValidationError> {
        match *self {
            Self::Preset(preset) => Ok(PeriodSelector::Preset { preset }),
            Self::Custom {
                start: Some(start),
                end: Some(end),
            } => Ok(PeriodSelector::Custom {
                range: DateRange::new(start, end)?,
            }),
            Self::Custom { .. } => Err(ValidationError::MissingRange),
        }
    }
}

/// Current symbol and window. Every committed change mints a token.
pub struct SelectionState {
    symbol: Option<Symbol>,
    window: Window,
    default_preset: Preset,
    default_exchange: Option<String>,
    clock: Arc<TokenClock>,
    today: Arc<dyn Today>,
}

impl std::fmt::Debug for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionState")
            .field("symbol", &self.symbol)
            .field("window", &self.window)
            .field("latest", &self.clock.latest())
            .finish_non_exhaustive()
    }
}

impl SelectionState {
    /// Empty selection writing to `clock`.
    #[must_use]
    pub fn new(
        clock: Arc<TokenClock>,
        today: Arc<dyn Today>,
        default_preset: Preset,
        default_exchange: Option<String>,
    ) -> Self {
        Self {
            symbol: None,
            window: Window::Preset(default_preset),
            default_preset,
            default_exchange,
            clock,
            today,
        }
    }

    /// Selected symbol, if any.
    #[must_use]
    pub const fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    /// Selected window.
    #[must_use]
    pub const fn window(&self) -> &Window {
        &self.window
    }

    /// Token minted by the latest committed change.
    #[must_use]
    pub fn token(&self) -> RequestToken {
        self.clock.latest()
    }

    /// Select a symbol and reset the window to the default preset.
    ///
    /// # Errors
    /// `EmptySymbol` or `InvalidSymbol`; nothing changes and no token is minted.
    pub fn set_symbol(&mut self, raw: &str) -> Result<RequestToken, ValidationError> {
        let symbol = Symbol::parse(raw)?.or_exchange(self.default_exchange.as_deref());
        self.symbol = Some(symbol);
        self.window = Window::Preset(self.default_preset);
        Ok(self.clock.mint())
    }

    /// Switch to a preset, dropping any custom dates.
    pub fn set_preset(&mut self, preset: Preset) -> RequestToken {
        self.window = Window::Preset(preset);
        self.clock.mint()
    }

    /// Enter custom range mode without committing dates.
    ///
    /// No token is minted; whatever is outstanding stays current.
    pub fn choose_custom(&mut self) {
        if !self.window.is_custom() {
            self.window = Window::Custom {
                start: None,
                end: None,
            };
        }
    }

    /// Commit a custom range.
    ///
    /// # Errors
    /// `MissingRange`, `InvertedRange` or `FutureDate`. The selection is left
    /// untouched and no token is minted.
    pub fn set_custom_range(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<RequestToken, ValidationError> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(ValidationError::MissingRange);
        };
        let range = DateRange::new(start, end)?;
        let today = self.today.today();
        if let Some(date) = [range.start(), range.end()].into_iter().find(|d| *d > today) {
            return Err(ValidationError::FutureDate { date, today });
        }
        self.window = Window::Custom {
            start: Some(start),
            end: Some(end),
        };
        Ok(self.clock.mint())
    }

    /// Forget the symbol. Mints a token so outstanding results go stale.
    pub fn clear(&mut self) -> RequestToken {
        self.symbol = None;
        self.window = Window::Preset(self.default_preset);
        self.clock.mint()
    }

    /// The query a fetch or an export of this selection uses.
    ///
    /// # Errors
    /// `NoSymbol` without a symbol, `MissingRange` in uncommitted custom mode.
    pub fn query(&self) -> Result<HistoryQuery, ValidationError> {
        let symbol = self.symbol.clone().ok_or(ValidationError::NoSymbol)?;
        Ok(HistoryQuery::new(symbol, self.window.selector()?))
    }
}
