//! Ticker symbols.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Case-insensitive ticker identifier.
///
/// The root (`TCS`) is what the dashboard displays; the exchange suffix
/// (`NS`) is kept so queries target the right listing (`TCS.NS`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol {
    root: String,
    exchange: Option<String>,
}

impl Symbol {
    /// Parse a user-entered symbol.
    ///
    /// # Errors
    /// `EmptySymbol` for blank input, `InvalidSymbol` when the ticker contains
    /// whitespace or an empty root/suffix around the dot.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let s = raw.trim().to_ascii_uppercase();
        if s.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidSymbol(raw.trim().to_string()));
        }
        let (root, exchange) = match s.rsplit_once('.') {
            Some((root, ex)) => (root.to_string(), Some(ex.to_string())),
            None => (s, None),
        };
        if root.is_empty() || exchange.as_deref().is_some_and(str::is_empty) {
            return Err(ValidationError::InvalidSymbol(raw.trim().to_string()));
        }
        Ok(Self { root, exchange })
    }

    /// Attach `exchange` when the user typed no suffix.
    #[must_use]
    pub fn or_exchange(mut self, exchange: Option<&str>) -> Self {
        if self.exchange.is_none()
            && let Some(ex) = exchange.map(|e| e.trim().trim_start_matches('.'))
            && !ex.is_empty()
        {
            self.exchange = Some(ex.to_ascii_uppercase());
        }
        self
    }

    /// Ticker without the exchange suffix, e.g. `TCS`.
    #[must_use]
    pub fn display(&self) -> &str {
        &self.root
    }

    /// Exchange suffix without the dot, if any.
    #[must_use]
    pub fn exchange(&self) -> Option<&str> {
        self.exchange.as_deref()
    }

    /// Form sent to the service, e.g. `TCS.NS`.
    #[must_use]
    pub fn as_query(&self) -> String {
        match &self.exchange {
            Some(ex) => format!("{}.{ex}", self.root),
            None => self.root.clone(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_query())
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(s: Symbol) -> Self {
        s.as_query()
    }
}
