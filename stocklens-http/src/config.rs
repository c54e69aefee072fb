use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backend the dashboard talks to when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Client-side request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for [`crate::HttpSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSourceConfig {
    /// Scheme, host and optional path prefix of the backend.
    pub base_url: String,
    /// Per-request timeout, covering connect and body.
    pub timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("stocklens/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpSourceConfig {
    /// Default settings pointed at `base_url`.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Replace the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
