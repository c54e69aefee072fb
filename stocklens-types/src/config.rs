//! Configuration types shared by the controller and its builder.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Preset;

/// Placeholder length used by the dashboard's chart.
pub const DEFAULT_FALLBACK_POINTS: usize = 7;

/// How long a failed fetch waits for the quote its placeholder needs.
pub const DEFAULT_SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(3);

/// Global configuration for a `HistoryController` session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Preset applied whenever the symbol changes.
    pub default_preset: Preset,
    /// Number of points in a placeholder series after a failed fetch.
    pub fallback_points: usize,
    /// Exchange suffix attached to symbols typed without one (e.g. `NS`).
    pub default_exchange: Option<String>,
    /// Seed for the placeholder generator; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    /// Upper bound on the quote lookup after a failure. The request closes
    /// without a placeholder when it elapses.
    pub snapshot_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_preset: Preset::default(),
            fallback_points: DEFAULT_FALLBACK_POINTS,
            default_exchange: None,
            rng_seed: None,
            snapshot_timeout: DEFAULT_SNAPSHOT_TIMEOUT,
        }
    }
}
