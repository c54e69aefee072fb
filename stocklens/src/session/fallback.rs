use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use stocklens_core::{HistoryPoint, HistorySeries, OhlcSnapshot, ValidationError};

/// Maximum relative deviation of a synthetic close from the real one.
pub const MAX_DEVIATION: f64 = 0.02;

const SYNTHETIC_VOLUME: std::ops::Range<u64> = 100_000..1_100_000;
const MISSING_LAST_VOLUME: std::ops::Range<u64> = 500_000..1_500_000;

/// Builds a placeholder series around the last real quote after a failed fetch.
pub struct FallbackSynthesizer {
    rng: Box<dyn RngCore + Send>,
}

impl std::fmt::Debug for FallbackSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackSynthesizer").finish_non_exhaustive()
    }
}

impl FallbackSynthesizer {
    /// Use the given generator.
    #[must_use]
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self { rng: Box::new(rng) }
    }

    /// Reproducible output for a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Seeded from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// `points` consecutive days ending at `today`.
    ///
    /// Earlier days carry the snapshot close moved by at most
    /// [`MAX_DEVIATION`] in either direction. The final day reproduces the
    /// snapshot's prices and volume.
    ///
    /// # Errors
    /// `InvalidPointCount` for zero points or a window reaching before the
    /// calendar's first representable day.
    pub fn synthesize(
        &mut self,
        snapshot: &OhlcSnapshot,
        points: usize,
        today: NaiveDate,
    ) -> Result<HistorySeries, ValidationError> {
        let last = points
            .checked_sub(1)
            .ok_or(ValidationError::InvalidPointCount)?;
        let back = u64::try_from(last).map_err(|_| ValidationError::InvalidPointCount)?;
        let first = today
            .checked_sub_days(Days::new(back))
            .ok_or(ValidationError::InvalidPointCount)?;

        let mut out = Vec::with_capacity(points);
        for date in first.iter_days().take(last) {
            let factor = 1.0 + self.rng.random_range(-MAX_DEVIATION..MAX_DEVIATION);
            let price = snapshot.close * factor;
            out.push(HistoryPoint {
                date,
                open: price,
                high: price,
                low: price,
                close: price,
                volume: self.rng.random_range(SYNTHETIC_VOLUME),
            });
        }
        let volume = match snapshot.volume {
            Some(v) => v,
            None => self.rng.random_range(MISSING_LAST_VOLUME),
        };
        out.push(HistoryPoint {
            date: today,
            open: snapshot.open,
            high: snapshot.high,
            low: snapshot.low,
            close: snapshot.close,
            volume,
        });
        HistorySeries::new(out)
    }
}
