use std::fmt;

use serde::{Deserialize, Serialize};

/// Generation number of one selection change.
///
/// Tokens are minted by the controller's clock, strictly increasing within a
/// session and never reused. Only ordering and equality are meaningful.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RequestToken(u64);

impl RequestToken {
    /// The value before the first mint; never issued for a request.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw generation number.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw generation number, for logging.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The following generation.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
