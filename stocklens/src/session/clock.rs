use std::sync::{Mutex, MutexGuard, PoisonError};

use stocklens_core::RequestToken;

/// The session's single "current token" cell.
///
/// Minting and the staleness check take the same lock, so a result can be
/// applied only while no newer token can be minted.
#[derive(Debug, Default)]
pub struct TokenClock {
    latest: Mutex<RequestToken>,
}

impl TokenClock {
    /// A clock that has not minted anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RequestToken> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue the next token; it is greater than every token issued before.
    pub fn mint(&self) -> RequestToken {
        let mut latest = self.lock();
        *latest = latest.next();
        *latest
    }

    /// Most recently minted token, or `RequestToken::ZERO`.
    #[must_use]
    pub fn latest(&self) -> RequestToken {
        *self.lock()
    }

    /// `true` if `token` is still the latest.
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        *self.lock() == token
    }

    /// Hold the clock while `token` is current; `None` when it is stale.
    ///
    /// While the guard lives no token can be minted.
    pub(crate) fn hold_if_current(
        &self,
        token: RequestToken,
    ) -> Option<MutexGuard<'_, RequestToken>> {
        let guard = self.lock();
        (*guard == token).then_some(guard)
    }
}
