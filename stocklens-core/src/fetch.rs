use tokio::sync::watch;
use tokio::task::JoinHandle;

use stocklens_types::RequestToken;

/// Abstraction over a handle that can be queried for completion and aborted.
pub trait Abortable {
    /// Abort the underlying task if it is still running.
    fn abort(&mut self);
    /// Return `true` if the underlying task has completed.
    fn is_finished(&self) -> bool;
}

impl Abortable for JoinHandle<()> {
    fn abort(&mut self) {
        Self::abort(self);
    }

    fn is_finished(&self) -> bool {
        Self::is_finished(self)
    }
}

/// Abstraction over a one-shot cancellation signal.
pub trait Stoppable {
    /// Send a best-effort cancellation signal.
    fn send(self);
}

impl Stoppable for watch::Sender<bool> {
    fn send(self) {
        // Receivers keep the last value after the sender is gone.
        let _ = Self::send(&self, true);
    }
}

/// Drop-time logic for fetch handles:
/// - flip the cancellation signal if it has not been sent yet
/// - abort the task if it hasn't finished yet
pub fn drop_impl<H, S>(inner: &mut Option<H>, stop_tx: &mut Option<S>)
where
    H: Abortable,
    S: Stoppable,
{
    if let Some(tx) = stop_tx.take() {
        tx.send();
    }
    if let Some(mut h) = inner.take()
        && !h.is_finished()
    {
        h.abort();
    }
}

/// Receiving side of a request's cancellation signal.
///
/// Cloned freely; every clone observes the same flip.
#[derive(Debug, Clone)]
pub struct FetchSignal {
    rx: watch::Receiver<bool>,
}

impl FetchSignal {
    /// Create a connected sender/signal pair.
    #[must_use]
    pub fn pair() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    /// A signal that never fires, for callers that do not cancel.
    #[must_use]
    pub fn never() -> Self {
        let (_tx, signal) = Self::pair();
        signal
    }

    /// `true` once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested.
    ///
    /// Never resolves if the sender is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Handle to one in-flight history request.
///
/// `cancel` only signals; the task keeps running until the source returns so
/// that its late result can still be observed and discarded. Dropping the
/// handle signals and aborts.
#[derive(Debug)]
pub struct FetchHandle {
    token: RequestToken,
    inner: Option<JoinHandle<()>>,
    stop_tx: Option<watch::Sender<bool>>,
}

impl FetchHandle {
    /// Wrap a spawned fetch task and the sender half of its signal.
    #[must_use]
    pub const fn new(
        token: RequestToken,
        inner: JoinHandle<()>,
        stop_tx: watch::Sender<bool>,
    ) -> Self {
        Self {
            token,
            inner: Some(inner),
            stop_tx: Some(stop_tx),
        }
    }

    /// Token of the request this handle drives.
    #[must_use]
    pub const fn token(&self) -> RequestToken {
        self.token
    }

    /// Request cancellation. Returns `false` if it was already requested.
    pub fn cancel(&mut self) -> bool {
        self.stop_tx.take().is_some_and(|tx| {
            #[cfg(feature = "tracing")]
            tracing::debug!(token = %self.token, "fetch cancellation signalled");
            tx.send();
            true
        })
    }

    /// `true` once the underlying task has returned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the task to return without aborting it.
    pub async fn join(mut self) {
        if let Some(h) = self.inner.take() {
            let _ = h.await;
        }
    }

    /// Signal and abort immediately.
    pub fn abort(mut self) {
        #[cfg(feature = "tracing")]
        if !self.is_finished() {
            tracing::debug!(token = %self.token, "aborting running fetch");
        }
        drop_impl(&mut self.inner, &mut self.stop_tx);
    }

    /// Let the task run to completion unobserved, without signalling it.
    ///
    /// Used by a task that is releasing its own handle.
    pub fn detach(mut self) {
        self.stop_tx.take();
        self.inner.take();
    }
}

impl Drop for FetchHandle {
    fn drop(&mut self) {
        #[cfg(feature = "tracing")]
        if self.inner.as_ref().is_some_and(|h| !h.is_finished()) {
            tracing::debug!(token = %self.token, "fetch handle dropped while running; aborting");
        }
        drop_impl(&mut self.inner, &mut self.stop_tx);
    }
}
