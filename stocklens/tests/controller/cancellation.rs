use stocklens::{FetchState, HistoryEvent, Preset};
use stocklens_mock::MockBehavior;

use crate::helpers::{drain, scripted, series, until_idle, yield_a_bit};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn source_ignoring_cancellation_is_caught_by_staleness_guard() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Gate).await;
    ctrl.honor_cancellation(false).await;

    c.set_symbol("INFY").expect("valid symbol");
    let t2 = c.set_preset(Preset::M6);
    ctrl.wait_for_calls(2).await;
    assert_eq!(ctrl.cancelled_calls().await, vec![true, false]);

    // Signalled but still running: its answer arrives anyway.
    assert!(ctrl.release(0, Ok(series(1.0))).await);
    assert!(ctrl.release(1, Ok(series(2.0))).await);
    until_idle(&mut rx, t2).await;
    c.settle().await;

    let stats = c.stats();
    assert_eq!(stats.stale_discarded, 1);
    assert_eq!(stats.cancelled_outcomes, 0);
    assert_eq!(stats.applied, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn clear_cancels_in_flight_fetch_and_goes_idle() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Hang).await;

    let t1 = c.set_symbol("TCS").expect("valid symbol");
    ctrl.wait_for_calls(1).await;
    let t2 = c.clear();
    assert!(t2 > t1);
    c.settle().await;

    assert_eq!(c.fetch_state(), FetchState::Idle);
    assert!(c.selection().symbol().is_none());
    assert_eq!(ctrl.cancelled_calls().await, vec![true]);

    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![
            HistoryEvent::Loading {
                token: t1,
                loading: true
            },
            HistoryEvent::Cleared { token: t2 },
        ]
    );
    assert_eq!(c.stats().stale_discarded, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropping_controller_signals_outstanding_fetch() {
    let (mut c, _rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Hang).await;
    ctrl.honor_cancellation(false).await;

    c.set_symbol("TCS").expect("valid symbol");
    ctrl.wait_for_calls(1).await;
    assert_eq!(ctrl.cancelled_calls().await, vec![false]);

    drop(c);
    yield_a_bit().await;
    assert_eq!(ctrl.cancelled_calls().await, vec![true]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_invalidates_everything() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Gate).await;
    ctrl.honor_cancellation(false).await;

    let t1 = c.set_symbol("TCS").expect("valid symbol");
    ctrl.wait_for_calls(1).await;
    c.shutdown();

    // Even if the aborted task still sees this, its token is stale.
    ctrl.release(0, Ok(series(1.0))).await;
    yield_a_bit().await;
    assert_eq!(c.fetch_state(), FetchState::Idle);
    assert!(c.latest_token() > t1);
    assert!(
        !drain(&mut rx)
            .iter()
            .any(|e| matches!(e, HistoryEvent::Data { .. }))
    );
}
