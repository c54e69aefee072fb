use stocklens::{FetchState, HistoryEvent, PeriodSelector, Preset, StocklensError, ValidationError, Window};
use stocklens_mock::MockBehavior;

use crate::helpers::{d, drain, scripted, series, until_idle, yield_a_bit};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn inverted_range_is_rejected_without_a_request() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Return(series(1.0))).await;

    let t1 = c.set_symbol("TCS").expect("valid symbol");
    until_idle(&mut rx, t1).await;

    c.choose_custom();
    let err = c
        .set_custom_range(Some(d("2024-01-01")), Some(d("2023-01-01")))
        .expect_err("inverted range");
    assert_eq!(
        err,
        StocklensError::Validation(ValidationError::InvertedRange {
            start: d("2024-01-01"),
            end: d("2023-01-01"),
        })
    );
    yield_a_bit().await;

    assert_eq!(ctrl.history_queries().await.len(), 1);
    assert_eq!(c.latest_token(), t1);
    assert_eq!(c.stats().cancellations_sent, 0);
    assert!(matches!(c.fetch_state(), FetchState::Success { token, .. } if token == t1));
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn future_and_missing_dates_are_rejected() {
    let (mut c, _rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Return(series(1.0))).await;
    c.set_symbol("TCS").expect("valid symbol");
    ctrl.wait_for_calls(1).await;
    c.choose_custom();

    let err = c
        .set_custom_range(Some(d("2024-06-01")), Some(d("2024-07-01")))
        .expect_err("future end");
    assert!(matches!(
        err,
        StocklensError::Validation(ValidationError::FutureDate { .. })
    ));

    let err = c
        .set_custom_range(Some(d("2024-06-01")), None)
        .expect_err("missing end");
    assert_eq!(
        err,
        StocklensError::Validation(ValidationError::MissingRange)
    );

    // Today itself is allowed.
    c.set_custom_range(Some(d("2024-06-01")), Some(d("2024-06-28")))
        .expect("range ending today");
    ctrl.wait_for_calls(2).await;
    assert_eq!(ctrl.history_queries().await.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_symbol_is_rejected_locally() {
    let (mut c, mut rx, ctrl) = scripted();
    let err = c.set_symbol("   ").expect_err("blank symbol");
    assert_eq!(err, StocklensError::Validation(ValidationError::EmptySymbol));
    yield_a_bit().await;
    assert!(ctrl.history_queries().await.is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn window_change_without_symbol_fetches_nothing() {
    let (mut c, mut rx, ctrl) = scripted();
    let t = c.set_preset(Preset::Y2);
    assert_eq!(c.latest_token(), t);
    assert_eq!(*c.selection().window(), Window::Preset(Preset::Y2));
    yield_a_bit().await;
    assert!(ctrl.history_queries().await.is_empty());
    assert!(drain(&mut rx).is_empty());
    assert_eq!(c.fetch_state(), FetchState::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn choosing_custom_mode_alone_keeps_current_request() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Gate).await;
    let t1 = c.set_symbol("TCS").expect("valid symbol");
    ctrl.wait_for_calls(1).await;

    c.choose_custom();
    assert_eq!(c.latest_token(), t1);
    assert_eq!(ctrl.cancelled_calls().await, vec![false]);

    ctrl.release(0, Ok(series(4.0))).await;
    let events = until_idle(&mut rx, t1).await;
    assert!(
        events
            .iter()
            .any(|e| matches!(e, HistoryEvent::Data { token, .. } if *token == t1))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn symbol_change_resets_window_to_default() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Return(series(1.0))).await;
    c.set_symbol("TCS").expect("valid symbol");
    c.set_preset(Preset::Y5);
    let t = c.set_symbol("infy").expect("valid symbol");
    until_idle(&mut rx, t).await;

    let last = ctrl
        .history_queries()
        .await
        .pop()
        .expect("at least one query");
    assert_eq!(last.symbol.display(), "INFY");
    assert_eq!(last.period, PeriodSelector::from(Preset::D7));
}
