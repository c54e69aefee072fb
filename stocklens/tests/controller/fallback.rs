use std::time::Duration;

use chrono::Days;
use stocklens::{
    FallbackSynthesizer, FetchState, FixedToday, HistoryController, HistoryEvent, HistorySeries,
    MAX_DEVIATION, Preset, StocklensError,
};
use stocklens_mock::{MockBehavior, ScriptedSource};

use crate::helpers::{drain, scripted, series, snapshot, sym, today, until_idle};

fn placeholder_of(events: &[HistoryEvent]) -> Option<&HistorySeries> {
    events.iter().find_map(|e| match e {
        HistoryEvent::Placeholder { series, .. } => Some(series),
        _ => None,
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failure_with_known_quote_yields_error_then_placeholder() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Fail(StocklensError::http(
        404,
        "No historical data available for 'TCS'",
    )))
    .await;

    c.set_symbol("TCS").expect("valid symbol");
    c.set_snapshot(snapshot(100.0, Some(5000)))
        .expect("symbol selected");
    let t = c.set_preset(Preset::M1);
    let events = until_idle(&mut rx, t).await;
    let events: Vec<_> = events.into_iter().filter(|e| e.token() == t).collect();

    assert_eq!(events.len(), 4, "{events:?}");
    assert_eq!(
        events[0],
        HistoryEvent::Loading {
            token: t,
            loading: true
        }
    );
    assert_eq!(
        events[1],
        HistoryEvent::Error {
            token: t,
            message: "Failed to fetch data: No historical data available for 'TCS'".into()
        }
    );
    let HistoryEvent::Placeholder { series, .. } = &events[2] else {
        panic!("expected placeholder, got {:?}", events[2]);
    };
    assert_eq!(series.len(), 7);
    let last = series.last().expect("non-empty");
    assert_eq!(last.date, today());
    assert!((last.close - 100.0).abs() < f64::EPSILON);
    assert!((last.open - 98.0).abs() < f64::EPSILON);
    assert_eq!(last.volume, 5000);

    assert!(matches!(c.fetch_state(), FetchState::Failed { token, .. } if token == t));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failure_fetches_missing_snapshot_for_placeholder() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Fail(StocklensError::Transport(
        "connection refused".into(),
    )))
    .await;
    ctrl.set_snapshot_behavior(sym("INFY"), MockBehavior::Return(snapshot(50.0, None)))
        .await;

    let t = c.set_symbol("INFY").expect("valid symbol");
    let events = until_idle(&mut rx, t).await;

    assert_eq!(ctrl.snapshot_requests().await, vec![sym("INFY")]);
    let placeholder = placeholder_of(&events).expect("placeholder emitted");
    let last = placeholder.last().expect("non-empty");
    assert!((last.close - 50.0).abs() < f64::EPSILON);
    assert!((500_000..1_500_000).contains(&last.volume));
    assert!(events.iter().any(|e| matches!(
        e,
        HistoryEvent::Error { message, .. } if message == "Failed to fetch data: connection refused"
    )));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn hanging_quote_lookup_does_not_hold_back_the_error() {
    let (source, ctrl) = ScriptedSource::new_with_controller("scripted");
    ctrl.set_default_history(MockBehavior::Fail(StocklensError::http(500, "boom")))
        .await;
    ctrl.set_snapshot_behavior(sym("TCS"), MockBehavior::Hang).await;
    let (mut c, mut rx) = HistoryController::builder()
        .with_source(source)
        .today(FixedToday(today()))
        .rng_seed(7)
        .snapshot_timeout(Duration::from_millis(300))
        .build()
        .expect("controller builds");

    let t = c.set_symbol("TCS").expect("valid symbol");
    let first = tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            match rx.recv().await {
                Some(HistoryEvent::Error { token, message }) if token == t => break message,
                Some(_) => {}
                None => panic!("event channel closed"),
            }
        }
    })
    .await
    .expect("error reported while the quote lookup hangs");
    assert_eq!(first, "Failed to fetch data: boom");
    assert!(matches!(c.fetch_state(), FetchState::Failed { token, .. } if token == t));

    let rest = until_idle(&mut rx, t).await;
    assert_eq!(
        rest,
        vec![HistoryEvent::Loading {
            token: t,
            loading: false
        }]
    );
    assert_eq!(ctrl.snapshot_requests().await, vec![sym("TCS")]);
    c.settle().await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn newer_selection_cuts_a_pending_quote_lookup_short() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_history_behavior(
        sym("TCS"),
        MockBehavior::Fail(StocklensError::http(500, "boom")),
    )
    .await;
    ctrl.set_snapshot_behavior(sym("TCS"), MockBehavior::Hang).await;
    ctrl.set_history_behavior(sym("INFY"), MockBehavior::Return(series(9.0)))
        .await;

    let t1 = c.set_symbol("TCS").expect("valid symbol");
    ctrl.wait_for_calls(1).await;
    while ctrl.snapshot_requests().await.is_empty() {
        tokio::task::yield_now().await;
    }
    let t2 = c.set_symbol("INFY").expect("valid symbol");
    let events = until_idle(&mut rx, t2).await;
    c.settle().await;
    let events: Vec<_> = events.into_iter().chain(drain(&mut rx)).collect();

    assert!(
        !events
            .iter()
            .any(|e| matches!(e, HistoryEvent::Loading { token, loading: false } if *token == t1))
    );
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, HistoryEvent::Placeholder { .. }))
    );
    assert!(matches!(c.fetch_state(), FetchState::Success { token, .. } if token == t2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failure_without_any_quote_reports_error_only() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Fail(StocklensError::http(500, "boom")))
        .await;

    let t = c.set_symbol("TCS").expect("valid symbol");
    let events = until_idle(&mut rx, t).await;
    assert!(placeholder_of(&events).is_none());
    assert!(
        events
            .iter()
            .any(|e| matches!(e, HistoryEvent::Error { .. }))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn success_never_emits_placeholder() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Return(series(3.0))).await;
    c.set_symbol("TCS").expect("valid symbol");
    c.set_snapshot(snapshot(100.0, Some(1))).expect("symbol selected");
    let t = c.set_preset(Preset::M3);
    let events = until_idle(&mut rx, t).await;
    assert!(placeholder_of(&events).is_none());
    assert!(ctrl.snapshot_requests().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn snapshot_for_other_symbol_is_not_used() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Fail(StocklensError::http(500, "boom")))
        .await;
    c.set_symbol("TCS").expect("valid symbol");
    c.set_snapshot(snapshot(100.0, Some(1))).expect("symbol selected");
    let t = c.set_symbol("INFY").expect("valid symbol");
    let events = until_idle(&mut rx, t).await;
    assert!(placeholder_of(&events).is_none());
}

#[test]
fn synthesized_series_stays_within_band_and_ends_exact() {
    let snap = snapshot(250.0, Some(42));
    let mut synth = FallbackSynthesizer::seeded(99);
    let s = synth.synthesize(&snap, 30, today()).expect("30 points");

    assert_eq!(s.len(), 30);
    let first = s.points()[0].date;
    assert_eq!(first.checked_add_days(Days::new(29)), Some(today()));
    for w in s.points().windows(2) {
        assert_eq!(w[0].date.checked_add_days(Days::new(1)), Some(w[1].date));
    }
    for p in &s.points()[..29] {
        let dev = (p.close - 250.0).abs() / 250.0;
        assert!(dev <= MAX_DEVIATION, "{} deviates {dev}", p.date);
    }
    let last = s.last().expect("non-empty");
    assert_eq!(
        (last.open, last.high, last.low, last.close, last.volume),
        (snap.open, snap.high, snap.low, snap.close, 42)
    );
}

#[test]
fn same_seed_same_placeholder() {
    let snap = snapshot(10.0, None);
    let a = FallbackSynthesizer::seeded(5)
        .synthesize(&snap, 12, today())
        .expect("points");
    let b = FallbackSynthesizer::seeded(5)
        .synthesize(&snap, 12, today())
        .expect("points");
    assert_eq!(a, b);
}
