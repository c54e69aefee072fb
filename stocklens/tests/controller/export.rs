use stocklens::{ExportFormat, FetchState, Preset, StocklensError, ValidationError};
use stocklens_mock::MockBehavior;

use crate::helpers::{d, scripted, series, sym, until_idle};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn export_query_matches_the_fetch_for_the_same_selection() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Return(series(1.0))).await;

    c.set_symbol("TCS").expect("valid symbol");
    let t = c.set_preset(Preset::M3);
    until_idle(&mut rx, t).await;

    let req = c.export_request().expect("complete selection");
    let fetched = ctrl.history_queries().await.pop().expect("a fetch");
    assert_eq!(req.query, fetched);
    assert_eq!(req.format, ExportFormat::Csv);
    assert_eq!(req.filename(), "TCS_3mo.csv");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn custom_range_export_matches_and_names_the_range() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Return(series(1.0))).await;

    c.set_symbol("RELIANCE").expect("valid symbol");
    c.choose_custom();
    let t = c
        .set_custom_range(Some(d("2024-01-01")), Some(d("2024-03-31")))
        .expect("valid range");
    until_idle(&mut rx, t).await;

    let req = c.export_request().expect("complete selection");
    assert_eq!(
        req.query,
        ctrl.history_queries().await.pop().expect("a fetch")
    );
    assert_eq!(req.filename(), "RELIANCE_2024-01-01_to_2024-03-31.csv");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn export_in_pending_custom_mode_reports_missing_range() {
    let (mut c, _rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Return(series(1.0))).await;
    c.set_symbol("TCS").expect("valid symbol");
    c.choose_custom();

    let err = c.download_csv().await.expect_err("no committed dates");
    assert_eq!(
        err,
        StocklensError::Validation(ValidationError::MissingRange)
    );
    assert_eq!(err.user_message(), "missing range");
    assert!(ctrl.export_requests().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn export_without_symbol_is_rejected() {
    let (c, _rx, _ctrl) = scripted();
    assert_eq!(
        c.export_request().expect_err("no symbol"),
        StocklensError::Validation(ValidationError::NoSymbol)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn download_returns_body_and_filename() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Return(series(1.0))).await;
    ctrl.set_export_behavior(
        sym("INFY"),
        MockBehavior::Return("date,close\n2024-06-28,1\n".to_string()),
    )
    .await;

    let t = c.set_symbol("INFY").expect("valid symbol");
    until_idle(&mut rx, t).await;

    let dl = c.download_csv().await.expect("export succeeds");
    assert_eq!(dl.filename, "INFY_7d.csv");
    assert_eq!(dl.body, "date,close\n2024-06-28,1\n");

    let sent = ctrl.export_requests().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].query, ctrl.history_queries().await[0]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn export_failure_is_returned_without_fallback() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Return(series(1.0))).await;
    ctrl.set_export_behavior(
        sym("TCS"),
        MockBehavior::Fail(StocklensError::http(500, "export broke")),
    )
    .await;

    let t = c.set_symbol("TCS").expect("valid symbol");
    until_idle(&mut rx, t).await;

    let err = c.download_csv().await.expect_err("export fails");
    assert_eq!(err, StocklensError::http(500, "export broke"));
    // Display state is untouched by export failures.
    assert!(matches!(c.fetch_state(), FetchState::Success { token, .. } if token == t));
    assert!(rx.try_recv().is_err());
}
