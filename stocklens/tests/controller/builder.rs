use std::sync::Arc;

use stocklens::{
    ControllerConfig, HistoryController, HistoryEvent, Preset, StockConnector, StocklensError,
    ValidationError,
};
use stocklens_mock::{MockBehavior, ScriptedSource};

use crate::helpers::{series, until_idle};

struct QuotesOnly;

impl StockConnector for QuotesOnly {
    fn name(&self) -> &'static str {
        "quotes-only"
    }
}

#[test]
fn build_without_source_is_invalid() {
    let err = HistoryController::builder()
        .build()
        .err()
        .expect("missing source");
    assert!(matches!(err, StocklensError::InvalidArg(_)));
}

#[test]
fn source_must_serve_history() {
    let err = HistoryController::builder()
        .with_source(Arc::new(QuotesOnly))
        .build()
        .err()
        .expect("no history capability");
    assert_eq!(err, StocklensError::unsupported("history"));
}

#[test]
fn zero_placeholder_points_is_rejected() {
    let (source, _ctrl) = ScriptedSource::new_with_controller("scripted");
    let err = HistoryController::builder()
        .with_source(source)
        .fallback_points(0)
        .build()
        .err()
        .expect("zero points");
    assert_eq!(
        err,
        StocklensError::Validation(ValidationError::InvalidPointCount)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn config_applies_exchange_and_default_window() {
    let (source, ctrl) = ScriptedSource::new_with_controller("scripted");
    ctrl.set_default_history(MockBehavior::Return(series(1.0))).await;
    let cfg = ControllerConfig {
        default_preset: Preset::M1,
        default_exchange: Some("NS".into()),
        ..ControllerConfig::default()
    };
    let (mut c, mut rx) = HistoryController::builder()
        .with_source(source)
        .config(cfg)
        .rng_seed(3)
        .build()
        .expect("controller builds");

    let t = c.set_symbol("tcs").expect("valid symbol");
    let events = until_idle(&mut rx, t).await;
    assert!(
        events
            .iter()
            .any(|e| matches!(e, HistoryEvent::Data { .. }))
    );

    let q = ctrl.history_queries().await.pop().expect("a fetch");
    assert_eq!(q.symbol.as_query(), "TCS.NS");
    assert_eq!(q.symbol.display(), "TCS");
    assert_eq!(q.period.tag(), "1mo");

    // An explicit suffix wins over the default exchange.
    let t = c.set_symbol("reliance.bo").expect("valid symbol");
    until_idle(&mut rx, t).await;
    let q = ctrl.history_queries().await.pop().expect("a fetch");
    assert_eq!(q.symbol.as_query(), "RELIANCE.BO");
}
