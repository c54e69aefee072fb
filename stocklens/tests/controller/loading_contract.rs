use std::sync::Arc;

use stocklens::{
    FixedToday, HistoryController, HistoryEvent, HistoryListener, HistorySeries, Preset,
    RequestToken, forward_events,
};
use stocklens_mock::{MockBehavior, MockConnector};

use crate::helpers::{d, scripted, series, until_idle};

#[derive(Default)]
struct Panel {
    log: Vec<String>,
}

impl HistoryListener for Panel {
    fn on_history_data(&mut self, series: HistorySeries) {
        self.log.push(format!("data:{}", series.len()));
    }
    fn on_loading(&mut self, loading: bool) {
        self.log.push(format!("loading:{loading}"));
    }
    fn on_error(&mut self, message: String) {
        self.log.push(format!("error:{message}"));
    }
    fn on_placeholder(&mut self, series: HistorySeries) {
        self.log.push(format!("placeholder:{}", series.len()));
    }
    fn on_cleared(&mut self) {
        self.log.push("cleared".into());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fixture_session_reaches_listener_in_order() {
    let (mut c, rx) = HistoryController::builder()
        .with_source(Arc::new(MockConnector::new()))
        .today(FixedToday(d("2024-01-12")))
        .rng_seed(1)
        .build()
        .expect("controller builds");

    c.set_symbol("tcs").expect("valid symbol");
    c.settle().await;
    c.set_symbol("FAIL").expect("valid symbol");
    c.settle().await;
    c.clear();
    drop(c);

    let mut panel = Panel::default();
    forward_events(rx, &mut panel).await;
    assert_eq!(
        panel.log,
        vec![
            "loading:true",
            "data:5",
            "loading:false",
            "loading:true",
            "error:Failed to fetch data: forced failure: history",
            "loading:false",
            "cleared",
        ]
    );
}

fn assert_contract(events: &[HistoryEvent], token: RequestToken) {
    assert_eq!(events.len(), 3, "{events:?}");
    assert!(events.iter().all(|e| e.token() == token));
    assert!(matches!(events[0], HistoryEvent::Loading { loading: true, .. }));
    assert!(matches!(events[1], HistoryEvent::Data { .. }));
    assert!(matches!(events[2], HistoryEvent::Loading { loading: false, .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn each_request_opens_and_closes_loading_once() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Return(series(1.0))).await;

    let t = c.set_symbol("TCS").expect("valid symbol");
    assert_contract(&until_idle(&mut rx, t).await, t);
    for preset in [Preset::M1, Preset::M6] {
        let t = c.set_preset(preset);
        assert_contract(&until_idle(&mut rx, t).await, t);
    }
    c.settle().await;
    assert!(rx.try_recv().is_err());
    assert!(!c.fetch_state().is_loading());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn state_is_loading_while_request_is_parked() {
    let (mut c, mut rx, ctrl) = scripted();
    ctrl.set_default_history(MockBehavior::Gate).await;
    let t = c.set_symbol("TCS").expect("valid symbol");
    assert!(c.fetch_state().is_loading());
    assert_eq!(c.fetch_state().token(), Some(t));
    assert_eq!(
        rx.recv().await,
        Some(HistoryEvent::Loading {
            token: t,
            loading: true
        })
    );

    ctrl.wait_for_calls(1).await;
    ctrl.release(0, Ok(series(9.0))).await;
    until_idle(&mut rx, t).await;
    assert!(!c.fetch_state().is_loading());
}
