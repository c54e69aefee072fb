use stocklens::{FetchState, HistoryController, Preset};
use stocklens_demos::common::{get_source, print_pending};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (mut controller, mut events) = HistoryController::builder()
        .with_source(get_source())
        .default_exchange("NS")
        .build()?;

    // Three window changes back to back; only the last one may populate the chart.
    controller.set_symbol("INFY")?;
    controller.set_preset(Preset::M1);
    let latest = controller.set_preset(Preset::M3);
    controller.settle().await;

    print_pending(&mut events);
    match controller.fetch_state() {
        FetchState::Success { token, series } => {
            println!("showing {token} ({} points), latest is {latest}", series.len());
        }
        FetchState::Failed { token, error } => println!("{token} failed: {error}"),
        other => println!("state: {other:?}"),
    }
    let stats = controller.stats();
    println!(
        "submitted={} applied={} stale={} cancellations={}",
        stats.submitted, stats.applied, stats.stale_discarded, stats.cancellations_sent
    );
    Ok(())
}
