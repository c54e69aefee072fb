use stocklens::{HistoryController, OhlcSnapshot, Preset, SystemToday, Today};
use stocklens_demos::common::{get_source, print_pending};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (mut controller, mut events) = HistoryController::builder()
        .with_source(get_source())
        .rng_seed(42)
        .build()?;

    // The mock fails every request for this symbol.
    controller.set_symbol("FAIL")?;
    controller.settle().await;
    print_pending(&mut events);

    // With a known quote the next failure is backed by a placeholder series.
    controller.set_snapshot(OhlcSnapshot {
        date: SystemToday.today(),
        open: 101.0,
        high: 103.5,
        low: 99.2,
        close: 102.4,
        volume: Some(750_000),
    })?;
    controller.set_preset(Preset::M1);
    controller.settle().await;
    print_pending(&mut events);

    controller.clear();
    print_pending(&mut events);
    Ok(())
}
