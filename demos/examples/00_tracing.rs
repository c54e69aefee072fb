use stocklens::{HistoryController, Preset};
use stocklens_demos::common::{get_source, print_pending};
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize a human-friendly tracing subscriber with env-based filtering.
    // Suggested: RUST_LOG=info,stocklens=debug,stocklens_http=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let (mut controller, mut events) = HistoryController::builder()
        .with_source(get_source())
        .default_exchange("NS")
        .build()?;

    controller.set_symbol("TCS")?;
    controller.settle().await;
    controller.set_preset(Preset::M1);
    controller.settle().await;

    print_pending(&mut events);
    println!("stats: {:?}", controller.stats());
    Ok(())
}
