use chrono::NaiveDate;
use stocklens::HistoryController;
use stocklens_demos::common::{get_source, print_pending};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (mut controller, mut events) = HistoryController::builder()
        .with_source(get_source())
        .default_exchange("NS")
        .build()?;

    controller.set_symbol("RELIANCE")?;
    controller.choose_custom();

    // Exporting before both dates are committed is refused locally.
    if let Err(e) = controller.export_request() {
        println!("export before committing dates: {}", e.user_message());
    }

    // Inverted ranges never reach the backend.
    let start = NaiveDate::from_ymd_opt(2024, 1, 10).ok_or("bad date")?;
    let end = NaiveDate::from_ymd_opt(2024, 1, 2).ok_or("bad date")?;
    if let Err(e) = controller.set_custom_range(Some(start), Some(end)) {
        println!("rejected: {}", e.user_message());
    }

    controller.set_custom_range(Some(end), Some(start))?;
    controller.settle().await;
    print_pending(&mut events);

    let download = controller.download_csv().await?;
    println!("{} ({} bytes)", download.filename, download.body.len());
    for line in download.body.lines().take(3) {
        println!("  {line}");
    }
    Ok(())
}
