use chrono::NaiveDate;
use stocklens_core::{HistoryPoint, HistorySeries};

/// Daily history for the fixture symbols, keyed by display root.
pub fn by_symbol(s: &str) -> Option<HistorySeries> {
    match s {
        "TCS" => build(&[
            ("2024-01-02", 3800.0, 3850.0, 3780.0, 3835.5, 1_900_000),
            ("2024-01-03", 3835.5, 3860.0, 3790.0, 3801.2, 2_100_000),
            ("2024-01-04", 3801.2, 3822.0, 3770.0, 3776.8, 1_750_000),
            ("2024-01-05", 3776.8, 3810.0, 3760.0, 3798.0, 1_640_000),
            ("2024-01-08", 3798.0, 3840.0, 3795.0, 3831.4, 1_980_000),
            ("2024-01-09", 3831.4, 3870.0, 3825.0, 3862.9, 2_300_000),
            ("2024-01-10", 3862.9, 3880.0, 3840.0, 3851.0, 1_870_000),
            ("2024-01-11", 3851.0, 3905.0, 3848.0, 3899.6, 2_650_000),
            ("2024-01-12", 3899.6, 3990.0, 3890.0, 3975.3, 4_120_000),
        ]),
        "INFY" => build(&[
            ("2024-01-08", 1540.0, 1552.0, 1531.0, 1549.1, 5_400_000),
            ("2024-01-09", 1549.1, 1560.0, 1540.0, 1543.7, 5_100_000),
            ("2024-01-10", 1543.7, 1547.0, 1525.0, 1529.8, 6_200_000),
            ("2024-01-11", 1529.8, 1575.0, 1528.0, 1571.2, 7_900_000),
            ("2024-01-12", 1571.2, 1640.0, 1566.0, 1631.0, 12_400_000),
        ]),
        "RELIANCE" => build(&[
            ("2024-01-10", 2590.0, 2612.0, 2581.0, 2606.4, 3_300_000),
            ("2024-01-11", 2606.4, 2630.0, 2598.0, 2624.9, 3_550_000),
            ("2024-01-12", 2624.9, 2641.0, 2610.0, 2618.2, 2_980_000),
        ]),
        _ => None,
    }
}

fn build(rows: &[(&str, f64, f64, f64, f64, u64)]) -> Option<HistorySeries> {
    let points = rows
        .iter()
        .map(|&(date, open, high, low, close, volume)| {
            Some(HistoryPoint {
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?,
                open,
                high,
                low,
                close,
                volume,
            })
        })
        .collect::<Option<Vec<_>>>()?;
    HistorySeries::new(points).ok()
}
