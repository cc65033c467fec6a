use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};

use crate::aggregator::WatchlistReport;
use crate::error::AppError;

pub const UNAVAILABLE: &str = "N/A";

pub const EXPORT_HEADER: [&str; 8] = [
    "Symbol",
    "Company",
    "Current Price",
    "Day Change (%)",
    "1-Week Change (%)",
    "1-Month Change (%)",
    "52-Week High",
    "52-Week Low",
];

/// Signed, two decimals, trailing percent sign.
pub fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.2}%", v),
        None => UNAVAILABLE.to_string(),
    }
}

pub fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => UNAVAILABLE.to_string(),
    }
}

/// Writes one CSV row per watchlist entry after the header row.
pub fn export_watchlist_csv<W: Write>(report: &WatchlistReport, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADER).map_err(AppError::from)?;
    for row in &report.rows {
        let m = row.metrics();
        let record = [
            row.symbol.clone(),
            row.display_name.clone(),
            format_price(m.and_then(|m| m.current_price)),
            format_pct(m.and_then(|m| m.day_change_pct)),
            format_pct(m.and_then(|m| m.week_change_pct)),
            format_pct(m.and_then(|m| m.month_change_pct)),
            format_price(m.and_then(|m| m.year_high)),
            format_price(m.and_then(|m| m.year_low)),
        ];
        wtr.write_record(&record).map_err(AppError::from)?;
    }
    wtr.flush().map_err(AppError::from)?;
    Ok(())
}

pub fn watchlist_csv_string(report: &WatchlistReport) -> Result<String> {
    let mut buf = Vec::new();
    export_watchlist_csv(report, &mut buf)?;
    String::from_utf8(buf).context("exported CSV is not valid UTF-8")
}

fn export_file_name(report: &WatchlistReport) -> String {
    let stamp = Utc
        .timestamp_millis_opt(report.refreshed_at_ms)
        .single()
        .unwrap_or_else(Utc::now)
        .format("%Y%m%d_%H%M%S");
    let user: String = report
        .user
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("watchlist_{}_{}.csv", user, stamp)
}

/// Writes the report into `dir` and returns the created file path.
pub fn write_export_file(report: &WatchlistReport, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(export_file_name(report));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    export_watchlist_csv(report, file)?;
    tracing::info!(path = %path.display(), rows = report.rows.len(), "watchlist exported");
    Ok(path)
}
