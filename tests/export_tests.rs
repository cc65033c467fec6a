use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;

use market_watch::aggregator::{
    refresh_watchlist, RefreshOptions, SnapshotStatus, SymbolSnapshot, WatchlistReport,
};
use market_watch::export::{watchlist_csv_string, write_export_file, EXPORT_HEADER};
use market_watch::model::{ChangeMetrics, LookbackWindow, PriceSeries};
use market_watch::quotes::QuoteProvider;
use market_watch::registry::{Instrument, InstrumentCategory, SymbolRegistry};
use market_watch::session::{SessionContext, UserId};
use market_watch::watchlist_store::{SqliteWatchlistStore, WatchlistStore};

struct StaticProvider {
    closes: HashMap<String, Vec<f64>>,
}

#[async_trait]
impl QuoteProvider for StaticProvider {
    async fn fetch_series(&self, symbol: &str, window: LookbackWindow) -> Result<PriceSeries> {
        match self.closes.get(symbol) {
            Some(closes) => Ok(PriceSeries::from_closes(symbol, window, closes)),
            None => bail!("no data for {}", symbol),
        }
    }
}

fn report_with(rows: Vec<SymbolSnapshot>) -> WatchlistReport {
    WatchlistReport {
        user: "alice".to_string(),
        rows,
        refreshed_at_ms: 1_718_150_400_000,
    }
}

#[tokio::test]
async fn single_symbol_export_end_to_end() {
    let store = SqliteWatchlistStore::open_in_memory().unwrap();
    store.add_symbol("alice", "AAA").unwrap();
    let registry = SymbolRegistry::from_instruments(vec![Instrument::new(
        "AAA Corp",
        "AAA",
        InstrumentCategory::Equity,
    )])
    .unwrap();
    let provider = StaticProvider {
        closes: HashMap::from([("AAA".to_string(), vec![98.0, 100.0])]),
    };
    let ctx = SessionContext::new(UserId::new("alice").unwrap());

    let report = refresh_watchlist(&ctx, &store, &provider, &registry, RefreshOptions::default())
        .await
        .expect("refresh should succeed");
    let csv = watchlist_csv_string(&report).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 2);
    let cells: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(cells[0], "AAA");
    assert_eq!(cells[1], "AAA Corp");
    assert_eq!(cells[2], "100.00");
    assert_eq!(cells[3], "+2.04%");
}

#[test]
fn two_entries_produce_two_rows() {
    let report = report_with(vec![
        SymbolSnapshot {
            symbol: "TCS.NS".to_string(),
            display_name: "TATA CONSULTANCY SERVICES".to_string(),
            status: SnapshotStatus::Ready(ChangeMetrics {
                current_price: Some(3890.5),
                day_change_pct: Some(-1.25),
                week_change_pct: Some(0.5),
                month_change_pct: None,
                year_high: Some(4200.0),
                year_low: Some(3300.0),
                ..ChangeMetrics::default()
            }),
        },
        SymbolSnapshot {
            symbol: "GC=F".to_string(),
            display_name: "GOLD".to_string(),
            status: SnapshotStatus::Failed("timeout".to_string()),
        },
    ]);

    let csv = watchlist_csv_string(&report).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], EXPORT_HEADER.join(","));
    assert_eq!(
        lines[1],
        "TCS.NS,TATA CONSULTANCY SERVICES,3890.50,-1.25%,+0.50%,N/A,4200.00,3300.00"
    );
    assert_eq!(lines[2], "GC=F,GOLD,N/A,N/A,N/A,N/A,N/A,N/A");
}

#[test]
fn empty_report_exports_header_only() {
    let csv = watchlist_csv_string(&report_with(Vec::new())).unwrap();
    assert_eq!(csv.lines().count(), 1);
}

#[test]
fn export_file_is_written_to_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("exports");
    let path = write_export_file(&report_with(Vec::new()), &out).expect("export should succeed");

    assert!(path.starts_with(&out));
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("watchlist_alice_"));
    assert!(name.ends_with(".csv"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("Symbol,Company,Current Price"));
}
