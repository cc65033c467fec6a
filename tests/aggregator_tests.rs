use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;

use market_watch::aggregator::{
    add_by_display_name, fetch_history, fetch_symbol_metrics, refresh_market_board,
    refresh_symbols, refresh_watchlist, remove, top_movers, RefreshOptions, SnapshotStatus,
    SymbolSnapshot, UNKNOWN_DISPLAY_NAME,
};
use market_watch::error::AppError;
use market_watch::model::{ChangeMetrics, LookbackWindow, MetricName, PriceSeries};
use market_watch::quotes::QuoteProvider;
use market_watch::registry::{Instrument, InstrumentCategory, SymbolRegistry};
use market_watch::session::{SessionContext, UserId};
use market_watch::watchlist_store::{SqliteWatchlistStore, WatchlistStore};

#[derive(Default)]
struct FakeProvider {
    closes: HashMap<String, Vec<f64>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeProvider {
    fn with(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.closes.insert(symbol.to_string(), closes.to_vec());
        self
    }

    fn failing(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }
}

#[async_trait]
impl QuoteProvider for FakeProvider {
    async fn fetch_series(&self, symbol: &str, window: LookbackWindow) -> Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(symbol) {
            bail!("provider unavailable for {}", symbol);
        }
        Ok(match self.closes.get(symbol) {
            Some(closes) => PriceSeries::from_closes(symbol, window, closes),
            None => PriceSeries::empty(symbol, window),
        })
    }
}

fn registry() -> SymbolRegistry {
    SymbolRegistry::from_instruments(vec![
        Instrument::new("Alpha", "AAA", InstrumentCategory::Equity),
        Instrument::new("Bravo", "BBB", InstrumentCategory::Equity),
        Instrument::new("Gold", "GC=F", InstrumentCategory::Commodity),
        Instrument::new("Silver", "SI=F", InstrumentCategory::Commodity),
    ])
    .unwrap()
}

fn approx(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|v| (v - expected).abs() < 1e-9)
}

fn ctx(user: &str) -> SessionContext {
    SessionContext::new(UserId::new(user).unwrap())
}

#[tokio::test]
async fn failing_symbol_is_isolated() {
    let provider = FakeProvider::default()
        .with("AAA", &[100.0, 110.0])
        .with("GC=F", &[2000.0, 1980.0])
        .failing("BBB");
    let symbols = vec!["AAA".to_string(), "BBB".to_string(), "GC=F".to_string()];

    let rows = refresh_symbols(
        &provider,
        &registry(),
        &symbols,
        &LookbackWindow::ALL,
        RefreshOptions { max_concurrency: 3 },
    )
    .await;

    let order: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(order, vec!["AAA", "BBB", "GC=F"]);
    assert!(matches!(rows[0].status, SnapshotStatus::Ready(_)));
    assert!(rows[1].error().unwrap().contains("provider unavailable"));
    assert!(approx(rows[2].metrics().unwrap().day_change_pct, -1.0));
    assert_eq!(rows[0].display_name, "Alpha");
}

#[tokio::test]
async fn unregistered_symbol_gets_unknown_name() {
    let provider = FakeProvider::default().with("ZZZ", &[1.0, 2.0]);
    let rows = refresh_symbols(
        &provider,
        &registry(),
        &["ZZZ".to_string()],
        &[LookbackWindow::Day],
        RefreshOptions::default(),
    )
    .await;
    assert_eq!(rows[0].display_name, UNKNOWN_DISPLAY_NAME);
}

#[tokio::test]
async fn windows_are_fetched_once() {
    let provider = FakeProvider::default().with("AAA", &[1.0, 2.0]);
    let windows = [LookbackWindow::Day, LookbackWindow::Day, LookbackWindow::Year];
    let metrics = fetch_symbol_metrics(&provider, "AAA", &windows).await.unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert_eq!(metrics.year_high, Some(2.0));
}

#[tokio::test]
async fn empty_watchlist_yields_empty_report() {
    let store = SqliteWatchlistStore::open_in_memory().unwrap();
    let provider = FakeProvider::default();
    let report = refresh_watchlist(
        &ctx("alice"),
        &store,
        &provider,
        &registry(),
        RefreshOptions::default(),
    )
    .await
    .unwrap();
    assert!(report.is_empty());
    assert_eq!(report.user, "alice");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn watchlist_refresh_reports_failures() {
    let store = SqliteWatchlistStore::open_in_memory().unwrap();
    let session = ctx("alice");
    let registry = registry();
    add_by_display_name(&session, &store, &registry, "bravo").unwrap();
    add_by_display_name(&session, &store, &registry, "Alpha").unwrap();
    let provider = FakeProvider::default().with("AAA", &[10.0, 11.0]).failing("BBB");

    let report = refresh_watchlist(
        &session,
        &store,
        &provider,
        &registry,
        RefreshOptions { max_concurrency: 2 },
    )
    .await
    .unwrap();

    let order: Vec<&str> = report.rows.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(order, vec!["BBB", "AAA"]);
    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].symbol, "BBB");
}

#[test]
fn add_and_remove_by_display_name() {
    let store = SqliteWatchlistStore::open_in_memory().unwrap();
    let session = ctx("bob");
    let registry = registry();

    assert_eq!(
        add_by_display_name(&session, &store, &registry, " gold ").unwrap(),
        "GC=F"
    );
    let err = add_by_display_name(&session, &store, &registry, "Platinum").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::UnknownInstrument(name)) if name == "Platinum"
    ));

    assert_eq!(store.list_symbols("bob").unwrap(), vec!["GC=F"]);
    remove(&session, &store, "GC=F").unwrap();
    assert!(store.list_symbols("bob").unwrap().is_empty());
}

#[tokio::test]
async fn market_board_fetches_every_window_of_category() {
    let provider = FakeProvider::default()
        .with("GC=F", &[100.0, 101.0])
        .with("SI=F", &[20.0, 19.0]);
    let rows = refresh_market_board(
        &provider,
        &registry(),
        InstrumentCategory::Commodity,
        RefreshOptions { max_concurrency: 2 },
    )
    .await;
    let symbols: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["GC=F", "SI=F"]);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2 * LookbackWindow::ALL.len());
    assert!(approx(rows[1].metrics().unwrap().day_change_pct, -5.0));
    assert!(approx(rows[1].metrics().unwrap().week_change_pct, -5.0));
    assert_eq!(rows[0].metrics().unwrap().year_high, Some(101.0));
}

#[tokio::test]
async fn history_fetches_year_window() {
    let provider = FakeProvider::default()
        .with("AAA", &[10.0, 12.0, 11.0])
        .failing("BBB");

    let series = fetch_history(&provider, "AAA").await.unwrap();
    assert_eq!(series.window, LookbackWindow::Year);
    assert_eq!(series.closes(), vec![10.0, 12.0, 11.0]);

    let err = fetch_history(&provider, "BBB").await.unwrap_err();
    assert!(format!("{:#}", err).contains("price history for BBB"));
}

fn snapshot(symbol: &str, changes: [f64; 5]) -> SymbolSnapshot {
    let [day, week, month, quarter, year] = changes;
    SymbolSnapshot {
        symbol: symbol.to_string(),
        display_name: symbol.to_string(),
        status: SnapshotStatus::Ready(ChangeMetrics {
            day_change_pct: Some(day),
            week_change_pct: Some(week),
            month_change_pct: Some(month),
            quarter_change_pct: Some(quarter),
            year_change_pct: Some(year),
            ..ChangeMetrics::default()
        }),
    }
}

fn symbols(rows: &[SymbolSnapshot]) -> Vec<&str> {
    rows.iter().map(|r| r.symbol.as_str()).collect()
}

#[test]
fn top_movers_rank_by_each_period() {
    let rows = vec![
        snapshot("AAA", [2.0, -1.0, 4.0, -3.0, 9.0]),
        snapshot("BBB", [-2.0, 3.0, 1.0, 5.0, -4.0]),
        snapshot("CCC", [1.0, 2.0, -6.0, 0.5, 3.0]),
    ];
    let cases = [
        (MetricName::DayChangePct, vec!["AAA", "CCC"], vec!["BBB"]),
        (MetricName::WeekChangePct, vec!["BBB", "CCC"], vec!["AAA"]),
        (MetricName::MonthChangePct, vec!["AAA", "BBB"], vec!["CCC"]),
        (MetricName::QuarterChangePct, vec!["BBB", "CCC"], vec!["AAA"]),
        (MetricName::YearChangePct, vec!["AAA", "CCC"], vec!["BBB"]),
    ];
    assert_eq!(cases.len(), MetricName::CHANGE_PERIODS.len());

    for (period, gainers, losers) in cases {
        let movers = top_movers(&rows, period, 5);
        assert_eq!(symbols(&movers.gainers), gainers, "gainers for {}", period.label());
        assert_eq!(symbols(&movers.losers), losers, "losers for {}", period.label());
    }
}

#[test]
fn top_movers_skip_rows_missing_the_period() {
    let mut partial = snapshot("AAA", [1.0, 1.0, 1.0, 1.0, 1.0]);
    if let SnapshotStatus::Ready(m) = &mut partial.status {
        m.year_change_pct = None;
    }
    let rows = vec![partial, snapshot("BBB", [-1.0, -1.0, -1.0, -1.0, -2.0])];

    let movers = top_movers(&rows, MetricName::YearChangePct, 5);
    assert!(movers.gainers.is_empty());
    assert_eq!(symbols(&movers.losers), vec!["BBB"]);
}
