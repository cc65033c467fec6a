//! The per-render refresh: read symbols, fetch one series per window, compute
//! metrics. Each symbol is fetched and computed independently so a provider
//! failure only affects its own row.

use anyhow::{Context, Result};
use futures_util::stream::{self, StreamExt};

use crate::change_calculator::{compute_metrics, WindowSeries};
use crate::error::AppError;
use crate::model::{ChangeMetrics, LookbackWindow, MetricName, PriceSeries};
use crate::quotes::QuoteProvider;
use crate::registry::{InstrumentCategory, SymbolRegistry};
use crate::session::SessionContext;
use crate::watchlist_store::WatchlistStore;

pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotStatus {
    Ready(ChangeMetrics),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSnapshot {
    pub symbol: String,
    pub display_name: String,
    pub status: SnapshotStatus,
}

impl SymbolSnapshot {
    pub fn metrics(&self) -> Option<&ChangeMetrics> {
        match &self.status {
            SnapshotStatus::Ready(m) => Some(m),
            SnapshotStatus::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            SnapshotStatus::Ready(_) => None,
            SnapshotStatus::Failed(msg) => Some(msg),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RefreshOptions {
    pub max_concurrency: usize,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self { max_concurrency: 1 }
    }
}

#[derive(Debug, Clone)]
pub struct WatchlistReport {
    pub user: String,
    pub rows: Vec<SymbolSnapshot>,
    pub refreshed_at_ms: i64,
}

impl WatchlistReport {
    pub fn failures(&self) -> Vec<&SymbolSnapshot> {
        self.rows.iter().filter(|r| r.error().is_some()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fetches each window once and computes the symbol's metrics.
pub async fn fetch_symbol_metrics<P>(
    provider: &P,
    symbol: &str,
    windows: &[LookbackWindow],
) -> Result<ChangeMetrics>
where
    P: QuoteProvider + ?Sized,
{
    let mut input = WindowSeries::new();
    for &window in windows {
        if input.get(window).is_some() {
            continue;
        }
        let series = provider
            .fetch_series(symbol, window)
            .await
            .with_context(|| format!("fetching {} series for {}", window, symbol))?;
        input.insert(series);
    }
    Ok(compute_metrics(&input))
}

/// One snapshot per symbol, in input order.
pub async fn refresh_symbols<P>(
    provider: &P,
    registry: &SymbolRegistry,
    symbols: &[String],
    windows: &[LookbackWindow],
    opts: RefreshOptions,
) -> Vec<SymbolSnapshot>
where
    P: QuoteProvider + ?Sized,
{
    let concurrency = opts.max_concurrency.max(1);
    stream::iter(symbols.to_vec())
        .map(|symbol| async move {
            let display_name = registry
                .display_name_for(&symbol)
                .unwrap_or(UNKNOWN_DISPLAY_NAME)
                .to_string();
            let status = match fetch_symbol_metrics(provider, &symbol, windows).await {
                Ok(metrics) => SnapshotStatus::Ready(metrics),
                Err(e) => {
                    let msg = format!("{:#}", e);
                    tracing::warn!(symbol = %symbol, error = %msg, "symbol refresh failed");
                    SnapshotStatus::Failed(msg)
                }
            };
            SymbolSnapshot {
                symbol,
                display_name,
                status,
            }
        })
        .buffered(concurrency)
        .collect()
        .await
}

/// Refreshes the session user's watchlist. Only a store failure is an error.
pub async fn refresh_watchlist<P>(
    ctx: &SessionContext,
    store: &dyn WatchlistStore,
    provider: &P,
    registry: &SymbolRegistry,
    opts: RefreshOptions,
) -> Result<WatchlistReport>
where
    P: QuoteProvider + ?Sized,
{
    let symbols = store
        .list_symbols(ctx.user())
        .with_context(|| format!("failed to read watchlist for {}", ctx.user()))?;
    tracing::info!(user = ctx.user(), symbols = symbols.len(), "refreshing watchlist");

    let rows = refresh_symbols(provider, registry, &symbols, &LookbackWindow::ALL, opts).await;
    Ok(WatchlistReport {
        user: ctx.user().to_string(),
        rows,
        refreshed_at_ms: chrono::Utc::now().timestamp_millis(),
    })
}

/// Snapshots for every instrument of a category, with every window so the
/// board can rank by any change period.
pub async fn refresh_market_board<P>(
    provider: &P,
    registry: &SymbolRegistry,
    category: InstrumentCategory,
    opts: RefreshOptions,
) -> Vec<SymbolSnapshot>
where
    P: QuoteProvider + ?Sized,
{
    let symbols: Vec<String> = registry
        .by_category(category)
        .into_iter()
        .map(|inst| inst.symbol.clone())
        .collect();
    tracing::info!(category = %category, symbols = symbols.len(), "refreshing market board");
    refresh_symbols(provider, registry, &symbols, &LookbackWindow::ALL, opts).await
}

/// Year of daily closes for the detail chart.
pub async fn fetch_history<P>(provider: &P, symbol: &str) -> Result<PriceSeries>
where
    P: QuoteProvider + ?Sized,
{
    provider
        .fetch_series(symbol, LookbackWindow::Year)
        .await
        .with_context(|| format!("fetching price history for {}", symbol))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Movers {
    pub gainers: Vec<SymbolSnapshot>,
    pub losers: Vec<SymbolSnapshot>,
}

/// Top `n` by `metric`, descending for gainers and ascending for losers.
///
/// Rows without a value for `metric` are left out.
pub fn top_movers(snapshots: &[SymbolSnapshot], metric: MetricName, n: usize) -> Movers {
    let mut ranked: Vec<(f64, &SymbolSnapshot)> = snapshots
        .iter()
        .filter_map(|s| s.metrics().and_then(|m| m.get(metric)).map(|v| (v, s)))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    let gainers = ranked
        .iter()
        .filter(|(pct, _)| *pct >= 0.0)
        .take(n)
        .map(|(_, s)| (*s).clone())
        .collect();
    let losers = ranked
        .iter()
        .rev()
        .filter(|(pct, _)| *pct < 0.0)
        .take(n)
        .map(|(_, s)| (*s).clone())
        .collect();
    Movers { gainers, losers }
}

/// Adds the instrument named `display_name` to the session user's watchlist.
/// Returns the resolved symbol.
pub fn add_by_display_name(
    ctx: &SessionContext,
    store: &dyn WatchlistStore,
    registry: &SymbolRegistry,
    display_name: &str,
) -> Result<String> {
    let symbol = registry
        .symbol_for(display_name)
        .ok_or_else(|| AppError::UnknownInstrument(display_name.trim().to_string()))?
        .to_string();
    store.add_symbol(ctx.user(), &symbol)?;
    Ok(symbol)
}

pub fn remove(ctx: &SessionContext, store: &dyn WatchlistStore, symbol: &str) -> Result<()> {
    store.remove_symbol(ctx.user(), symbol)
}
