use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use market_watch::aggregator::{self, RefreshOptions, SnapshotStatus};
use market_watch::config::Config;
use market_watch::export::{export_watchlist_csv, format_pct, format_price, write_export_file};
use market_watch::quotes::{CachedQuoteProvider, YahooChartClient};
use market_watch::registry::SymbolRegistry;
use market_watch::session::{SessionContext, UserId};
use market_watch::watchlist_store::SqliteWatchlistStore;

const USAGE: &str = "usage: watchlist-export <user> [output-dir]";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(user) = args.next() else {
        bail!(USAGE);
    };
    let output_dir = args.next().map(PathBuf::from);

    let config = Config::load().context("failed to load config")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = SessionContext::new(UserId::new(&user)?);
    let store = SqliteWatchlistStore::open(&config.store.path)
        .with_context(|| format!("failed to open {}", config.store.path.display()))?;
    let provider = CachedQuoteProvider::new(
        YahooChartClient::from_config(&config.provider)?,
        Duration::from_secs(config.cache.ttl_secs),
    );
    let registry = SymbolRegistry::from_config(&config.registry)?;
    let opts = RefreshOptions {
        max_concurrency: config.refresh.max_concurrency,
    };

    let report = aggregator::refresh_watchlist(&ctx, &store, &provider, &registry, opts).await?;

    eprintln!("watchlist for {}", report.user);
    eprintln!("=================");
    for row in &report.rows {
        match &row.status {
            SnapshotStatus::Ready(m) => eprintln!(
                "- {:<14} {:<28} {:>12} {:>9}",
                row.symbol,
                row.display_name,
                format_price(m.current_price),
                format_pct(m.day_change_pct)
            ),
            SnapshotStatus::Failed(msg) => {
                eprintln!("- {:<14} {:<28} FAILED {}", row.symbol, row.display_name, msg)
            }
        }
    }
    eprintln!(
        "{} symbols, {} failed",
        report.rows.len(),
        report.failures().len()
    );

    match output_dir {
        Some(dir) => {
            let path = write_export_file(&report, &dir)?;
            eprintln!("wrote {}", path.display());
        }
        None => export_watchlist_csv(&report, std::io::stdout().lock())?,
    }

    Ok(())
}
