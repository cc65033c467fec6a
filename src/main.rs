use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyCode};
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval};

use market_watch::aggregator::{self, RefreshOptions, WatchlistReport};
use market_watch::config::Config;
use market_watch::event::{AppEvent, RefreshRequest};
use market_watch::export::write_export_file;
use market_watch::input::{
    parse_main_command, parse_selector_command, SelectorCommand, UiCommand,
};
use market_watch::market_session::MarketHours;
use market_watch::quotes::{CachedQuoteProvider, YahooChartClient};
use market_watch::registry::{InstrumentCategory, SymbolRegistry};
use market_watch::session::{SessionContext, UserId};
use market_watch::ui::{self, AppState};
use market_watch::watchlist_store::{SqliteWatchlistStore, WatchlistStore};

type Provider = CachedQuoteProvider<YahooChartClient>;

struct Services {
    store: Arc<dyn WatchlistStore>,
    provider: Arc<Provider>,
    registry: Arc<SymbolRegistry>,
    opts: RefreshOptions,
}

async fn next_auto_tick(ticker: &mut Option<Interval>) {
    match ticker.as_mut() {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn refresh_watchlist(
    services: &Services,
    ctx: &SessionContext,
    app_tx: &mpsc::Sender<AppEvent>,
) {
    let _ = app_tx.send(AppEvent::RefreshStarted).await;
    match aggregator::refresh_watchlist(
        ctx,
        services.store.as_ref(),
        services.provider.as_ref(),
        &services.registry,
        services.opts,
    )
    .await
    {
        Ok(report) => {
            let _ = app_tx.send(AppEvent::WatchlistRefreshed(report)).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "watchlist refresh failed");
            let _ = app_tx.send(AppEvent::Error(format!("{:#}", e))).await;
        }
    }
}

async fn refresh_board(
    services: &Services,
    category: InstrumentCategory,
    app_tx: &mpsc::Sender<AppEvent>,
) {
    let snapshots = aggregator::refresh_market_board(
        services.provider.as_ref(),
        &services.registry,
        category,
        services.opts,
    )
    .await;
    let _ = app_tx
        .send(AppEvent::MarketBoardRefreshed {
            category,
            snapshots,
        })
        .await;
}

async fn load_history(services: &Services, symbol: String, app_tx: &mpsc::Sender<AppEvent>) {
    match aggregator::fetch_history(services.provider.as_ref(), &symbol).await {
        Ok(series) => {
            let _ = app_tx
                .send(AppEvent::HistoryLoaded {
                    closes: series.closes(),
                    symbol,
                })
                .await;
        }
        Err(e) => {
            tracing::warn!(symbol = %symbol, error = %e, "history fetch failed");
            let _ = app_tx.send(AppEvent::Error(format!("{:#}", e))).await;
        }
    }
}

/// Serves refresh requests and re-runs both refreshes every `auto_refresh`.
async fn refresh_worker(
    services: Arc<Services>,
    ctx: SessionContext,
    mut req_rx: mpsc::Receiver<RefreshRequest>,
    app_tx: mpsc::Sender<AppEvent>,
    auto_refresh: Duration,
) {
    let mut board_category = InstrumentCategory::GlobalIndex;
    let mut ticker = (!auto_refresh.is_zero())
        .then(|| tokio::time::interval_at(Instant::now() + auto_refresh, auto_refresh));

    loop {
        tokio::select! {
            req = req_rx.recv() => {
                match req {
                    Some(RefreshRequest::Watchlist) => {
                        refresh_watchlist(&services, &ctx, &app_tx).await;
                    }
                    Some(RefreshRequest::MarketBoard(category)) => {
                        board_category = category;
                        refresh_board(&services, category, &app_tx).await;
                    }
                    Some(RefreshRequest::History(symbol)) => {
                        load_history(&services, symbol, &app_tx).await;
                    }
                    None => break,
                }
            }
            _ = next_auto_tick(&mut ticker) => {
                tracing::debug!("auto refresh");
                services.provider.evict_expired().await;
                refresh_watchlist(&services, &ctx, &app_tx).await;
                refresh_board(&services, board_category, &app_tx).await;
            }
        }
    }
    tracing::info!("refresh worker stopped");
}

fn request_refresh(
    req_tx: &mpsc::Sender<RefreshRequest>,
    req: RefreshRequest,
    app_state: &mut AppState,
) {
    if req_tx.try_send(req).is_err() {
        app_state.push_log("[WARN] refresh already queued".to_string());
    }
}

/// Records the highlighted row in the session and asks for its chart history
/// when it changed, or on `reload`.
fn sync_selection(
    ctx: &mut SessionContext,
    app_state: &mut AppState,
    req_tx: &mpsc::Sender<RefreshRequest>,
    reload: bool,
) {
    let current = app_state.selected_row().map(|r| r.symbol.clone());
    if current.as_deref() == ctx.selected() && !reload {
        return;
    }
    ctx.select(current.clone());
    if let Some(symbol) = current {
        request_refresh(req_tx, RefreshRequest::History(symbol), app_state);
    }
}

fn handle_selector_command(
    cmd: SelectorCommand,
    app_state: &mut AppState,
    services: &Services,
    ctx: &SessionContext,
    req_tx: &mpsc::Sender<RefreshRequest>,
) {
    let match_count = app_state
        .selector
        .as_ref()
        .map(|s| s.matches(&services.registry).len())
        .unwrap_or(0);
    let Some(selector) = app_state.selector.as_mut() else {
        return;
    };
    match cmd {
        SelectorCommand::Type(c) => selector.push_char(c),
        SelectorCommand::Backspace => selector.backspace(),
        SelectorCommand::Up => selector.move_selection(-1, match_count),
        SelectorCommand::Down => selector.move_selection(1, match_count),
        SelectorCommand::Close => app_state.close_selector(),
        SelectorCommand::Confirm => {
            let name = selector
                .matches(&services.registry)
                .get(selector.selected)
                .map(|inst| inst.display_name.clone());
            app_state.close_selector();
            let Some(name) = name else {
                app_state.push_log("[WARN] no instrument selected".to_string());
                return;
            };
            match aggregator::add_by_display_name(
                ctx,
                services.store.as_ref(),
                &services.registry,
                &name,
            ) {
                Ok(symbol) => {
                    app_state.push_log(format!("Added {} ({})", name, symbol));
                    request_refresh(req_tx, RefreshRequest::Watchlist, app_state);
                }
                Err(e) => app_state.push_log(format!("[ERR] {:#}", e)),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load config
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set MW_CONFIG_PATH or create config/default.toml");
            std::process::exit(1);
        }
    };

    // Init tracing (log to file so it doesn't interfere with TUI)
    let log_file = std::fs::File::create("market-watch.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    let user = match UserId::new(&config.session.user) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("{:#}", e);
            eprintln!("Set MW_USER or session.user in the config file");
            std::process::exit(1);
        }
    };
    let mut ctx = SessionContext::new(user);

    tracing::info!(
        user = ctx.user(),
        provider = %config.provider.base_url,
        store = %config.store.path.display(),
        "Starting market-watch"
    );

    let store = SqliteWatchlistStore::open(&config.store.path)
        .with_context(|| format!("failed to open {}", config.store.path.display()))?;
    let client = YahooChartClient::from_config(&config.provider)?;
    let services = Arc::new(Services {
        store: Arc::new(store),
        provider: Arc::new(CachedQuoteProvider::new(
            client,
            Duration::from_secs(config.cache.ttl_secs),
        )),
        registry: Arc::new(SymbolRegistry::from_config(&config.registry)?),
        opts: RefreshOptions {
            max_concurrency: config.refresh.max_concurrency,
        },
    });
    let market_hours = MarketHours::from_config(&config.market)?;

    // Channels
    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(64);
    let (req_tx, req_rx) = mpsc::channel::<RefreshRequest>(8);

    tokio::spawn(refresh_worker(
        services.clone(),
        SessionContext::new(ctx.user.clone()),
        req_rx,
        app_tx.clone(),
        Duration::from_secs(config.ui.auto_refresh_secs),
    ));

    // TUI main loop
    let mut terminal = ratatui::init();
    let mut app_state = AppState::new(ctx.user());
    let mut last_report: Option<WatchlistReport> = None;
    app_state.push_log(format!(
        "market-watch started | {} | {} instruments",
        ctx.user(),
        services.registry.len()
    ));
    request_refresh(&req_tx, RefreshRequest::Watchlist, &mut app_state);
    request_refresh(
        &req_tx,
        RefreshRequest::MarketBoard(app_state.board_category),
        &mut app_state,
    );

    loop {
        app_state.market_status = market_hours.status_at(chrono::Utc::now());
        // Draw
        terminal.draw(|frame| ui::render(frame, &app_state, &services.registry))?;

        // Handle input (non-blocking with timeout)
        if crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms))? {
            if let Event::Key(key) = crossterm::event::read()? {
                if app_state.is_selector_open() {
                    if let Some(cmd) = parse_selector_command(&key.code) {
                        handle_selector_command(cmd, &mut app_state, &services, &ctx, &req_tx);
                    }
                    continue;
                }
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
                    tracing::info!("User quit");
                    break;
                }
                match parse_main_command(&key.code) {
                    Some(UiCommand::Refresh) => {
                        request_refresh(&req_tx, RefreshRequest::Watchlist, &mut app_state);
                    }
                    Some(UiCommand::OpenSymbolSelector) => app_state.open_selector(),
                    Some(UiCommand::RemoveSelected) => {
                        let Some(symbol) = app_state.selected_row().map(|r| r.symbol.clone())
                        else {
                            continue;
                        };
                        match aggregator::remove(&ctx, services.store.as_ref(), &symbol) {
                            Ok(()) => {
                                app_state.push_log(format!("Removed {}", symbol));
                                request_refresh(&req_tx, RefreshRequest::Watchlist, &mut app_state);
                            }
                            Err(e) => app_state.push_log(format!("[ERR] {:#}", e)),
                        }
                    }
                    Some(UiCommand::Export) => match &last_report {
                        Some(report) => match write_export_file(report, &config.ui.export_dir) {
                            Ok(path) => {
                                app_state.push_log(format!("Exported to {}", path.display()))
                            }
                            Err(e) => app_state.push_log(format!("[ERR] export failed: {:#}", e)),
                        },
                        None => app_state
                            .push_log("[WARN] nothing to export yet, refresh first".to_string()),
                    },
                    Some(UiCommand::SelectUp) => app_state.select_up(),
                    Some(UiCommand::SelectDown) => app_state.select_down(),
                    Some(UiCommand::NextBoardCategory) => {
                        app_state.board_category = app_state.board_category.next();
                        app_state.board_rows.clear();
                        request_refresh(
                            &req_tx,
                            RefreshRequest::MarketBoard(app_state.board_category),
                            &mut app_state,
                        );
                    }
                    Some(UiCommand::NextBoardPeriod) => {
                        app_state.board_period = app_state.board_period.next_period();
                    }
                    None => {}
                }
                sync_selection(&mut ctx, &mut app_state, &req_tx, false);
            }
        }

        // Drain events
        while let Ok(evt) = app_rx.try_recv() {
            let refreshed = matches!(evt, AppEvent::WatchlistRefreshed(_));
            if let AppEvent::WatchlistRefreshed(report) = &evt {
                last_report = Some(report.clone());
            }
            app_state.apply(evt);
            if refreshed {
                sync_selection(&mut ctx, &mut app_state, &req_tx, true);
            }
        }
    }

    ratatui::restore();
    tracing::info!("Shutdown complete");
    println!("Goodbye! Check market-watch.log for details.");
    Ok(())
}
