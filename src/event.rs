use crate::aggregator::{SymbolSnapshot, WatchlistReport};
use crate::registry::InstrumentCategory;

#[derive(Debug, Clone)]
pub enum RefreshRequest {
    Watchlist,
    MarketBoard(InstrumentCategory),
    /// Year of closes for the selected symbol's chart.
    History(String),
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    RefreshStarted,
    WatchlistRefreshed(WatchlistReport),
    MarketBoardRefreshed {
        category: InstrumentCategory,
        snapshots: Vec<SymbolSnapshot>,
    },
    HistoryLoaded {
        symbol: String,
        closes: Vec<f64>,
    },
    Error(String),
}
