pub mod board;
pub mod chart;
pub mod dashboard;
pub mod selector;
pub mod watchlist_table;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use crate::aggregator::{top_movers, SymbolSnapshot};
use crate::event::AppEvent;
use crate::market_session::MarketStatus;
use crate::model::MetricName;
use crate::registry::{Instrument, InstrumentCategory, SymbolRegistry};

use board::MarketBoardPanel;
use chart::PriceChart;
use dashboard::{DetailPanel, KeybindBar, LogPanel, StatusBar};
use selector::SelectorPopup;
use watchlist_table::WatchlistTable;

const MAX_LOG_MESSAGES: usize = 200;
const MOVERS_PER_SIDE: usize = 5;

/// Search box state of the add-symbol popup.
#[derive(Debug, Clone, Default)]
pub struct SymbolSelector {
    pub query: String,
    pub selected: usize,
}

impl SymbolSelector {
    pub fn matches<'a>(&self, registry: &'a SymbolRegistry) -> Vec<&'a Instrument> {
        registry.search(&self.query)
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.selected = 0;
    }

    pub fn backspace(&mut self) {
        self.query.pop();
        self.selected = 0;
    }

    pub fn move_selection(&mut self, delta: isize, match_count: usize) {
        if match_count == 0 {
            self.selected = 0;
            return;
        }
        let max = match_count as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, max) as usize;
    }
}

/// Closes loaded for the detail chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    pub symbol: String,
    pub closes: Vec<f64>,
}

pub struct AppState {
    pub user: String,
    pub market_status: MarketStatus,
    pub rows: Vec<SymbolSnapshot>,
    pub selected: usize,
    pub last_refresh_ms: Option<i64>,
    pub refreshing: bool,
    pub board_category: InstrumentCategory,
    pub board_period: MetricName,
    pub board_rows: Vec<SymbolSnapshot>,
    pub history: Option<PriceHistory>,
    pub selector: Option<SymbolSelector>,
    pub log_messages: Vec<String>,
}

impl AppState {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            market_status: MarketStatus::Closed,
            rows: Vec::new(),
            selected: 0,
            last_refresh_ms: None,
            refreshing: false,
            board_category: InstrumentCategory::GlobalIndex,
            board_period: MetricName::DayChangePct,
            board_rows: Vec::new(),
            history: None,
            selector: None,
            log_messages: Vec::new(),
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    pub fn selected_row(&self) -> Option<&SymbolSnapshot> {
        self.rows.get(self.selected)
    }

    /// Closes for the chart, only when they belong to the selected row.
    pub fn selected_history(&self) -> Option<&[f64]> {
        let selected = self.selected_row()?;
        self.history
            .as_ref()
            .filter(|h| h.symbol == selected.symbol)
            .map(|h| h.closes.as_slice())
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn is_selector_open(&self) -> bool {
        self.selector.is_some()
    }

    pub fn open_selector(&mut self) {
        self.selector = Some(SymbolSelector::default());
    }

    pub fn close_selector(&mut self) {
        self.selector = None;
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::RefreshStarted => {
                self.refreshing = true;
            }
            AppEvent::WatchlistRefreshed(report) => {
                self.refreshing = false;
                let previously_selected = self.selected_row().map(|r| r.symbol.clone());
                for failed in report.failures() {
                    self.push_log(format!(
                        "[WARN] {}: {}",
                        failed.symbol,
                        failed.error().unwrap_or_default()
                    ));
                }
                self.rows = report.rows;
                self.last_refresh_ms = Some(report.refreshed_at_ms);
                self.selected = previously_selected
                    .and_then(|sym| self.rows.iter().position(|r| r.symbol == sym))
                    .unwrap_or(0)
                    .min(self.rows.len().saturating_sub(1));
                self.push_log(format!("Watchlist refreshed ({} symbols)", self.rows.len()));
            }
            AppEvent::MarketBoardRefreshed {
                category,
                snapshots,
            } => {
                if category == self.board_category {
                    self.board_rows = snapshots;
                }
            }
            AppEvent::HistoryLoaded { symbol, closes } => {
                self.history = Some(PriceHistory { symbol, closes });
            }
            AppEvent::Error(msg) => {
                self.refreshing = false;
                self.push_log(format!("[ERR] {}", msg));
            }
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub fn render(frame: &mut Frame, state: &AppState, registry: &SymbolRegistry) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // status bar
            Constraint::Min(8),     // watchlist + detail
            Constraint::Length(10), // market board
            Constraint::Length(6),  // system log
            Constraint::Length(1),  // keybinds
        ])
        .split(frame.area());

    frame.render_widget(
        StatusBar {
            user: &state.user,
            market_status: state.market_status,
            last_refresh_ms: state.last_refresh_ms,
            refreshing: state.refreshing,
        },
        outer[0],
    );

    let main_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(60), Constraint::Length(32)])
        .split(outer[1]);

    frame.render_widget(WatchlistTable::new(&state.rows, state.selected), main_area[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(14), Constraint::Min(5)])
        .split(main_area[1]);
    frame.render_widget(DetailPanel::new(state.selected_row()), side[0]);
    frame.render_widget(
        PriceChart::new(
            state.selected_row().map(|r| r.symbol.as_str()),
            state.selected_history().unwrap_or(&[]),
        ),
        side[1],
    );

    let movers = top_movers(&state.board_rows, state.board_period, MOVERS_PER_SIDE);
    frame.render_widget(
        MarketBoardPanel::new(
            state.board_category,
            state.board_period,
            &state.board_rows,
            &movers,
        ),
        outer[2],
    );

    frame.render_widget(LogPanel::new(&state.log_messages), outer[3]);
    frame.render_widget(KeybindBar, outer[4]);

    if let Some(selector) = &state.selector {
        let matches = selector.matches(registry);
        let area = centered_rect(60, 60, frame.area());
        frame.render_widget(SelectorPopup::new(selector, &matches), area);
    }
}
