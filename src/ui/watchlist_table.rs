use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

use crate::aggregator::{SnapshotStatus, SymbolSnapshot};
use crate::export::{format_pct, format_price};

use super::dashboard::change_color;

const HEADER: [&str; 8] = [
    "Symbol", "Company", "Price", "1D %", "1W %", "1M %", "52W High", "52W Low",
];

pub struct WatchlistTable<'a> {
    rows: &'a [SymbolSnapshot],
    selected: usize,
}

impl<'a> WatchlistTable<'a> {
    pub fn new(rows: &'a [SymbolSnapshot], selected: usize) -> Self {
        Self { rows, selected }
    }
}

fn pct_cell(value: Option<f64>) -> Cell<'static> {
    Cell::from(Span::styled(
        format_pct(value),
        Style::default().fg(change_color(value)),
    ))
}

fn price_cell(value: Option<f64>) -> Cell<'static> {
    let color = if value.is_some() {
        Color::White
    } else {
        Color::DarkGray
    };
    Cell::from(Span::styled(format_price(value), Style::default().fg(color)))
}

impl Widget for WatchlistTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Your Watchlist ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        if self.rows.is_empty() {
            Paragraph::new(Span::styled(
                "Your watchlist is empty. Press [A] to add a symbol.",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block)
            .render(area, buf);
            return;
        }

        let header = Row::new(HEADER.iter().map(|h| {
            Cell::from(Span::styled(
                *h,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))
        }));

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|snap| {
                let symbol = Cell::from(Span::styled(
                    snap.symbol.as_str(),
                    Style::default().fg(Color::Cyan),
                ));
                let cells = match &snap.status {
                    SnapshotStatus::Ready(m) => vec![
                        symbol,
                        Cell::from(snap.display_name.as_str()),
                        price_cell(m.current_price),
                        pct_cell(m.day_change_pct),
                        pct_cell(m.week_change_pct),
                        pct_cell(m.month_change_pct),
                        price_cell(m.year_high),
                        price_cell(m.year_low),
                    ],
                    SnapshotStatus::Failed(msg) => {
                        let company = Line::from(vec![
                            Span::raw(snap.display_name.as_str()),
                            Span::styled(
                                format!(" error: {}", msg),
                                Style::default().fg(Color::Red),
                            ),
                        ]);
                        let mut cells = vec![symbol, Cell::from(company), price_cell(None)];
                        cells.extend((0..3).map(|_| pct_cell(None)));
                        cells.extend((0..2).map(|_| price_cell(None)));
                        cells
                    }
                };
                Row::new(cells)
            })
            .collect();

        let widths = [
            Constraint::Length(14),
            Constraint::Min(18),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        // Table scrolls its offset to keep the selected row in view.
        let mut state = TableState::default().with_selected(Some(self.selected));
        StatefulWidget::render(table, area, buf, &mut state);
    }
}
