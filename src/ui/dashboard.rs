use chrono::{Local, TimeZone};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::aggregator::{SnapshotStatus, SymbolSnapshot};
use crate::export::{format_pct, format_price, UNAVAILABLE};
use crate::market_session::MarketStatus;

/// Green for gains, red for losses, gray when unavailable.
pub fn change_color(value: Option<f64>) -> Color {
    match value {
        Some(v) if v > 0.0 => Color::Green,
        Some(v) if v < 0.0 => Color::Red,
        Some(_) => Color::White,
        None => Color::DarkGray,
    }
}

fn label(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

pub struct DetailPanel<'a> {
    row: Option<&'a SymbolSnapshot>,
}

impl<'a> DetailPanel<'a> {
    pub fn new(row: Option<&'a SymbolSnapshot>) -> Self {
        Self { row }
    }
}

impl Widget for DetailPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Detail ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        let Some(row) = self.row else {
            Paragraph::new(Line::from(label("No symbol selected")))
                .block(block)
                .render(area, buf);
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(
                row.display_name.as_str(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                row.symbol.as_str(),
                Style::default().fg(Color::Cyan),
            )),
        ];

        match &row.status {
            SnapshotStatus::Failed(msg) => {
                lines.push(Line::from(Span::styled(
                    format!("[ERR] {}", msg),
                    Style::default().fg(Color::Red),
                )));
            }
            SnapshotStatus::Ready(m) => {
                let pct_line = |name: &'static str, v: Option<f64>| {
                    Line::from(vec![
                        label(name),
                        Span::styled(format_pct(v), Style::default().fg(change_color(v))),
                    ])
                };
                let price_line = |name: &'static str, v: Option<f64>| {
                    Line::from(vec![
                        label(name),
                        Span::styled(format_price(v), Style::default().fg(Color::White)),
                    ])
                };
                lines.push(price_line("Price:     ", m.current_price));
                lines.push(price_line("Prev:      ", m.previous_close));
                lines.push(pct_line("1D:        ", m.day_change_pct));
                lines.push(pct_line("1W:        ", m.week_change_pct));
                lines.push(pct_line("1M:        ", m.month_change_pct));
                lines.push(pct_line("3M:        ", m.quarter_change_pct));
                lines.push(pct_line("1Y:        ", m.year_change_pct));
                lines.push(price_line("52W High:  ", m.year_high));
                lines.push(price_line("52W Low:   ", m.year_low));
                lines.push(Line::from(vec![
                    label("Volume:    "),
                    Span::styled(
                        m.volume
                            .map(|v| format!("{:.0}", v))
                            .unwrap_or_else(|| UNAVAILABLE.to_string()),
                        Style::default().fg(Color::White),
                    ),
                ]));
            }
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" System Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner_height = block.inner(area).height as usize;

        let start = self.messages.len().saturating_sub(inner_height);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|msg| {
                let color = if msg.starts_with("[ERR]") {
                    Color::Red
                } else if msg.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::Gray
                };
                Line::from(Span::styled(msg.as_str(), Style::default().fg(color)))
            })
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct StatusBar<'a> {
    pub user: &'a str,
    pub market_status: MarketStatus,
    pub last_refresh_ms: Option<i64>,
    pub refreshing: bool,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let market = match self.market_status {
            MarketStatus::Open => {
                Span::styled(self.market_status.label(), Style::default().fg(Color::Green))
            }
            MarketStatus::Closed => {
                Span::styled(self.market_status.label(), Style::default().fg(Color::Red))
            }
        };

        let refresh = if self.refreshing {
            Span::styled(
                " REFRESHING ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            let updated = self
                .last_refresh_ms
                .and_then(|ms| Local.timestamp_millis_opt(ms).single())
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "never".to_string());
            Span::styled(
                format!("updated {}", updated),
                Style::default().fg(Color::DarkGray),
            )
        };

        let line = Line::from(vec![
            Span::styled(
                " market-watch ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.user, Style::default().fg(Color::Cyan)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            market,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            refresh,
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
        let text = |t: &'static str| Span::styled(t, Style::default().fg(Color::DarkGray));
        let line = Line::from(vec![
            key(" [Q]"),
            text("uit  "),
            key("[R]"),
            text("efresh  "),
            key("[A]"),
            text("dd  "),
            key("[X]"),
            text(" remove  "),
            key("[E]"),
            text("xport  "),
            key("[B]"),
            text("oard  "),
            key("[P]"),
            text("eriod  "),
            key("[J/K]"),
            text(" move"),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
