use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::aggregator::{Movers, SymbolSnapshot};
use crate::export::{format_pct, format_price};
use crate::model::MetricName;
use crate::registry::InstrumentCategory;

use super::dashboard::change_color;

/// Category overview on the left, gainers and losers on the right. Changes
/// shown and ranked are for `period`.
pub struct MarketBoardPanel<'a> {
    category: InstrumentCategory,
    period: MetricName,
    rows: &'a [SymbolSnapshot],
    movers: &'a Movers,
}

impl<'a> MarketBoardPanel<'a> {
    pub fn new(
        category: InstrumentCategory,
        period: MetricName,
        rows: &'a [SymbolSnapshot],
        movers: &'a Movers,
    ) -> Self {
        Self {
            category,
            period,
            rows,
            movers,
        }
    }
}

fn snapshot_line(snap: &SymbolSnapshot, period: MetricName) -> Line<'_> {
    let (price, pct) = match snap.metrics() {
        Some(m) => (m.current_price, m.get(period)),
        None => (None, None),
    };
    Line::from(vec![
        Span::styled(
            format!("{:<18}", snap.display_name),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:>12} ", format_price(price)),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(format_pct(pct), Style::default().fg(change_color(pct))),
    ])
}

impl Widget for MarketBoardPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let overview = Block::default()
            .title(format!(" {} ({}) ", self.category.label(), self.period.label()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let lines: Vec<Line> = if self.rows.is_empty() {
            vec![Line::from(Span::styled(
                "No data yet",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            self.rows
                .iter()
                .map(|s| snapshot_line(s, self.period))
                .collect()
        };
        Paragraph::new(lines).block(overview).render(cols[0], buf);

        let heading = |text: &str, color: Color| {
            Line::from(Span::styled(
                format!("{} {}", text, self.period.label()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
        };
        let mut mover_lines = vec![heading("Top Gainers", Color::Green)];
        let period = self.period;
        mover_lines.extend(self.movers.gainers.iter().map(|s| snapshot_line(s, period)));
        mover_lines.push(heading("Top Losers", Color::Red));
        mover_lines.extend(self.movers.losers.iter().map(|s| snapshot_line(s, period)));

        let movers = Block::default()
            .title(" Movers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        Paragraph::new(mover_lines).block(movers).render(cols[1], buf);
    }
}
