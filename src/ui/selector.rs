use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::registry::Instrument;

use super::SymbolSelector;

pub struct SelectorPopup<'a> {
    selector: &'a SymbolSelector,
    matches: &'a [&'a Instrument],
}

impl<'a> SelectorPopup<'a> {
    pub fn new(selector: &'a SymbolSelector, matches: &'a [&'a Instrument]) -> Self {
        Self { selector, matches }
    }
}

impl Widget for SelectorPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .title(" Add to Watchlist (Enter add, Esc close) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let visible = block.inner(area).height.saturating_sub(2) as usize;

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Search: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{}_", self.selector.query),
                    Style::default().fg(Color::White),
                ),
            ]),
            Line::from(""),
        ];

        if self.matches.is_empty() {
            lines.push(Line::from(Span::styled(
                "No matching instruments",
                Style::default().fg(Color::DarkGray),
            )));
        }

        let offset = self.selector.selected.saturating_sub(visible.saturating_sub(1));
        for (idx, inst) in self.matches.iter().enumerate().skip(offset).take(visible) {
            let style = if idx == self.selector.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<30}", inst.display_name), style),
                Span::styled(
                    format!(" {:<14} ", inst.symbol),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(inst.category.label(), Style::default().fg(Color::DarkGray)),
            ]));
        }

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
