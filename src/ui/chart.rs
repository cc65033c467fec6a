use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// One-year close history of the selected symbol as a dot plot.
pub struct PriceChart<'a> {
    symbol: Option<&'a str>,
    closes: &'a [f64],
}

impl<'a> PriceChart<'a> {
    pub fn new(symbol: Option<&'a str>, closes: &'a [f64]) -> Self {
        Self { symbol, closes }
    }
}

impl Widget for PriceChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.symbol {
            Some(symbol) => format!(" {} 1Y ", symbol),
            None => " History ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        if self.closes.is_empty() {
            Paragraph::new("No history")
                .style(Style::default().fg(Color::DarkGray))
                .block(block)
                .render(area, buf);
            return;
        }

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 2 || inner.width < 4 {
            return;
        }

        let chart_height = inner.height as usize;
        let chart_width = inner.width as usize;
        let visible = &self.closes[self.closes.len().saturating_sub(chart_width)..];

        let min_price = visible.iter().copied().fold(f64::INFINITY, f64::min);
        let max_price = visible.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max_price - min_price;
        let range = if range < 0.01 { 1.0 } else { range };

        let first = visible[0];
        let last = visible[visible.len() - 1];
        let color = if last >= first {
            Color::Green
        } else {
            Color::Red
        };

        for (i, &price) in visible.iter().enumerate() {
            let x = inner.x + i as u16;
            let normalized = (price - min_price) / range;
            let rise = ((normalized * (chart_height - 1) as f64) as usize).min(chart_height - 1);
            let y = inner.y + (chart_height - 1 - rise) as u16;
            buf.set_string(x, y, "●", Style::default().fg(color));
        }

        // Axis labels over the plot, top-left and bottom-left.
        let label = Style::default().fg(Color::DarkGray);
        buf.set_string(inner.x, inner.y, format!("{:.2}", max_price), label);
        buf.set_string(
            inner.x,
            inner.y + inner.height - 1,
            format!("{:.2}", min_price),
            label,
        );
    }
}
