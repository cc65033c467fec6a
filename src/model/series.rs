use std::fmt;

use super::bar::PriceBar;

/// Named lookback over which a change is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookbackWindow {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl LookbackWindow {
    pub const ALL: [LookbackWindow; 5] = [
        LookbackWindow::Day,
        LookbackWindow::Week,
        LookbackWindow::Month,
        LookbackWindow::Quarter,
        LookbackWindow::Year,
    ];

    /// Calendar days requested from the provider.
    ///
    /// `Day` spans several sessions so the series always carries the prior
    /// session's close next to the latest one.
    pub fn lookback_days(self) -> i64 {
        match self {
            LookbackWindow::Day => 5,
            LookbackWindow::Week => 7,
            LookbackWindow::Month => 31,
            LookbackWindow::Quarter => 92,
            LookbackWindow::Year => 366,
        }
    }

    pub fn bar_interval(self) -> &'static str {
        "1d"
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LookbackWindow::Day => "1d",
            LookbackWindow::Week => "1w",
            LookbackWindow::Month => "1mo",
            LookbackWindow::Quarter => "3mo",
            LookbackWindow::Year => "1y",
        }
    }
}

impl fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily bars for one symbol over one lookback window, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub window: LookbackWindow,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Sorts bars by timestamp and drops bars without a finite close.
    pub fn new(symbol: &str, window: LookbackWindow, mut bars: Vec<PriceBar>) -> Self {
        bars.retain(PriceBar::is_finite);
        bars.sort_by_key(|b| b.timestamp_ms);
        Self {
            symbol: symbol.to_string(),
            window,
            bars,
        }
    }

    /// Series of flat bars built from closes, one day apart.
    pub fn from_closes(symbol: &str, window: LookbackWindow, closes: &[f64]) -> Self {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::from_close(i as u64 * 86_400_000, c))
            .collect();
        Self::new(symbol, window, bars)
    }

    pub fn empty(symbol: &str, window: LookbackWindow) -> Self {
        Self::new(symbol, window, Vec::new())
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }
}
