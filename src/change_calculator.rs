//! Percentage-change and extrema statistics derived from fetched price series.
//!
//! Every function here is pure. Short series, zero references and non-finite
//! inputs produce `None` ("unavailable") instead of an error or a NaN.

use std::collections::BTreeMap;

use crate::model::{ChangeMetrics, LookbackWindow, PriceSeries};

/// `(latest - reference) / reference * 100`, or `None` when undefined.
pub fn change_pct(reference: f64, latest: f64) -> Option<f64> {
    if !reference.is_finite() || !latest.is_finite() || reference == 0.0 {
        return None;
    }
    let pct = (latest - reference) / reference * 100.0;
    pct.is_finite().then_some(pct)
}

/// First close of the window against its last close.
pub fn window_change_pct(closes: &[f64]) -> Option<f64> {
    if closes.len() < 2 {
        return None;
    }
    change_pct(closes[0], closes[closes.len() - 1])
}

/// Previous close and the latest close's change against it.
pub fn day_change(closes: &[f64]) -> (Option<f64>, Option<f64>) {
    if closes.len() < 2 {
        return (None, None);
    }
    let previous = closes[closes.len() - 2];
    let latest = closes[closes.len() - 1];
    let previous_close = previous.is_finite().then_some(previous);
    (previous_close, change_pct(previous, latest))
}

/// Highest high and lowest low over the window.
pub fn window_extrema(highs: &[f64], lows: &[f64]) -> (Option<f64>, Option<f64>) {
    if highs.len() < 2 || lows.len() < 2 {
        return (None, None);
    }
    let high = highs
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
    let low = lows
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))));
    (high, low)
}

/// The series fetched for one symbol, at most one per window.
#[derive(Debug, Clone, Default)]
pub struct WindowSeries {
    series: BTreeMap<LookbackWindow, PriceSeries>,
}

impl WindowSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.window, series);
    }

    pub fn with(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn get(&self, window: LookbackWindow) -> Option<&PriceSeries> {
        self.series.get(&window)
    }

    fn closes(&self, window: LookbackWindow) -> Vec<f64> {
        self.get(window).map(PriceSeries::closes).unwrap_or_default()
    }
}

pub fn compute_metrics(input: &WindowSeries) -> ChangeMetrics {
    let day_closes = input.closes(LookbackWindow::Day);
    let (previous_close, day_change_pct) = day_change(&day_closes);

    let latest_day_bar = input
        .get(LookbackWindow::Day)
        .and_then(PriceSeries::latest)
        .or_else(|| input.get(LookbackWindow::Month).and_then(PriceSeries::latest));

    let (year_high, year_low) = match input.get(LookbackWindow::Year) {
        Some(series) => window_extrema(&series.highs(), &series.lows()),
        None => (None, None),
    };

    ChangeMetrics {
        current_price: latest_day_bar.map(|b| b.close),
        previous_close,
        day_change_pct,
        week_change_pct: window_change_pct(&input.closes(LookbackWindow::Week)),
        month_change_pct: window_change_pct(&input.closes(LookbackWindow::Month)),
        quarter_change_pct: window_change_pct(&input.closes(LookbackWindow::Quarter)),
        year_change_pct: window_change_pct(&input.closes(LookbackWindow::Year)),
        year_high,
        year_low,
        volume: latest_day_bar.map(|b| b.volume),
        as_of_ms: latest_day_bar.map(|b| b.timestamp_ms),
    }
}
