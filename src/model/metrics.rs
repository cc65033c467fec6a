use std::fmt;

/// Named metric keys of a [`ChangeMetrics`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    DayChangePct,
    WeekChangePct,
    MonthChangePct,
    QuarterChangePct,
    YearChangePct,
    YearHigh,
    YearLow,
}

impl MetricName {
    pub const ALL: [MetricName; 7] = [
        MetricName::DayChangePct,
        MetricName::WeekChangePct,
        MetricName::MonthChangePct,
        MetricName::QuarterChangePct,
        MetricName::YearChangePct,
        MetricName::YearHigh,
        MetricName::YearLow,
    ];

    /// The percentage-change metrics, shortest period first.
    pub const CHANGE_PERIODS: [MetricName; 5] = [
        MetricName::DayChangePct,
        MetricName::WeekChangePct,
        MetricName::MonthChangePct,
        MetricName::QuarterChangePct,
        MetricName::YearChangePct,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MetricName::DayChangePct => "day_change_pct",
            MetricName::WeekChangePct => "week_change_pct",
            MetricName::MonthChangePct => "month_change_pct",
            MetricName::QuarterChangePct => "quarter_change_pct",
            MetricName::YearChangePct => "year_change_pct",
            MetricName::YearHigh => "year_high",
            MetricName::YearLow => "year_low",
        }
    }

    /// Short column label, e.g. `1W` or `52W H`.
    pub fn label(self) -> &'static str {
        match self {
            MetricName::DayChangePct => "1D",
            MetricName::WeekChangePct => "1W",
            MetricName::MonthChangePct => "1M",
            MetricName::QuarterChangePct => "3M",
            MetricName::YearChangePct => "1Y",
            MetricName::YearHigh => "52W H",
            MetricName::YearLow => "52W L",
        }
    }

    /// Next percentage-change period, wrapping from 1Y back to 1D.
    pub fn next_period(self) -> Self {
        let idx = Self::CHANGE_PERIODS
            .iter()
            .position(|m| *m == self)
            .unwrap_or(Self::CHANGE_PERIODS.len() - 1);
        Self::CHANGE_PERIODS[(idx + 1) % Self::CHANGE_PERIODS.len()]
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Derived statistics for one symbol. `None` means unavailable, which is not zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeMetrics {
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub day_change_pct: Option<f64>,
    pub week_change_pct: Option<f64>,
    pub month_change_pct: Option<f64>,
    pub quarter_change_pct: Option<f64>,
    pub year_change_pct: Option<f64>,
    pub year_high: Option<f64>,
    pub year_low: Option<f64>,
    pub volume: Option<f64>,
    pub as_of_ms: Option<u64>,
}

impl ChangeMetrics {
    pub fn get(&self, name: MetricName) -> Option<f64> {
        match name {
            MetricName::DayChangePct => self.day_change_pct,
            MetricName::WeekChangePct => self.week_change_pct,
            MetricName::MonthChangePct => self.month_change_pct,
            MetricName::QuarterChangePct => self.quarter_change_pct,
            MetricName::YearChangePct => self.year_change_pct,
            MetricName::YearHigh => self.year_high,
            MetricName::YearLow => self.year_low,
        }
    }

    pub fn entries(&self) -> Vec<(MetricName, Option<f64>)> {
        MetricName::ALL
            .iter()
            .map(|&name| (name, self.get(name)))
            .collect()
    }

    pub fn unavailable_count(&self) -> usize {
        self.entries().iter().filter(|(_, v)| v.is_none()).count()
    }
}
