/// One OHLCV bar of a daily price series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub timestamp_ms: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Flat bar where every price field equals `close`.
    pub fn from_close(timestamp_ms: u64, close: f64) -> Self {
        Self {
            timestamp_ms,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.close.is_finite()
    }
}
