pub mod cache;
pub mod yahoo;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{LookbackWindow, PriceSeries};

pub use cache::CachedQuoteProvider;
pub use yahoo::YahooChartClient;

/// Source of daily price series for a symbol.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_series(&self, symbol: &str, window: LookbackWindow) -> Result<PriceSeries>;
}

#[async_trait]
impl<P: QuoteProvider + ?Sized> QuoteProvider for std::sync::Arc<P> {
    async fn fetch_series(&self, symbol: &str, window: LookbackWindow) -> Result<PriceSeries> {
        (**self).fetch_series(symbol, window).await
    }
}
