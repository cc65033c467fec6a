use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::model::{LookbackWindow, PriceSeries};

use super::QuoteProvider;

struct CacheEntry {
    series: PriceSeries,
    fetched_at: Instant,
}

/// Memoizes successful fetches per (symbol, window) for `ttl`.
///
/// A zero `ttl` disables caching. Errors are never cached.
pub struct CachedQuoteProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<(String, LookbackWindow), CacheEntry>>,
}

impl<P: QuoteProvider> CachedQuoteProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn invalidate_all(&self) {
        self.entries.lock().await.clear();
    }

    /// Drops entries older than the TTL.
    pub async fn evict_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .lock()
            .await
            .retain(|_, entry| entry.fetched_at.elapsed() < ttl);
    }
}

#[async_trait]
impl<P: QuoteProvider> QuoteProvider for CachedQuoteProvider<P> {
    async fn fetch_series(&self, symbol: &str, window: LookbackWindow) -> Result<PriceSeries> {
        if self.ttl.is_zero() {
            return self.inner.fetch_series(symbol, window).await;
        }

        let key = (symbol.to_string(), window);
        if let Some(entry) = self.entries.lock().await.get(&key) {
            if entry.fetched_at.elapsed() < self.ttl {
                tracing::trace!(symbol, window = %window, "series cache hit");
                return Ok(entry.series.clone());
            }
        }

        let series = self.inner.fetch_series(symbol, window).await?;
        self.entries.lock().await.insert(
            key,
            CacheEntry {
                series: series.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(series)
    }
}
