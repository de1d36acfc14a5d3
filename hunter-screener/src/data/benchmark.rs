//! Benchmark series cache.
//!
//! The benchmark index history is the one piece of data every symbol
//! analysis shares, so it is fetched once and cached with a short TTL.
//! Readers always see a complete series; a refresh replaces the slot
//! atomically under the write lock.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::provider::{PriceHistoryProvider, ProviderError};
use super::PriceSeries;

/// Cache entry with TTL
#[derive(Debug, Clone)]
struct CacheEntry {
    series: PriceSeries,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(series: PriceSeries, ttl_secs: i64) -> Self {
        Self {
            series,
            expires_at: Utc::now() + Duration::seconds(ttl_secs),
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Single-slot cache for the benchmark price series.
pub struct BenchmarkCache {
    symbol: String,
    lookback_days: u32,
    ttl_secs: i64,
    slot: RwLock<Option<CacheEntry>>,
}

impl BenchmarkCache {
    /// Create a cache for the given benchmark symbol.
    pub fn new(symbol: impl Into<String>, lookback_days: u32, ttl_secs: i64) -> Self {
        Self {
            symbol: symbol.into(),
            lookback_days,
            ttl_secs,
            slot: RwLock::new(None),
        }
    }

    /// The benchmark symbol this cache serves.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Get the benchmark series, fetching through the provider when the
    /// cached copy is missing or expired.
    ///
    /// Concurrent callers may race on a cold cache; each fetches its own
    /// copy and the last write wins, which is harmless since all copies
    /// describe the same index.
    pub async fn get_or_fetch(
        &self,
        provider: &dyn PriceHistoryProvider,
    ) -> Result<PriceSeries, ProviderError> {
        {
            let slot = self.slot.read().await;
            if let Some(entry) = slot.as_ref() {
                if !entry.is_expired() {
                    debug!(symbol = %self.symbol, "Benchmark cache hit");
                    return Ok(entry.series.clone());
                }
            }
        }

        info!(symbol = %self.symbol, "Fetching benchmark history");
        let series = provider.fetch_daily(&self.symbol, self.lookback_days).await?;

        let mut slot = self.slot.write().await;
        *slot = Some(CacheEntry::new(series.clone(), self.ttl_secs));
        Ok(series)
    }

    /// Drop the cached series (next read fetches fresh).
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        *slot = None;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Bar;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingProvider {
        calls: AtomicU32,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PriceHistoryProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch_daily(
            &self,
            symbol: &str,
            _lookback_days: u32,
        ) -> Result<PriceSeries, ProviderError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(PriceSeries::new(
                symbol,
                vec![Bar {
                    date: "2024-01-02".parse().unwrap(),
                    open: 100.0,
                    high: 101.0,
                    low: 99.0,
                    close: 100.5,
                    volume: 1_000,
                }],
            ))
        }
    }

    #[tokio::test]
    async fn test_cache_hit_avoids_second_fetch() {
        let provider = CountingProvider::new();
        let cache = BenchmarkCache::new("^GSPC", 500, 3600);

        let first = cache.get_or_fetch(&provider).await.unwrap();
        let second = cache.get_or_fetch(&provider).await.unwrap();

        assert_eq!(first.len(), second.len());
        assert_eq!(provider.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let provider = CountingProvider::new();
        // ttl of -1 means every entry is already expired
        let cache = BenchmarkCache::new("^GSPC", 500, -1);

        cache.get_or_fetch(&provider).await.unwrap();
        cache.get_or_fetch(&provider).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_fetch() {
        let provider = CountingProvider::new();
        let cache = BenchmarkCache::new("^GSPC", 500, 3600);

        cache.get_or_fetch(&provider).await.unwrap();
        cache.invalidate().await;
        cache.get_or_fetch(&provider).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::Relaxed), 2);
    }
}
