//! Screening engine.
//!
//! Orchestrates the full pipeline for each symbol: fetch history,
//! derive indicators, compute the RS rating against the cached
//! benchmark, and evaluate the trend template. Batch screening runs
//! symbols through a bounded concurrent pool with a per-symbol
//! timeout; one bad symbol never aborts the batch.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use hunter_common::config::ScreenerConfig;

use crate::analysis::{
    compute_indicators, compute_rs_rating, evaluate, CriterionResult, IndicatorSnapshot,
    MAX_SCORE, MIN_RATING,
};
use crate::data::{provider_symbol, BenchmarkCache, PriceHistoryProvider};

// ============================================================================
// Report Types
// ============================================================================

/// Key technical metrics surfaced alongside the verdict.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolMetrics {
    pub price: f64,
    pub ma_50: f64,
    pub ma_150: f64,
    pub ma_200: f64,
    pub week_52_high: f64,
    pub week_52_low: f64,
    pub from_high_pct: f64,
    pub from_low_pct: f64,
    pub ma_200_trending_up: bool,
    pub volume: u64,
    pub volume_ratio: f64,
}

impl From<&IndicatorSnapshot> for SymbolMetrics {
    fn from(snap: &IndicatorSnapshot) -> Self {
        Self {
            price: snap.price,
            ma_50: snap.ma50,
            ma_150: snap.ma150,
            ma_200: snap.ma200,
            week_52_high: snap.week52_high,
            week_52_low: snap.week52_low,
            from_high_pct: snap.from_high_pct,
            from_low_pct: snap.from_low_pct,
            ma_200_trending_up: snap.ma200_trending_up,
            volume: snap.volume,
            volume_ratio: snap.volume_ratio,
        }
    }
}

/// Per-symbol screening result.
///
/// Always well-formed: a symbol that could not be analyzed gets a
/// failed report with the error as its single failure reason,
/// `rs_rating` 0, and no metrics.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    /// The symbol as the caller submitted it
    pub symbol: String,
    pub passed: bool,
    /// RS rating 1-99, or 0 when analysis failed outright
    pub rs_rating: u8,
    pub score: u8,
    pub max_score: u8,
    pub fail_reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<SymbolMetrics>,
    pub details: BTreeMap<String, CriterionResult>,
    pub summary: String,
}

impl SymbolReport {
    /// A report for a symbol whose analysis never produced a verdict.
    fn failed(symbol: &str, reason: String) -> Self {
        Self {
            symbol: symbol.to_string(),
            passed: false,
            rs_rating: 0,
            score: 0,
            max_score: MAX_SCORE,
            fail_reasons: vec![reason.clone()],
            metrics: None,
            details: BTreeMap::new(),
            summary: reason,
        }
    }
}

/// Aggregate statistics for one batch.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenSummary {
    pub total_analyzed: usize,
    pub passed_criteria: usize,
    /// Percent of analyzed symbols that passed, one decimal
    pub success_rate: f64,
    /// RFC 3339 completion time
    pub timestamp: String,
}

/// Full batch result: per-symbol reports in submission order plus the
/// aggregate summary.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenOutcome {
    pub results: Vec<SymbolReport>,
    pub summary: ScreenSummary,
}

// ============================================================================
// Engine
// ============================================================================

/// The screening engine.
///
/// Cheap to clone via `Arc` internals; one instance serves all
/// requests.
pub struct ScreenerEngine {
    provider: Arc<dyn PriceHistoryProvider>,
    benchmark: Arc<BenchmarkCache>,
    config: ScreenerConfig,
}

impl ScreenerEngine {
    /// Build an engine over the given provider.
    pub fn new(provider: Arc<dyn PriceHistoryProvider>, config: ScreenerConfig) -> Self {
        let benchmark = Arc::new(BenchmarkCache::new(
            config.benchmark.symbol.clone(),
            config.benchmark.lookback_days,
            config.benchmark.cache_ttl_secs,
        ));

        Self {
            provider,
            benchmark,
            config,
        }
    }

    /// Screen a batch of symbols.
    ///
    /// Runs at most `max_workers` analyses concurrently, each bounded
    /// by the per-symbol timeout. Reports come back in submission
    /// order.
    pub async fn screen(&self, symbols: &[String]) -> ScreenOutcome {
        let started = std::time::Instant::now();
        let timeout = Duration::from_secs(self.config.symbol_timeout_secs);

        info!(
            symbols = symbols.len(),
            max_workers = self.config.max_workers,
            "Starting screen batch"
        );

        let analyses: Vec<futures::future::BoxFuture<'_, (usize, SymbolReport)>> = symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| {
                let fut: futures::future::BoxFuture<'_, (usize, SymbolReport)> =
                    Box::pin(async move {
                        let report =
                            match tokio::time::timeout(timeout, self.analyze(symbol)).await {
                                Ok(report) => report,
                                Err(_) => {
                                    warn!(symbol = %symbol, "Analysis timed out");
                                    SymbolReport::failed(
                                        symbol,
                                        format!(
                                            "Analysis timed out after {}s",
                                            self.config.symbol_timeout_secs
                                        ),
                                    )
                                }
                            };
                        (i, report)
                    });
                fut
            })
            .collect();

        let mut indexed: Vec<(usize, SymbolReport)> = stream::iter(analyses)
        .buffer_unordered(self.config.max_workers.max(1))
        .collect()
        .await;

        indexed.sort_by_key(|(i, _)| *i);
        let results: Vec<SymbolReport> = indexed.into_iter().map(|(_, r)| r).collect();

        let passed_criteria = results.iter().filter(|r| r.passed).count();
        let total_analyzed = results.len();
        let success_rate = if total_analyzed > 0 {
            (passed_criteria as f64 / total_analyzed as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };

        info!(
            total = total_analyzed,
            passed = passed_criteria,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Screen batch complete"
        );

        ScreenOutcome {
            results,
            summary: ScreenSummary {
                total_analyzed,
                passed_criteria,
                success_rate,
                timestamp: Utc::now().to_rfc3339(),
            },
        }
    }

    /// Analyze one symbol. Infallible: every failure mode is folded
    /// into a failed report.
    pub async fn analyze(&self, symbol: &str) -> SymbolReport {
        let fetch_symbol = provider_symbol(symbol);
        debug!(symbol, provider_symbol = %fetch_symbol, "Analyzing symbol");

        let series = match self
            .provider
            .fetch_daily(&fetch_symbol, self.config.lookback_days)
            .await
        {
            Ok(series) => series,
            Err(e) => {
                warn!(symbol, error = %e, "History fetch failed");
                return SymbolReport::failed(symbol, format!("Data fetch failed: {}", e));
            }
        };

        let snapshot = match compute_indicators(&series) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(symbol, error = %e, "Indicator derivation failed");
                return SymbolReport::failed(symbol, e.to_string());
            }
        };

        // A missing benchmark degrades the RS rating rather than
        // failing the symbol.
        let rs_rating = match self.benchmark.get_or_fetch(self.provider.as_ref()).await {
            Ok(benchmark) => compute_rs_rating(&series, &benchmark),
            Err(e) => {
                warn!(symbol, error = %e, "Benchmark unavailable, RS rating fails closed");
                MIN_RATING
            }
        };

        let verdict = evaluate(&snapshot, rs_rating);

        debug!(
            symbol,
            passed = verdict.passed,
            score = verdict.score,
            rs_rating,
            "Analysis complete"
        );

        SymbolReport {
            symbol: symbol.to_string(),
            passed: verdict.passed,
            rs_rating,
            score: verdict.score,
            max_score: verdict.max_score,
            fail_reasons: verdict.fail_reasons,
            metrics: Some(SymbolMetrics::from(&snapshot)),
            details: verdict.details,
            summary: verdict.summary,
        }
    }

    /// Prime the benchmark cache so the first batch does not pay for
    /// the fetch.
    pub async fn warm_up(&self) -> Result<(), crate::data::ProviderError> {
        let series = self.benchmark.get_or_fetch(self.provider.as_ref()).await?;
        info!(
            symbol = %self.config.benchmark.symbol,
            bars = series.len(),
            "Benchmark cache warmed"
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Bar, PriceSeries, ProviderError};
    use async_trait::async_trait;
    use chrono::NaiveDate;

    /// Provider serving canned series: an uptrending stock and a flat
    /// benchmark. Unknown symbols are not found.
    struct CannedProvider;

    fn make_series(symbol: &str, close_at: impl Fn(usize) -> f64) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let bars = (0..300)
            .map(|i| {
                let close = close_at(i);
                Bar {
                    date: start + chrono::Duration::days(i as i64),
                    open: close,
                    high: close * 1.01,
                    low: close * 0.99,
                    close,
                    volume: 1_000_000,
                }
            })
            .collect();
        PriceSeries::new(symbol, bars)
    }

    #[async_trait]
    impl PriceHistoryProvider for CannedProvider {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn fetch_daily(
            &self,
            symbol: &str,
            _lookback_days: u32,
        ) -> Result<PriceSeries, ProviderError> {
            match symbol {
                "UP" => Ok(make_series("UP", |i| 100.0 * 1.005f64.powi(i as i32))),
                "^GSPC" => Ok(make_series("^GSPC", |_| 4000.0)),
                "SHORT" => Ok(make_series("SHORT", |_| 50.0).truncated(10)),
                other => Err(ProviderError::NotFound(other.to_string())),
            }
        }
    }

    impl PriceSeries {
        fn truncated(&self, n: usize) -> PriceSeries {
            PriceSeries::new(self.symbol.clone(), self.bars()[..n].to_vec())
        }
    }

    fn engine() -> ScreenerEngine {
        ScreenerEngine::new(Arc::new(CannedProvider), ScreenerConfig::default())
    }

    #[tokio::test]
    async fn test_uptrend_passes_template() {
        let report = engine().analyze("UP").await;
        assert!(report.passed, "fail_reasons: {:?}", report.fail_reasons);
        assert_eq!(report.score, 7);
        assert!(report.rs_rating >= 70);
        assert!(report.metrics.is_some());
    }

    #[tokio::test]
    async fn test_unknown_symbol_yields_failed_report() {
        let report = engine().analyze("NOPE").await;
        assert!(!report.passed);
        assert_eq!(report.rs_rating, 0);
        assert_eq!(report.score, 0);
        assert!(report.metrics.is_none());
        assert!(report.fail_reasons[0].starts_with("Data fetch failed:"));
    }

    #[tokio::test]
    async fn test_short_history_yields_failed_report() {
        let report = engine().analyze("SHORT").await;
        assert!(!report.passed);
        assert!(report.fail_reasons[0].contains("Insufficient data"));
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_survives_failures() {
        let symbols: Vec<String> = ["UP", "NOPE", "UP"].iter().map(|s| s.to_string()).collect();
        let outcome = engine().screen(&symbols).await;

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.results[0].symbol, "UP");
        assert_eq!(outcome.results[1].symbol, "NOPE");
        assert!(outcome.results[0].passed);
        assert!(!outcome.results[1].passed);
        assert!(outcome.results[2].passed);

        assert_eq!(outcome.summary.total_analyzed, 3);
        assert_eq!(outcome.summary.passed_criteria, 2);
        assert_eq!(outcome.summary.success_rate, 66.7);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let outcome = engine().screen(&[]).await;
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.summary.success_rate, 0.0);
    }

    #[tokio::test]
    async fn test_warm_up_primes_benchmark_cache() {
        use std::sync::atomic::{AtomicU32, Ordering};

        #[derive(Default)]
        struct CountingProvider {
            bench_fetches: AtomicU32,
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
                match symbol {
                    "^GSPC" => {
                        self.bench_fetches.fetch_add(1, Ordering::Relaxed);
                        Ok(make_series("^GSPC", |_| 4000.0))
                    }
                    other => Ok(make_series(other, |i| 100.0 * 1.005f64.powi(i as i32))),
                }
            }
        }

        let provider = Arc::new(CountingProvider::default());
        let engine = ScreenerEngine::new(provider.clone(), ScreenerConfig::default());

        engine.warm_up().await.unwrap();

        // subsequent analyses hit the warmed cache
        engine.analyze("UP").await;
        engine.analyze("MSFT").await;
        assert_eq!(provider.bench_fetches.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_symbol_remap_keeps_original_in_report() {
        // BRK.B remaps to BRK-B for the provider, which does not know
        // it; the failed report still carries the submitted form
        let report = engine().analyze("BRK.B").await;
        assert_eq!(report.symbol, "BRK.B");
    }
}
