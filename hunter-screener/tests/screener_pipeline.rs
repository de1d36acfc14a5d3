//! End-to-end screening pipeline tests with a mock data provider.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

use hunter_common::config::ScreenerConfig;
use hunter_screener::data::{Bar, PriceHistoryProvider, PriceSeries, ProviderError};
use hunter_screener::screener::ScreenerEngine;

// ============================================================================
// Mock Provider
// ============================================================================

/// Provider with per-symbol behaviors: a strong uptrend, a downtrend,
/// a flat benchmark, a symbol with too little history, a missing
/// symbol, and one that stalls.
struct MockProvider {
    stall: Duration,
}

impl MockProvider {
    fn new() -> Self {
        Self {
            stall: Duration::from_secs(5),
        }
    }
}

fn daily_series(symbol: &str, n: usize, close_at: impl Fn(usize) -> f64) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = close_at(i);
            Bar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 2_000_000,
            }
        })
        .collect();
    PriceSeries::new(symbol, bars)
}

#[async_trait]
impl PriceHistoryProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_daily(
        &self,
        symbol: &str,
        _lookback_days: u32,
    ) -> Result<PriceSeries, ProviderError> {
        match symbol {
            // steady 0.5%/day climb over a year-plus
            "WINNER" => Ok(daily_series("WINNER", 300, |i| {
                100.0 * 1.005f64.powi(i as i32)
            })),
            // steady decline
            "LOSER" => Ok(daily_series("LOSER", 300, |i| {
                100.0 * 0.997f64.powi(i as i32)
            })),
            "^GSPC" => Ok(daily_series("^GSPC", 300, |_| 4000.0)),
            "THIN" => Ok(daily_series("THIN", 20, |_| 50.0)),
            "SLOW" => {
                tokio::time::sleep(self.stall).await;
                Ok(daily_series("SLOW", 300, |_| 100.0))
            }
            other => Err(ProviderError::NotFound(other.to_string())),
        }
    }
}

fn engine_with(config: ScreenerConfig) -> ScreenerEngine {
    ScreenerEngine::new(Arc::new(MockProvider::new()), config)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_strong_uptrend_passes_all_criteria() {
    let engine = engine_with(ScreenerConfig::default());
    let report = engine.analyze("WINNER").await;

    assert!(report.passed, "fail_reasons: {:?}", report.fail_reasons);
    assert_eq!(report.score, 7);
    assert_eq!(report.max_score, 7);
    assert!(report.rs_rating >= 70);
    assert_eq!(
        report.summary,
        "All Minervini criteria passed - Perfect trend template"
    );

    let metrics = report.metrics.expect("passing report carries metrics");
    assert!(metrics.price > metrics.ma_50);
    assert!(metrics.ma_50 > metrics.ma_150);
    assert!(metrics.ma_150 > metrics.ma_200);
    assert!(metrics.ma_200_trending_up);
}

#[tokio::test]
async fn test_downtrend_fails_with_reasons() {
    let engine = engine_with(ScreenerConfig::default());
    let report = engine.analyze("LOSER").await;

    assert!(!report.passed);
    assert!(report.score < 7);
    assert!(!report.fail_reasons.is_empty());
    // a falling stock against a flat benchmark has weak relative strength
    assert!(report.rs_rating < 70);
    assert!(report
        .fail_reasons
        .iter()
        .any(|r| r.starts_with("RS Rating")));
}

#[tokio::test]
async fn test_failures_do_not_abort_the_batch() {
    let engine = engine_with(ScreenerConfig::default());
    let symbols: Vec<String> = ["WINNER", "MISSING", "THIN", "LOSER"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let outcome = engine.screen(&symbols).await;

    assert_eq!(outcome.results.len(), 4);
    // submission order survives the unordered pool
    let names: Vec<&str> = outcome.results.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(names, vec!["WINNER", "MISSING", "THIN", "LOSER"]);

    assert!(outcome.results[0].passed);
    assert!(outcome.results[1].fail_reasons[0].starts_with("Data fetch failed:"));
    assert_eq!(outcome.results[1].rs_rating, 0);
    assert!(outcome.results[2].fail_reasons[0].contains("Insufficient data"));
    assert!(!outcome.results[3].passed);

    assert_eq!(outcome.summary.total_analyzed, 4);
    assert_eq!(outcome.summary.passed_criteria, 1);
    assert_eq!(outcome.summary.success_rate, 25.0);
}

#[tokio::test]
async fn test_slow_symbol_times_out_without_stalling_others() {
    let config = ScreenerConfig {
        symbol_timeout_secs: 1,
        ..ScreenerConfig::default()
    };
    let engine = engine_with(config);

    let symbols: Vec<String> = ["SLOW", "WINNER"].iter().map(|s| s.to_string()).collect();
    let outcome = engine.screen(&symbols).await;

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(
        outcome.results[0].fail_reasons,
        vec!["Analysis timed out after 1s"]
    );
    assert!(outcome.results[1].passed);
}

#[tokio::test]
async fn test_report_serializes_without_metrics_on_failure() {
    let engine = engine_with(ScreenerConfig::default());
    let report = engine.analyze("MISSING").await;

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["symbol"], "MISSING");
    assert_eq!(json["rs_rating"], 0);
    // failed reports omit metrics entirely
    assert!(json.get("metrics").is_none());
}
