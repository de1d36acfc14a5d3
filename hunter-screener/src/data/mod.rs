//! Market data module for the screener.
//!
//! Holds the daily-bar price series model, the provider abstraction,
//! the Yahoo Finance adapter, and the benchmark series cache.

mod benchmark;
mod provider;
mod yahoo;

pub use benchmark::BenchmarkCache;
pub use provider::{provider_symbol, PriceHistoryProvider, ProviderError};
pub use yahoo::YahooAdapter;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Data Types
// ============================================================================

/// A single daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Trading date
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume (shares)
    pub volume: u64,
}

/// An ordered-by-date daily price series for one symbol.
///
/// Invariant: dates strictly increasing, no duplicates. The constructor
/// enforces this by sorting and keeping the last bar per date, so the
/// rest of the pipeline can rely on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Symbol the series belongs to
    pub symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series from raw bars, sorting by date and dropping
    /// duplicate dates (last one wins).
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by(|next, prev| {
            if next.date == prev.date {
                // keep the later entry
                *prev = next.clone();
                true
            } else {
                false
            }
        });

        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    /// Number of bars in the series.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the series has no bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All bars, oldest first.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// The most recent bar, if any.
    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Closing prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Align this series with another by trading-date intersection.
    ///
    /// Returns the two close-price vectors over the common dates,
    /// sorted ascending. Either vector may be empty when there is no
    /// overlap.
    pub fn align_closes(&self, other: &PriceSeries) -> (Vec<f64>, Vec<f64>) {
        use std::collections::BTreeMap;

        let theirs: BTreeMap<NaiveDate, f64> =
            other.bars.iter().map(|b| (b.date, b.close)).collect();

        let mut own = Vec::new();
        let mut bench = Vec::new();
        for bar in &self.bars {
            if let Some(&close) = theirs.get(&bar.date) {
                own.push(bar.close);
                bench.push(close);
            }
        }

        (own, bench)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> Bar {
        Bar {
            date: date.parse().unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_series_sorts_by_date() {
        let series = PriceSeries::new(
            "AAPL",
            vec![bar("2024-01-03", 3.0), bar("2024-01-01", 1.0), bar("2024-01-02", 2.0)],
        );
        let closes = series.closes();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_series_dedups_dates() {
        let series = PriceSeries::new(
            "AAPL",
            vec![bar("2024-01-01", 1.0), bar("2024-01-01", 9.0), bar("2024-01-02", 2.0)],
        );
        assert_eq!(series.len(), 2);
        // last bar for the duplicated date wins
        assert_eq!(series.bars()[0].close, 9.0);
    }

    #[test]
    fn test_align_intersection() {
        let stock = PriceSeries::new(
            "AAPL",
            vec![bar("2024-01-01", 10.0), bar("2024-01-02", 11.0), bar("2024-01-04", 12.0)],
        );
        let bench = PriceSeries::new(
            "^GSPC",
            vec![bar("2024-01-02", 100.0), bar("2024-01-03", 101.0), bar("2024-01-04", 102.0)],
        );

        let (s, b) = stock.align_closes(&bench);
        assert_eq!(s, vec![11.0, 12.0]);
        assert_eq!(b, vec![100.0, 102.0]);
    }

    #[test]
    fn test_align_no_overlap() {
        let stock = PriceSeries::new("AAPL", vec![bar("2024-01-01", 10.0)]);
        let bench = PriceSeries::new("^GSPC", vec![bar("2024-02-01", 100.0)]);

        let (s, b) = stock.align_closes(&bench);
        assert!(s.is_empty());
        assert!(b.is_empty());
    }

    #[test]
    fn test_latest_bar() {
        let series = PriceSeries::new("AAPL", vec![bar("2024-01-01", 1.0), bar("2024-01-02", 2.0)]);
        assert_eq!(series.latest().unwrap().close, 2.0);
        assert!(PriceSeries::new("AAPL", vec![]).latest().is_none());
    }
}
