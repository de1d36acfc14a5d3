//! Technical indicator derivation from a daily price series.
//!
//! Produces the snapshot the trend-template evaluator consumes: simple
//! moving averages with graceful short-history degradation, 52-week
//! extremes, MA trend flags, and volume statistics.

use serde::{Deserialize, Serialize};

use super::AnalysisError;
use crate::data::PriceSeries;

/// Minimum bars required before any indicator is computed.
pub const MIN_BARS: usize = 50;

/// Trading days between the two endpoints of a trend comparison.
const TREND_LOOKBACK: usize = 20;

/// Bars in a trading year, bounding the 52-week window.
const TRADING_YEAR: usize = 252;

/// Window over which average volume is taken.
const VOLUME_WINDOW: usize = 50;

// ============================================================================
// Indicator Snapshot
// ============================================================================

/// Derived technical metrics for one symbol.
///
/// Prices are rounded to 2 decimals and percentages to 1, matching the
/// precision the criteria reasons are reported with. MA values fall
/// back to `price` when the history is too short for even the reduced
/// window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Latest close
    pub price: f64,
    /// 50-day simple moving average
    pub ma50: f64,
    /// 150-day simple moving average
    pub ma150: f64,
    /// 200-day simple moving average
    pub ma200: f64,
    /// Highest high over the trailing year
    pub week52_high: f64,
    /// Lowest low over the trailing year
    pub week52_low: f64,
    /// Percent offset from the 52-week high (negative when below it)
    pub from_high_pct: f64,
    /// Percent offset from the 52-week low (positive when above it)
    pub from_low_pct: f64,
    /// 50MA greater than its value 20 trading days earlier
    pub ma50_trending_up: bool,
    /// 150MA greater than its value 20 trading days earlier
    pub ma150_trending_up: bool,
    /// 200MA greater than its value 20 trading days earlier
    pub ma200_trending_up: bool,
    /// Percent offset of price vs the 50MA
    pub price_vs_ma50: f64,
    /// Percent offset of price vs the 150MA
    pub price_vs_ma150: f64,
    /// Percent offset of price vs the 200MA
    pub price_vs_ma200: f64,
    /// Latest bar volume
    pub volume: u64,
    /// Mean volume over the trailing 50 bars
    pub avg_volume: u64,
    /// volume / avg_volume (1.0 when avg_volume is zero)
    pub volume_ratio: f64,
}

// ============================================================================
// Computation
// ============================================================================

/// Derive the indicator snapshot for a series.
///
/// Requires at least [`MIN_BARS`] bars and a positive, finite latest
/// close; otherwise reports the shortfall instead of returning a
/// partially populated snapshot.
pub fn compute_indicators(series: &PriceSeries) -> Result<IndicatorSnapshot, AnalysisError> {
    if series.len() < MIN_BARS {
        return Err(AnalysisError::InsufficientData {
            got: series.len(),
            need: MIN_BARS,
        });
    }

    let closes = series.closes();
    let price = *closes.last().unwrap_or(&0.0);
    if !price.is_finite() || price <= 0.0 {
        return Err(AnalysisError::InvalidPrice(price));
    }

    // MAs degrade to a reduced window when history is short, and to the
    // price itself below the minimum-period floor.
    let ma50 = trailing_mean(&closes, 50, 25).unwrap_or(price);
    let ma150 = trailing_mean(&closes, 150, 75).unwrap_or(price);
    let ma200 = trailing_mean(&closes, 200, 100).unwrap_or(price);

    let ma50_trending_up = is_trending_up(&closes, 50, 25);
    let ma150_trending_up = is_trending_up(&closes, 150, 75);
    let ma200_trending_up = is_trending_up(&closes, 200, 100);

    // 52-week extremes over whatever history is available, capped at a
    // trading year.
    let window = TRADING_YEAR.min(series.len());
    let bars = &series.bars()[series.len() - window..];
    let week52_high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let week52_low = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);

    let from_high_pct = round1(pct_offset(price, week52_high));
    let from_low_pct = round1(pct_offset(price, week52_low));

    let volume = series.latest().map(|b| b.volume).unwrap_or(0);
    let vol_window = VOLUME_WINDOW.min(series.len());
    let vol_sum: u64 = series.bars()[series.len() - vol_window..]
        .iter()
        .map(|b| b.volume)
        .sum();
    let avg_volume = vol_sum / vol_window as u64;
    let volume_ratio = if avg_volume > 0 {
        round2(volume as f64 / avg_volume as f64)
    } else {
        1.0
    };

    Ok(IndicatorSnapshot {
        price: round2(price),
        ma50: round2(ma50),
        ma150: round2(ma150),
        ma200: round2(ma200),
        week52_high: round2(week52_high),
        week52_low: round2(week52_low),
        from_high_pct,
        from_low_pct,
        ma50_trending_up,
        ma150_trending_up,
        ma200_trending_up,
        price_vs_ma50: round1(pct_offset(price, ma50)),
        price_vs_ma150: round1(pct_offset(price, ma150)),
        price_vs_ma200: round1(pct_offset(price, ma200)),
        volume,
        avg_volume,
        volume_ratio,
    })
}

/// Mean over the trailing `window` values, shrunk to whatever is
/// available but no less than `min_periods`.
fn trailing_mean(values: &[f64], window: usize, min_periods: usize) -> Option<f64> {
    let take = window.min(values.len());
    if take < min_periods || take == 0 {
        return None;
    }
    let slice = &values[values.len() - take..];
    Some(slice.iter().sum::<f64>() / take as f64)
}

/// Whether the MA is higher now than it was [`TREND_LOOKBACK`] trading
/// days ago. Undefined endpoints make the flag `false`, never unknown.
fn is_trending_up(closes: &[f64], window: usize, min_periods: usize) -> bool {
    if closes.len() <= TREND_LOOKBACK {
        return false;
    }
    let recent = trailing_mean(closes, window, min_periods);
    let older = trailing_mean(&closes[..closes.len() - TREND_LOOKBACK], window, min_periods);

    match (recent, older) {
        (Some(r), Some(o)) => r > o,
        _ => false,
    }
}

/// Percent offset of `value` from `base`, zero when `base` is zero.
fn pct_offset(value: f64, base: f64) -> f64 {
    if base > 0.0 {
        (value - base) / base * 100.0
    } else {
        0.0
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// ============================================================================
// Tests
// ============================================================================
