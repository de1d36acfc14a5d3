//! Relative Strength rating engine.
//!
//! Blends a stock's price performance against the benchmark index over
//! four lookback windows (quarter, half year, three quarters, year),
//! with the most recent quarter weighted twice any other period, and
//! maps the result onto a 1-99 scale.

/// Lookback windows in trading days.
const PERIODS: [usize; 4] = [63, 126, 189, 252];

/// Weight per window; the most recent quarter dominates.
const WEIGHTS: [f64; 4] = [0.4, 0.2, 0.2, 0.2];

/// Rating returned when the computation fails closed.
pub const MIN_RATING: u8 = 1;

/// Rating returned when aligned history is shorter than one quarter.
pub const NEUTRAL_RATING: u8 = 50;

/// The criteria evaluator's passing threshold, exported for reporting.
pub const RS_THRESHOLD: u8 = 70;

use crate::data::PriceSeries;

/// Compute the RS rating for a stock against the benchmark.
///
/// The two series are aligned on their common trading dates first.
/// Zero overlap fails closed to [`MIN_RATING`]; less than a quarter of
/// overlap returns [`NEUTRAL_RATING`]. Periods longer than the aligned
/// history contribute zero rather than being skipped, which biases
/// incomplete histories toward the neutral band.
pub fn compute_rs_rating(stock: &PriceSeries, benchmark: &PriceSeries) -> u8 {
    let (stock_closes, bench_closes) = stock.align_closes(benchmark);

    if stock_closes.is_empty() {
        return MIN_RATING;
    }
    if stock_closes.len() < PERIODS[0] {
        return NEUTRAL_RATING;
    }

    let mut total = 0.0;
    for (&period, &weight) in PERIODS.iter().zip(WEIGHTS.iter()) {
        let contribution =
            period_relative_performance(&stock_closes, &bench_closes, period).unwrap_or(0.0);
        total += contribution * weight;
    }

    scale_rating(total)
}

/// Relative performance over one window: stock return minus benchmark
/// return, both in percent. `None` when the window exceeds the aligned
/// history or a start price is unusable.
fn period_relative_performance(stock: &[f64], benchmark: &[f64], period: usize) -> Option<f64> {
    if stock.len() < period || benchmark.len() < period {
        return None;
    }

    let stock_return = pct_return(stock[stock.len() - period], stock[stock.len() - 1])?;
    let bench_return = pct_return(benchmark[benchmark.len() - period], benchmark[benchmark.len() - 1])?;

    Some(stock_return - bench_return)
}

fn pct_return(start: f64, end: f64) -> Option<f64> {
    if !start.is_finite() || !end.is_finite() || start <= 0.0 {
        return None;
    }
    Some((end - start) / start * 100.0)
}

/// Map a weighted relative performance onto the 1-99 rating scale.
///
/// Piecewise-linear bands with integer truncation toward each band's
/// floor:
///
/// | relative performance | band  |
/// |----------------------|-------|
/// | >= 50                | 90-99 |
/// | 20 to 50             | 80-89 |
/// | 5 to 20              | 70-79 |
/// | -5 to 5              | 50-69 |
/// | < -5                 | 1-49  |
fn scale_rating(relative_performance: f64) -> u8 {
    if !relative_performance.is_finite() {
        return MIN_RATING;
    }

    let rating: i64 = if relative_performance >= 50.0 {
        // exceptional, capped at 100% excess
        let excess = (relative_performance - 50.0).min(50.0);
        90 + (excess / 50.0 * 9.0) as i64
    } else if relative_performance >= 20.0 {
        80 + ((relative_performance - 20.0) / 30.0 * 9.0) as i64
    } else if relative_performance >= 5.0 {
        70 + ((relative_performance - 5.0) / 15.0 * 9.0) as i64
    } else if relative_performance >= -5.0 {
        50 + ((relative_performance + 5.0) / 10.0 * 19.0) as i64
    } else {
        // underperformance, capped at -50%
        let excess = (relative_performance + 5.0).abs().min(45.0);
        49 - (excess / 45.0 * 48.0) as i64
    };

    rating.clamp(1, 99) as u8
}

// ============================================================================
// Tests
// ============================================================================
