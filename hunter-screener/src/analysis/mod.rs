//! Analysis core: technical indicators, RS rating, and the Minervini
//! trend-template evaluation.
//!
//! All three engines are pure functions of their inputs. Nothing in
//! this module performs IO, and no error escapes past the documented
//! `Result` boundaries: the RS rating fails closed to its minimum and
//! the evaluator always returns a well-formed verdict.

mod criteria;
mod indicators;
mod rs_rating;

pub use criteria::{evaluate, CriterionResult, Verdict, MAX_SCORE};
pub use indicators::{compute_indicators, IndicatorSnapshot, MIN_BARS};
pub use rs_rating::{compute_rs_rating, MIN_RATING, NEUTRAL_RATING, RS_THRESHOLD};

use thiserror::Error;

/// Errors from indicator derivation.
///
/// These never cross into the criteria evaluator; the orchestrator
/// converts them into failed symbol reports.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// Fewer bars than the minimum indicator window requires
    #[error("Insufficient data: {got} bars, need at least {need}")]
    InsufficientData { got: usize, need: usize },

    /// The latest close is non-positive or non-finite. A zero price is
    /// treated as missing data, never as a legitimate quote.
    #[error("Invalid latest close: {0}")]
    InvalidPrice(f64),
}
