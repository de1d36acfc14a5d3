//! Minervini trend-template evaluation.
//!
//! Applies the seven pass/fail rules to an indicator snapshot plus the
//! RS rating and produces a full verdict: per-criterion results keyed
//! by a stable name, ordered failure reasons, and a score out of
//! [`MAX_SCORE`].

use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

use super::rs_rating::RS_THRESHOLD;
use super::IndicatorSnapshot;

/// Number of criteria in the template.
pub const MAX_SCORE: u8 = 7;

/// Minimum percent above the 52-week low (inclusive).
const LOW_THRESHOLD: f64 = 30.0;

/// Maximum percent below the 52-week high (inclusive).
const HIGH_THRESHOLD: f64 = 25.0;

// ============================================================================
// Verdict Types
// ============================================================================

/// Outcome of a single criterion.
#[derive(Debug, Clone, Serialize)]
pub struct CriterionResult {
    /// Whether the rule held
    pub passes: bool,
    /// Human-readable failure reason, empty on a pass
    pub reason: String,
    /// The values the rule compared
    pub details: serde_json::Value,
}

impl CriterionResult {
    fn pass(details: serde_json::Value) -> Self {
        Self {
            passes: true,
            reason: String::new(),
            details,
        }
    }

    fn fail(reason: String, details: serde_json::Value) -> Self {
        Self {
            passes: false,
            reason,
            details,
        }
    }
}

/// Full template verdict for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    /// All seven criteria held
    pub passed: bool,
    /// Number of criteria that held
    pub score: u8,
    /// Always [`MAX_SCORE`]
    pub max_score: u8,
    /// Failure reasons in criterion order (1 through 7)
    pub fail_reasons: Vec<String>,
    /// Per-criterion results, keyed by criterion name
    pub details: BTreeMap<String, CriterionResult>,
    /// One-line human-readable summary
    pub summary: String,
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluate the seven trend-template criteria.
///
/// Total: the rules are applied in their canonical order and every one
/// is evaluated even after a failure, so the verdict always carries all
/// seven results.
pub fn evaluate(snapshot: &IndicatorSnapshot, rs_rating: u8) -> Verdict {
    let checks: [(&str, CriterionResult); 7] = [
        ("price_above_mas", check_price_above_mas(snapshot)),
        ("ma_150_above_200", check_ma_150_above_200(snapshot)),
        ("ma_200_trending_up", check_ma_200_trending_up(snapshot)),
        ("ma_50_above_others", check_ma_50_above_others(snapshot)),
        ("above_52w_low", check_above_52w_low(snapshot)),
        ("near_52w_high", check_near_52w_high(snapshot)),
        ("rs_rating_strong", check_rs_rating_strong(rs_rating)),
    ];

    let mut details = BTreeMap::new();
    let mut fail_reasons = Vec::new();
    let mut score: u8 = 0;

    for (key, result) in checks {
        if result.passes {
            score += 1;
        } else {
            fail_reasons.push(result.reason.clone());
        }
        details.insert(key.to_string(), result);
    }

    let passed = score == MAX_SCORE;
    let summary = if passed {
        "All Minervini criteria passed - Perfect trend template".to_string()
    } else {
        format!("{}/{} criteria passed", score, MAX_SCORE)
    };

    Verdict {
        passed,
        score,
        max_score: MAX_SCORE,
        fail_reasons,
        details,
        summary,
    }
}

/// Criterion 1: price above both the 150MA and the 200MA.
fn check_price_above_mas(s: &IndicatorSnapshot) -> CriterionResult {
    let above_150 = s.price > s.ma150;
    let above_200 = s.price > s.ma200;
    let details = json!({
        "price": s.price,
        "ma_150": s.ma150,
        "ma_200": s.ma200,
        "above_150": above_150,
        "above_200": above_200,
    });

    if above_150 && above_200 {
        CriterionResult::pass(details)
    } else {
        let reason = if !above_150 && !above_200 {
            format!(
                "Price below both 150MA (${:.2}) & 200MA (${:.2})",
                s.ma150, s.ma200
            )
        } else if !above_150 {
            format!("Price below 150MA (${:.2})", s.ma150)
        } else {
            format!("Price below 200MA (${:.2})", s.ma200)
        };
        CriterionResult::fail(reason, details)
    }
}

/// Criterion 2: 150MA above the 200MA.
fn check_ma_150_above_200(s: &IndicatorSnapshot) -> CriterionResult {
    let details = json!({
        "ma_150": s.ma150,
        "ma_200": s.ma200,
        "difference": s.ma150 - s.ma200,
    });

    if s.ma150 > s.ma200 {
        CriterionResult::pass(details)
    } else {
        CriterionResult::fail(
            format!("150MA (${:.2}) below 200MA (${:.2})", s.ma150, s.ma200),
            details,
        )
    }
}

/// Criterion 3: 200MA higher than it was a month of trading days ago.
fn check_ma_200_trending_up(s: &IndicatorSnapshot) -> CriterionResult {
    let details = json!({ "trending_up": s.ma200_trending_up });

    if s.ma200_trending_up {
        CriterionResult::pass(details)
    } else {
        CriterionResult::fail("200MA not trending up".to_string(), details)
    }
}

/// Criterion 4: 50MA above both the 150MA and the 200MA.
fn check_ma_50_above_others(s: &IndicatorSnapshot) -> CriterionResult {
    let above_150 = s.ma50 > s.ma150;
    let above_200 = s.ma50 > s.ma200;
    let details = json!({
        "ma_50": s.ma50,
        "ma_150": s.ma150,
        "ma_200": s.ma200,
        "above_150": above_150,
        "above_200": above_200,
    });

    if above_150 && above_200 {
        CriterionResult::pass(details)
    } else {
        let reason = if !above_150 && !above_200 {
            "50MA below both 150MA & 200MA".to_string()
        } else if !above_150 {
            format!("50MA (${:.2}) below 150MA (${:.2})", s.ma50, s.ma150)
        } else {
            format!("50MA (${:.2}) below 200MA (${:.2})", s.ma50, s.ma200)
        };
        CriterionResult::fail(reason, details)
    }
}

/// Criterion 5: at least 30% above the 52-week low.
fn check_above_52w_low(s: &IndicatorSnapshot) -> CriterionResult {
    let details = json!({
        "from_low_pct": s.from_low_pct,
        "threshold": LOW_THRESHOLD,
    });

    if s.from_low_pct >= LOW_THRESHOLD {
        CriterionResult::pass(details)
    } else {
        CriterionResult::fail(
            format!(
                "Only {:.1}% above 52W low (need >=30%)",
                s.from_low_pct
            ),
            details,
        )
    }
}

/// Criterion 6: within 25% of the 52-week high.
fn check_near_52w_high(s: &IndicatorSnapshot) -> CriterionResult {
    let details = json!({
        "from_high_pct": s.from_high_pct,
        "threshold": HIGH_THRESHOLD,
    });

    if s.from_high_pct.abs() <= HIGH_THRESHOLD {
        CriterionResult::pass(details)
    } else {
        CriterionResult::fail(
            format!(
                "{:.1}% below 52W high (need <=25%)",
                s.from_high_pct.abs()
            ),
            details,
        )
    }
}

/// Criterion 7: RS rating at or above the strength threshold.
fn check_rs_rating_strong(rs_rating: u8) -> CriterionResult {
    let details = json!({
        "rs_rating": rs_rating,
        "threshold": RS_THRESHOLD,
    });

    if rs_rating >= RS_THRESHOLD {
        CriterionResult::pass(details)
    } else {
        CriterionResult::fail(
            format!("RS Rating {} below {}", rs_rating, RS_THRESHOLD),
            details,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
