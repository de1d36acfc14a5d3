//! Screening pipeline: per-symbol analysis and batch orchestration.

mod engine;

pub use engine::{ScreenOutcome, ScreenSummary, ScreenerEngine, SymbolMetrics, SymbolReport};
