//! Price history provider abstraction.
//!
//! Defines the `PriceHistoryProvider` trait the screener consumes and
//! the static symbol remap applied before any provider call. Retry and
//! backoff are deliberately not modeled here; the orchestrator converts
//! provider failures into per-symbol failure reports.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use thiserror::Error;

use super::PriceSeries;

// ============================================================================
// Symbol Mapping
// ============================================================================

/// Remap table for tickers whose provider spelling differs from the
/// common one (share classes use '-' on Yahoo, and Square renamed to
/// Block).
static SYMBOL_REMAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("BRK.A", "BRK-A"),
        ("BRK.B", "BRK-B"),
        ("BF.B", "BF-B"),
        ("SQ", "BLOCK"),
    ])
});

/// Translate a user-facing symbol into the provider's spelling.
///
/// Results are keyed by the original symbol; only the outgoing request
/// uses the remapped form.
pub fn provider_symbol(symbol: &str) -> &str {
    SYMBOL_REMAP.get(symbol).copied().unwrap_or(symbol)
}

// ============================================================================
// Provider Error
// ============================================================================

/// Errors a price history provider can surface.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The symbol has no data at this provider
    #[error("No data for symbol: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Rate limited{}", .retry_after_secs.map(|s| format!(", retry after {}s", s)).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    /// Provider responded but the payload could not be interpreted
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Provider is temporarily unavailable
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Check if the error is transient (an upstream retry could help).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited { .. } | Self::Unavailable(_)
        )
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Trait for daily price history providers.
///
/// Implementations fetch raw OHLCV history; they do not compute
/// indicators and they do not retry. The returned series carries the
/// symbol as requested (already remapped by the caller).
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Provider name for logging (e.g. "yahoo")
    fn name(&self) -> &'static str;

    /// Fetch roughly `lookback_days` calendar days of daily bars for a
    /// symbol, oldest first.
    async fn fetch_daily(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, ProviderError>;
}

// ============================================================================
// Tests
// ============================================================================
