//! HTTP routes for the screener service.

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::screener::ScreenOutcome;
use crate::ScreenerState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct SampleSymbolsResponse {
    pub symbols: Vec<String>,
    pub count: usize,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct ScreenRequest {
    #[serde(default)]
    pub symbols: Vec<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: "hunter-screener".to_string(),
    })
}

/// Curated symbol list for quick screening runs
pub async fn sample_symbols(
    State(state): State<Arc<ScreenerState>>,
) -> Result<Json<SampleSymbolsResponse>, StatusCode> {
    let symbols = state.config.screener.sample_symbols.clone();
    let count = symbols.len();

    Ok(Json(SampleSymbolsResponse {
        symbols,
        count,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// Screen a batch of symbols against the trend template.
///
/// Symbols are trimmed and uppercased before analysis; an empty batch
/// after cleanup is a client error.
pub async fn screen(
    State(state): State<Arc<ScreenerState>>,
    Json(request): Json<ScreenRequest>,
) -> Result<Json<ScreenOutcome>, StatusCode> {
    let symbols: Vec<String> = request
        .symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if symbols.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    info!(count = symbols.len(), "Screen request received");

    let outcome = state.engine.screen(&symbols).await;
    Ok(Json(outcome))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_service_name() {
        let Json(response) = health().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, "hunter-screener");
        assert!(!response.version.is_empty());
    }

    #[test]
    fn test_screen_request_defaults_to_empty() {
        let request: ScreenRequest = serde_json::from_str("{}").unwrap();
        assert!(request.symbols.is_empty());
    }

    #[tokio::test]
    async fn test_screen_rejects_empty_batch() {
        let state = Arc::new(crate::ScreenerState::new(
            hunter_common::Config::default(),
        ));

        // whitespace-only entries are dropped during cleanup
        let request = ScreenRequest {
            symbols: vec!["  ".to_string(), String::new()],
        };
        let result = screen(State(state), Json(request)).await;
        assert!(matches!(result, Err(StatusCode::BAD_REQUEST)));
    }
}
