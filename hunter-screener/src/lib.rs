//! Stock Hunter screener library.
//!
//! Implements Mark Minervini's trend-template screen as an HTTP
//! service:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                hunter-screener (:4480)                   │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌─────────────┐   ┌────────────────┐   │
//! │  │  Data      │   │  Analysis   │   │  Screener      │   │
//! │  │  (Yahoo,   │──▶│  (MAs, RS,  │──▶│  (batch pool,  │   │
//! │  │  cache)    │   │  criteria)  │   │  reports)      │   │
//! │  └────────────┘   └─────────────┘   └────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The analysis layer is pure; all IO sits in `data`, and the engine in
//! `screener` ties the two together per symbol.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod data;
pub mod routes;
pub mod screener;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use hunter_common::config::Config;

use crate::data::YahooAdapter;
use crate::screener::ScreenerEngine;

/// Shared service state
pub struct ScreenerState {
    /// Configuration
    pub config: Config,
    /// Screening engine
    pub engine: Arc<ScreenerEngine>,
}

impl ScreenerState {
    /// Create service state with the Yahoo provider.
    pub fn new(config: Config) -> Self {
        let provider = Arc::new(YahooAdapter::new());
        let engine = Arc::new(ScreenerEngine::new(provider, config.screener.clone()));

        Self { config, engine }
    }
}

/// Main screener service
pub struct ScreenerService {
    state: Arc<ScreenerState>,
}

impl ScreenerService {
    /// Create a new screener service
    pub fn new(config: Config) -> Self {
        let state = Arc::new(ScreenerState::new(config));
        Self { state }
    }

    /// Build the HTTP router over the given state.
    pub fn router(state: Arc<ScreenerState>) -> Router {
        // The request timeout sits above the engine's own per-symbol
        // timeout so a full batch can finish under it.
        let request_timeout =
            Duration::from_secs(state.config.screener.symbol_timeout_secs.saturating_mul(2));

        Router::new()
            .route("/health", get(routes::health))
            .route("/api/v1/symbols/sample", get(routes::sample_symbols))
            .route("/api/v1/screen", post(routes::screen))
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::new(request_timeout))
            .with_state(state)
    }

    /// Start the screener service
    pub async fn start(self) -> Result<()> {
        let host = self.state.config.network.bind.clone();
        let port = self.state.config.network.port;

        let app = Self::router(self.state.clone());

        // Warm the benchmark cache in the background; a failure here
        // only means the first batch fetches it itself.
        let warm_state = self.state.clone();
        tokio::spawn(async move {
            if let Err(e) = warm_state.engine.warm_up().await {
                tracing::warn!(error = %e, "Benchmark warm-up failed");
            }
        });

        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        tracing::info!(address = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
