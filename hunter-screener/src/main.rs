//! Stock Hunter - Minervini trend-template screening service.
//!
//! Screens stocks against the 8-point trend template with RS rating
//! over Yahoo Finance daily history.

use anyhow::Result;
use hunter_common::config::Config;
use hunter_common::logging::init_logging;
use hunter_screener::ScreenerService;

#[tokio::main]
async fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();

    // Load configuration (file, then environment overrides)
    let config = Config::load_with_env()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Stock Hunter v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        benchmark = %config.screener.benchmark.symbol,
        max_workers = config.screener.max_workers,
        "Screener configured"
    );

    let service = ScreenerService::new(config);

    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );

    service.start().await
}
