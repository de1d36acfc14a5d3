//! Configuration management for the Stock Hunter screener.
//!
//! Configuration lives in a single JSON file at `~/.stock-hunter/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Explicit config file values
//! 2. Environment variables (HUNTER_* prefix)
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `HUNTER_CONFIG` → alternate config file path
//! - `HUNTER_BIND_ADDRESS` → network.bind
//! - `HUNTER_PORT` → network.port
//! - `HUNTER_LOG_LEVEL` → observability.log_level
//! - `HUNTER_BENCHMARK_SYMBOL` → screener.benchmark.symbol

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".stock-hunter"),
        |dirs| dirs.home_dir().join(".stock-hunter"),
    )
}

/// Get the configuration file path, honoring `HUNTER_CONFIG`.
pub fn config_path() -> PathBuf {
    std::env::var("HUNTER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("config.json"))
}

// ============================================================================
// Network Configuration
// ============================================================================

/// Bind address and port for the HTTP surface.
///
/// Default is `127.0.0.1` (local only). Set bind to `0.0.0.0` to allow
/// remote access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Bind address for the service.
    #[serde(default = "default_bind_address")]
    pub bind: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
            port: default_port(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    4480
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format: "json" for structured JSON, "pretty" for human-readable
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Screener Configuration
// ============================================================================

/// Configuration for the screening pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Maximum number of symbols analyzed concurrently.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Per-symbol analysis timeout in seconds. A symbol that exceeds it
    /// is reported as failed; the batch keeps going.
    #[serde(default = "default_symbol_timeout_secs")]
    pub symbol_timeout_secs: u64,

    /// Calendar days of daily history requested per stock. 400 days
    /// leaves headroom above the 252 trading days the analysis needs.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Benchmark index settings.
    #[serde(default)]
    pub benchmark: BenchmarkConfig,

    /// Symbols returned by the sample endpoint for quick testing.
    #[serde(default = "default_sample_symbols")]
    pub sample_symbols: Vec<String>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            symbol_timeout_secs: default_symbol_timeout_secs(),
            lookback_days: default_lookback_days(),
            benchmark: BenchmarkConfig::default(),
            sample_symbols: default_sample_symbols(),
        }
    }
}

fn default_max_workers() -> usize {
    4
}

fn default_symbol_timeout_secs() -> u64 {
    60
}

fn default_lookback_days() -> u32 {
    400
}

fn default_sample_symbols() -> Vec<String> {
    [
        "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "NFLX", "CRM", "ADBE", "AMD",
        "QCOM", "AVGO", "ORCL", "UBER", "DIS", "JPM", "WMT",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Benchmark index configuration for RS rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Benchmark symbol (S&P 500 index by default).
    #[serde(default = "default_benchmark_symbol")]
    pub symbol: String,

    /// Calendar days of benchmark history. Longer than the stock
    /// lookback so date alignment always has slack.
    #[serde(default = "default_benchmark_lookback_days")]
    pub lookback_days: u32,

    /// Benchmark cache time-to-live in seconds.
    #[serde(default = "default_benchmark_cache_ttl_secs")]
    pub cache_ttl_secs: i64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            symbol: default_benchmark_symbol(),
            lookback_days: default_benchmark_lookback_days(),
            cache_ttl_secs: default_benchmark_cache_ttl_secs(),
        }
    }
}

fn default_benchmark_symbol() -> String {
    "^GSPC".into()
}

fn default_benchmark_lookback_days() -> u32 {
    500
}

fn default_benchmark_cache_ttl_secs() -> i64 {
    3600
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration for the screener service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Network settings
    #[serde(default)]
    pub network: NetworkConfig,

    /// Logging settings
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Screening pipeline settings
    #[serde(default)]
    pub screener: ScreenerConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to
    /// defaults when no file exists.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable fallbacks.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("HUNTER_BIND_ADDRESS") {
            self.network.bind = bind;
        }
        if let Ok(port) = std::env::var("HUNTER_PORT") {
            if let Ok(p) = port.parse() {
                self.network.port = p;
            }
        }
        if let Ok(level) = std::env::var("HUNTER_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(symbol) = std::env::var("HUNTER_BENCHMARK_SYMBOL") {
            self.screener.benchmark.symbol = symbol;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
