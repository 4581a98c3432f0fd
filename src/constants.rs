//! Constants for the DataPulse refresh core
//!
//! Compile-time defaults. Everything a user may want to change is mirrored
//! in [`crate::config::DashboardConfig`] and only falls back to these values.

/// Default backend proxy base URL; every backend router lives under `/api`
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// HTTP request timeout for every backend call (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Seconds the refresh button stays disabled after a manual refresh
pub const MANUAL_COOLDOWN_SECS: u32 = 5;

/// Period of both the cooldown tick and the auto-refresh countdown tick
pub const TICK_INTERVAL_MS: u64 = 1000;

/// How long before a source's data is reported as stale by the health check
pub const STALE_THRESHOLD_SECS: u64 = 300;

/// Number of crypto assets requested from the backend before symbol filtering
pub const DEFAULT_CRYPTO_TOP_N: u32 = 50;

/// Crypto symbols shown by default
pub const DEFAULT_CRYPTO_SYMBOLS: &[&str] = &["BTC", "ETH"];

/// Stock symbols shown by default
pub const DEFAULT_STOCK_SYMBOLS: &[&str] = &["AAPL", "TSLA", "GOOGL", "MSFT"];

/// Upper bound on stock quotes fetched per refresh cycle
pub const MAX_STOCK_SYMBOLS: usize = 8;

/// Default weather city
pub const DEFAULT_WEATHER_CITY: &str = "San Francisco";

/// Default cap on news headlines kept per refresh
pub const DEFAULT_MAX_ARTICLES: usize = 4;

/// Backend paths
pub const CRYPTO_ENDPOINT: &str = "/crypto/";
pub const STOCKS_ENDPOINT: &str = "/stocks/";
pub const WEATHER_ENDPOINT: &str = "/weather/";
pub const NEWS_ENDPOINT: &str = "/news/";
pub const EXCHANGE_RATE_ENDPOINT: &str = "/exchange-rate/";
pub const REFRESH_ENDPOINT: &str = "/refresh/";
pub const HEALTH_ENDPOINT: &str = "/health/";
pub const STOCK_HISTORY_ENDPOINT: &str = "/stocks/historical/";
pub const CRYPTO_HISTORY_ENDPOINT: &str = "/crypto/historical/";

/// Environment variable names for configuration overrides
pub const ENV_API_URL: &str = "DATAPULSE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "DATAPULSE_TIMEOUT_SECS";
pub const ENV_CITY: &str = "DATAPULSE_CITY";
pub const ENV_STOCKS: &str = "DATAPULSE_STOCKS";
pub const ENV_CRYPTO: &str = "DATAPULSE_CRYPTO";

/// User agent for HTTP requests
pub const USER_AGENT: &str = concat!("datapulse/", env!("CARGO_PKG_VERSION"));
