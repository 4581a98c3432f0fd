//! Dashboard configuration
//!
//! Loaded from a TOML file with environment variable overrides. The
//! coordinator receives it as an explicit handle at construction time and
//! re-reads it at the start of every refresh cycle.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auto_refresh::RefreshInterval;
use crate::constants::{
    DEFAULT_API_URL, DEFAULT_CRYPTO_SYMBOLS, DEFAULT_CRYPTO_TOP_N, DEFAULT_MAX_ARTICLES,
    DEFAULT_STOCK_SYMBOLS, DEFAULT_WEATHER_CITY, ENV_API_URL, ENV_CITY, ENV_CRYPTO, ENV_STOCKS,
    ENV_TIMEOUT_SECS, MAX_STOCK_SYMBOLS, REQUEST_TIMEOUT_SECS,
};
use crate::error::ConfigError;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub crypto: CryptoConfig,

    #[serde(default)]
    pub stocks: StocksConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub news: NewsConfig,

    #[serde(default)]
    pub auto_refresh: AutoRefreshConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend proxy connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> u64 {
    REQUEST_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoConfig {
    #[serde(default = "default_crypto_symbols")]
    pub symbols: Vec<String>,

    #[serde(default = "default_top_n")]
    pub top_n: u32,
}

fn default_crypto_symbols() -> Vec<String> {
    DEFAULT_CRYPTO_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

fn default_top_n() -> u32 {
    DEFAULT_CRYPTO_TOP_N
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            symbols: default_crypto_symbols(),
            top_n: default_top_n(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StocksConfig {
    #[serde(default = "default_stock_symbols")]
    pub symbols: Vec<String>,
}

fn default_stock_symbols() -> Vec<String> {
    DEFAULT_STOCK_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

impl Default for StocksConfig {
    fn default() -> Self {
        Self {
            symbols: default_stock_symbols(),
        }
    }
}

impl StocksConfig {
    /// Symbols actually requested in a refresh cycle
    pub fn active_symbols(&self) -> &[String] {
        &self.symbols[..self.symbols.len().min(MAX_STOCK_SYMBOLS)]
    }
}

/// Temperature unit accepted by the weather endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeatherUnit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl WeatherUnit {
    /// Query parameter value
    pub fn as_param(&self) -> &'static str {
        match self {
            WeatherUnit::Celsius => "C",
            WeatherUnit::Fahrenheit => "F",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_city")]
    pub city: String,

    #[serde(default)]
    pub unit: WeatherUnit,
}

fn default_city() -> String {
    DEFAULT_WEATHER_CITY.to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
            unit: WeatherUnit::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
}

fn default_max_articles() -> usize {
    DEFAULT_MAX_ARTICLES
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            max_articles: default_max_articles(),
        }
    }
}

/// Initial auto-refresh preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoRefreshConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, rename = "interval_secs")]
    pub interval: RefreshInterval,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: DashboardConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when no file exists,
    /// then apply environment overrides and validate
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);

        let mut config = match path {
            Some(p) if p.exists() => {
                tracing::info!(path = %p.display(), "Loading configuration");
                Self::load(&p)?
            }
            _ => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Default config file location (`<config dir>/datapulse/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("datapulse").join("config.toml"))
    }

    /// Apply `DATAPULSE_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            match timeout.parse() {
                Ok(secs) => self.api.request_timeout_secs = secs,
                Err(_) => tracing::warn!(value = %timeout, "Ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }
        if let Some(city) = lookup(ENV_CITY) {
            self.weather.city = city;
        }
        if let Some(stocks) = lookup(ENV_STOCKS) {
            self.stocks.symbols = split_symbols(&stocks);
        }
        if let Some(crypto) = lookup(ENV_CRYPTO) {
            self.crypto.symbols = split_symbols(&crypto);
        }
    }

    /// Reject settings no refresh cycle could work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("api.base_url must not be empty"));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "api.request_timeout_secs must be greater than zero",
            ));
        }
        if self.weather.city.trim().is_empty() {
            return Err(ConfigError::invalid("weather.city must not be empty"));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::invalid(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                self.logging.format
            )));
        }
        Ok(())
    }
}

fn split_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert!(config.api.base_url.ends_with("/api"));
        assert_eq!(config.api.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.crypto.symbols, vec!["BTC", "ETH"]);
        assert_eq!(config.stocks.symbols.len(), 4);
        assert_eq!(config.weather.unit, WeatherUnit::Celsius);
        assert!(!config.auto_refresh.enabled);
        assert_eq!(config.auto_refresh.interval, RefreshInterval::Secs30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "http://backend:9000"

[weather]
city = "Lisbon"
unit = "F"

[auto_refresh]
enabled = true
interval_secs = 60
"#
        )
        .unwrap();

        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://backend:9000");
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.weather.city, "Lisbon");
        assert_eq!(config.weather.unit, WeatherUnit::Fahrenheit);
        assert!(config.auto_refresh.enabled);
        assert_eq!(config.auto_refresh.interval, RefreshInterval::Secs60);
        assert_eq!(config.crypto.top_n, 50);
    }

    #[test]
    fn test_unsupported_interval_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[auto_refresh]\ninterval_secs = 45").unwrap();

        let err = DashboardConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DashboardConfig::load(Path::new("/nonexistent/datapulse.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, "http://override"),
            (ENV_TIMEOUT_SECS, "3"),
            (ENV_STOCKS, "nvda, amd,,"),
        ]
        .into_iter()
        .collect();

        let mut config = DashboardConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://override");
        assert_eq!(config.api.request_timeout_secs, 3);
        assert_eq!(config.stocks.symbols, vec!["NVDA", "AMD"]);
        assert_eq!(config.crypto.symbols, vec!["BTC", "ETH"]);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = DashboardConfig::default();
        config.api.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_active_symbols_capped() {
        let stocks = StocksConfig {
            symbols: (0..12).map(|i| format!("S{i}")).collect(),
        };
        assert_eq!(stocks.active_symbols().len(), MAX_STOCK_SYMBOLS);
    }
}
