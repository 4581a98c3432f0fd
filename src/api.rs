//! Backend abstraction for fetching dashboard data

use async_trait::async_trait;

use crate::{
    config::WeatherUnit,
    error::FetchError,
    types::{CryptoQuote, ExchangeRates, NewsHeadline, StockQuote, WeatherReport},
};

/// Trait for the backend proxy serving the dashboard
///
/// The production implementation is [`crate::sources::BackendApi`]; tests
/// script one with [`mock::MockApi`].
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Fetches the top `top_n` crypto assets by market cap
    async fn fetch_crypto(&self, top_n: u32) -> Result<Vec<CryptoQuote>, FetchError>;

    /// Fetches one stock quote
    async fn fetch_stock(&self, symbol: &str) -> Result<StockQuote, FetchError>;

    /// Fetches current weather for a city
    async fn fetch_weather(&self, city: &str, unit: WeatherUnit)
        -> Result<WeatherReport, FetchError>;

    /// Fetches the latest headlines
    async fn fetch_news(&self) -> Result<Vec<NewsHeadline>, FetchError>;

    /// Fetches currency-pair exchange rates
    async fn fetch_exchange_rates(&self) -> Result<ExchangeRates, FetchError>;

    /// Asks the backend to drop its caches and refetch upstream
    async fn refresh_backend(&self) -> Result<serde_json::Value, FetchError>;

    /// Returns the name of this backend, for logs and health details
    fn api_name(&self) -> &'static str;
}
