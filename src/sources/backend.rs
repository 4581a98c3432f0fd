//! Production backend: the DataPulse proxy over HTTP

use async_trait::async_trait;

use super::{crypto, exchange_rate, news, stocks, weather};
use crate::{
    api::DashboardApi,
    client::ApiClient,
    config::{ApiConfig, WeatherUnit},
    constants::{HEALTH_ENDPOINT, REFRESH_ENDPOINT},
    error::FetchError,
    types::{CryptoQuote, ExchangeRates, NewsHeadline, StockQuote, WeatherReport},
};

/// HTTP implementation of [`DashboardApi`]
#[derive(Clone)]
pub struct BackendApi {
    client: ApiClient,
}

impl BackendApi {
    /// Creates a backend bound to the configured base URL
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        Ok(Self::with_client(ApiClient::new(config)?))
    }

    pub fn with_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Backend health report (`GET /health/`)
    pub async fn health(&self) -> Result<serde_json::Value, FetchError> {
        self.client.get_json(HEALTH_ENDPOINT, &[]).await
    }

    /// Chart data for a crypto asset
    pub async fn crypto_history(
        &self,
        symbol: &str,
        days: &str,
    ) -> Result<serde_json::Value, FetchError> {
        crypto::fetch_history(&self.client, symbol, days).await
    }

    /// Chart data for a stock
    pub async fn stock_history(
        &self,
        symbol: &str,
        period: &str,
    ) -> Result<serde_json::Value, FetchError> {
        stocks::fetch_history(&self.client, symbol, period).await
    }
}

#[async_trait]
impl DashboardApi for BackendApi {
    async fn fetch_crypto(&self, top_n: u32) -> Result<Vec<CryptoQuote>, FetchError> {
        crypto::fetch_prices(&self.client, top_n).await
    }

    async fn fetch_stock(&self, symbol: &str) -> Result<StockQuote, FetchError> {
        stocks::fetch_quote(&self.client, symbol).await
    }

    async fn fetch_weather(
        &self,
        city: &str,
        unit: WeatherUnit,
    ) -> Result<WeatherReport, FetchError> {
        weather::fetch_report(&self.client, city, unit).await
    }

    async fn fetch_news(&self) -> Result<Vec<NewsHeadline>, FetchError> {
        news::fetch_headlines(&self.client).await
    }

    async fn fetch_exchange_rates(&self) -> Result<ExchangeRates, FetchError> {
        exchange_rate::fetch_rates(&self.client).await
    }

    async fn refresh_backend(&self) -> Result<serde_json::Value, FetchError> {
        self.client.post_json(REFRESH_ENDPOINT).await
    }

    fn api_name(&self) -> &'static str {
        "datapulse-backend"
    }
}
