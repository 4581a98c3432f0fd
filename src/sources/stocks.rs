//! Stock quotes: `GET /stocks/?symbol=S`

use crate::{
    client::ApiClient,
    constants::{STOCKS_ENDPOINT, STOCK_HISTORY_ENDPOINT},
    error::FetchError,
    types::StockQuote,
};

pub async fn fetch_quote(client: &ApiClient, symbol: &str) -> Result<StockQuote, FetchError> {
    let quote: StockQuote = client
        .get_json(STOCKS_ENDPOINT, &[("symbol", symbol.to_string())])
        .await?;
    validate(quote)
}

/// Fetches chart data for one symbol; `period` is one of 1H, 1D, 1W, 1M, 3M, 1Y
pub async fn fetch_history(
    client: &ApiClient,
    symbol: &str,
    period: &str,
) -> Result<serde_json::Value, FetchError> {
    let path = format!("{}{}", STOCK_HISTORY_ENDPOINT, urlencoding::encode(symbol));
    client.get_json(&path, &[("period", period.to_string())]).await
}

/// A zero or negative price means the upstream had nothing for the symbol
fn validate(quote: StockQuote) -> Result<StockQuote, FetchError> {
    if quote.price > 0.0 && quote.price.is_finite() {
        Ok(quote)
    } else {
        Err(FetchError::invalid_response(format!(
            "No price for {}",
            quote.symbol
        )))
    }
}
