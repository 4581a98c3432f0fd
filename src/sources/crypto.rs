//! Crypto prices: `GET /crypto/?top_n=N`

use crate::{
    client::ApiClient,
    constants::{CRYPTO_ENDPOINT, CRYPTO_HISTORY_ENDPOINT},
    error::FetchError,
    types::CryptoQuote,
};

/// Fetches the top `top_n` assets
pub async fn fetch_prices(client: &ApiClient, top_n: u32) -> Result<Vec<CryptoQuote>, FetchError> {
    client
        .get_json(CRYPTO_ENDPOINT, &[("top_n", top_n.to_string())])
        .await
}

/// Fetches chart data for one asset over the last `days` days
pub async fn fetch_history(
    client: &ApiClient,
    symbol: &str,
    days: &str,
) -> Result<serde_json::Value, FetchError> {
    let path = format!("{}{}", CRYPTO_HISTORY_ENDPOINT, urlencoding::encode(symbol));
    client.get_json(&path, &[("days", days.to_string())]).await
}

/// Keeps the quotes whose symbol is configured, in backend order
pub fn select_symbols(quotes: Vec<CryptoQuote>, symbols: &[String]) -> Vec<CryptoQuote> {
    quotes
        .into_iter()
        .filter(|q| symbols.iter().any(|s| s.eq_ignore_ascii_case(&q.symbol)))
        .collect()
}
