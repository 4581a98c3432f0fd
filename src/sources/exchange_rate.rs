//! Exchange rates: `GET /exchange-rate/`

use crate::{
    client::ApiClient, constants::EXCHANGE_RATE_ENDPOINT, error::FetchError, types::ExchangeRates,
};

pub async fn fetch_rates(client: &ApiClient) -> Result<ExchangeRates, FetchError> {
    let rates: ExchangeRates = client.get_json(EXCHANGE_RATE_ENDPOINT, &[]).await?;
    validate(rates)
}

fn validate(rates: ExchangeRates) -> Result<ExchangeRates, FetchError> {
    if rates.is_empty() {
        return Err(FetchError::invalid_response("Exchange rates unavailable"));
    }
    if let Some((pair, rate)) = rates.iter().find(|(_, r)| !(r.is_finite() && **r > 0.0)) {
        return Err(FetchError::invalid_response(format!(
            "Invalid rate for {}: {}",
            pair, rate
        )));
    }
    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_pair_map() {
        let rates: ExchangeRates =
            serde_json::from_str(r#"{"USD_EUR":0.92,"USD_INR":83.1}"#).unwrap();
        let rates = validate(rates).unwrap();
        assert_eq!(rates.get("USD_INR"), Some(&83.1));
    }

    #[test]
    fn test_empty_map_is_invalid() {
        assert!(validate(ExchangeRates::new()).is_err());
    }

    #[test]
    fn test_non_positive_rate_is_invalid() {
        let rates: ExchangeRates = [("USD_EUR".to_string(), 0.0)].into_iter().collect();
        assert!(matches!(validate(rates), Err(FetchError::InvalidResponse(_))));
    }
}
