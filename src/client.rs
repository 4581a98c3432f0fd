//! HTTP client wrapper for the backend proxy
//!
//! Every call carries its own timeout and is cancelled when it expires.
//! Failures are translated into [`FetchError`] and, when a reporter is
//! attached, forwarded to it as a toast.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::ApiConfig,
    constants::USER_AGENT,
    error::FetchError,
    reporter::{ErrorReporter, Toast},
};

/// Thin JSON client bound to one backend base URL
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl ApiClient {
    /// Creates a new client from the `[api]` settings
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let timeout = config.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::from)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            reporter: None,
        })
    }

    /// Attach a sink that receives every failure as a toast
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET {base}{path}?{query}` decoded as JSON
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");
        let request = self.client.get(&url).query(query).send();
        let result = self.settle(request).await;
        self.forward(result)
    }

    /// `POST {base}{path}` with an empty JSON body, response decoded as JSON
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "POST");
        let request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send();
        let result = self.settle(request).await;
        self.forward(result)
    }

    async fn settle<T: DeserializeOwned>(
        &self,
        request: impl std::future::Future<Output = Result<Response, reqwest::Error>>,
    ) -> Result<T, FetchError> {
        let body = async {
            let response = check_status(request.await?)?;
            let text = response.text().await?;
            serde_json::from_str::<T>(&text).map_err(|e| {
                FetchError::invalid_response(format!("Failed to parse response: {}", e))
            })
        };

        match tokio::time::timeout(self.timeout, body).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }

    fn forward<T>(&self, result: Result<T, FetchError>) -> Result<T, FetchError> {
        if let (Err(e), Some(reporter)) = (&result, &self.reporter) {
            reporter.report(Toast::new(None, e.to_string()));
        }
        result
    }
}

fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RateLimited);
    }
    if !status.is_success() {
        return Err(FetchError::http(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
        ));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/api/".to_string(),
            request_timeout_secs: 3,
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.url("/news/"), "http://localhost:8000/api/news/");
        assert_eq!(client.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_default_config_targets_api_prefix() {
        let client = ApiClient::new(&crate::config::DashboardConfig::default().api).unwrap();
        assert_eq!(client.url("/crypto/"), "http://localhost:8000/api/crypto/");
        assert_eq!(client.url("/refresh/"), "http://localhost:8000/api/refresh/");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_reported() {
        use crate::api::mock::CollectingReporter;

        let config = ApiConfig {
            // Reserved port on localhost, nothing listens there
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
        };
        let reporter = Arc::new(CollectingReporter::default());
        let client = ApiClient::new(&config)
            .unwrap()
            .with_reporter(reporter.clone());

        let result: Result<serde_json::Value, _> = client.get_json("/health/", &[]).await;

        assert!(matches!(
            result,
            Err(FetchError::Network(_)) | Err(FetchError::Timeout)
        ));
        assert_eq!(reporter.toasts().len(), 1);
    }
}
