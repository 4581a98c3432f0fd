//! Headlines: `GET /news/`

use crate::{client::ApiClient, constants::NEWS_ENDPOINT, error::FetchError, types::NewsHeadline};

pub async fn fetch_headlines(client: &ApiClient) -> Result<Vec<NewsHeadline>, FetchError> {
    client.get_json(NEWS_ENDPOINT, &[]).await
}
