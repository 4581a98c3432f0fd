//! Weather: `GET /weather/?city=C&unit=U`

use crate::{
    client::ApiClient, config::WeatherUnit, constants::WEATHER_ENDPOINT, error::FetchError,
    types::WeatherReport,
};

pub async fn fetch_report(
    client: &ApiClient,
    city: &str,
    unit: WeatherUnit,
) -> Result<WeatherReport, FetchError> {
    client
        .get_json(
            WEATHER_ENDPOINT,
            &[
                ("city", city.to_string()),
                ("unit", unit.as_param().to_string()),
            ],
        )
        .await
}
