use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::{FetchError, WeatherQuery, provider::{ProviderReply, truncate_body}};

use super::WeatherFetcher;

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openweathermap.org";
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Direct client for the provider's current-weather endpoint. Holds the credential,
/// so it only runs server-side.
#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherClient {
    pub fn new(api_key: String, base_url: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), CURRENT_WEATHER_PATH),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherClient {
    async fn fetch(&self, query: &WeatherQuery) -> Result<ProviderReply, FetchError> {
        let mut params = query.provider_params();
        params.push(("units", "metric".to_string()));
        params.push(("appid", self.api_key.clone()));

        let res = self.http.get(&self.endpoint).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if status.is_success() {
            tracing::debug!(%query, %status, "provider replied");
        } else {
            tracing::warn!(%query, %status, body = truncate_body(&body), "provider returned an error");
        }

        Ok(ProviderReply { status: status.as_u16(), body })
    }
}
