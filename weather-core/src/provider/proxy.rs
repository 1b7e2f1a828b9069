use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::{FetchError, WeatherQuery, provider::ProviderReply};

use super::WeatherFetcher;

pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:8888";
pub const FETCH_WEATHER_PATH: &str = "/api/fetch-weather";

/// Client-side view of the proxy endpoint. Carries no credential.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    endpoint: String,
    http: Client,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client for the weather proxy")?;

        Ok(Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), FETCH_WEATHER_PATH),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl WeatherFetcher for ProxyClient {
    async fn fetch(&self, query: &WeatherQuery) -> Result<ProviderReply, FetchError> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(&query.proxy_params())
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.text().await?;
        tracing::debug!(%query, status, "proxy replied");

        Ok(ProviderReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_input_parameter() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/fetch-weather"))
            .and(query_param("input", "São Paulo"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"cod":200}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ProxyClient::new(&format!("{}/", mock_server.uri())).unwrap();
        let reply = client.fetch(&WeatherQuery::Place("São Paulo".into())).await.unwrap();
        assert_eq!(reply.status, 200);
    }

    #[tokio::test]
    async fn sends_latitude_and_longitude() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/fetch-weather"))
            .and(query_param("latitude", "48.85"))
            .and(query_param("longitude", "2.35"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ProxyClient::new(&mock_server.uri()).unwrap();
        let query = WeatherQuery::Coordinates(Coordinates::new(48.85, 2.35).unwrap());
        client.fetch(&query).await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_proxy_is_a_transport_error() {
        // Nothing listens on port 1.
        let client = ProxyClient::new("http://127.0.0.1:1").unwrap();
        let err = client.fetch(&WeatherQuery::Place("Paris".into())).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
