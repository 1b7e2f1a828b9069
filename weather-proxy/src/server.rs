//! `GET /api/fetch-weather`: forwards a place name or coordinates to the provider
//! and relays its status code and JSON body unchanged.

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};

use weather_core::{
    Coordinates, ProviderReply, WeatherFetcher, WeatherQuery, provider::proxy::FETCH_WEATHER_PATH,
};

#[derive(Debug, Clone)]
pub struct AppState {
    provider: Arc<dyn WeatherFetcher>,
}

impl AppState {
    pub fn new(provider: Arc<dyn WeatherFetcher>) -> Self {
        Self { provider }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(FETCH_WEATHER_PATH, get(fetch_weather))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn run(address: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    tracing::info!(%address, "weather proxy listening");

    axum::serve(listener, router(state))
        .await
        .context("Weather proxy server stopped unexpectedly")
}

/// Query parameters accepted by the proxy. Coordinates arrive as text so a
/// malformed number can be answered in the provider's error shape.
#[derive(Debug, Default, Deserialize)]
pub struct FetchWeatherParams {
    pub input: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl FetchWeatherParams {
    /// A non-blank `input` wins; otherwise both coordinates are required.
    fn query(&self) -> Result<WeatherQuery, Response> {
        if let Some(input) = self.input.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return Ok(WeatherQuery::Place(input.to_string()));
        }

        match (self.latitude.as_deref(), self.longitude.as_deref()) {
            (Some(lat), Some(lon)) => {
                let latitude = parse_degrees(lat, -90.0..=90.0)
                    .ok_or_else(|| error_reply(StatusCode::BAD_REQUEST, "wrong latitude"))?;
                let longitude = parse_degrees(lon, -180.0..=180.0)
                    .ok_or_else(|| error_reply(StatusCode::BAD_REQUEST, "wrong longitude"))?;
                Coordinates::new(latitude, longitude)
                    .map(WeatherQuery::Coordinates)
                    .ok_or_else(|| error_reply(StatusCode::BAD_REQUEST, "wrong latitude"))
            }
            _ => Err(error_reply(StatusCode::BAD_REQUEST, "nothing to geocode")),
        }
    }
}

fn parse_degrees(raw: &str, range: std::ops::RangeInclusive<f64>) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| range.contains(v))
}

async fn fetch_weather(
    State(state): State<AppState>,
    Query(params): Query<FetchWeatherParams>,
) -> Response {
    let query = match params.query() {
        Ok(query) => query,
        Err(rejection) => return rejection,
    };

    tracing::info!(%query, "fetching weather");

    match state.provider.fetch(&query).await {
        Ok(reply) => relay(reply),
        Err(e) => {
            tracing::error!(%query, error = %e, "weather provider unreachable");
            error_reply(StatusCode::BAD_GATEWAY, "weather provider unreachable")
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

fn relay(reply: ProviderReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
}

/// Error in the provider's own shape, so clients handle it the same way.
fn error_reply(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({
        "cod": status.as_u16().to_string(),
        "message": message,
    });
    (status, Json(body)).into_response()
}
