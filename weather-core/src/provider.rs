use crate::{
    Config, FetchError, WeatherQuery,
    model::{ConditionRecord, WeatherResult},
    provider::{openweather::OpenWeatherClient, proxy::ProxyClient},
};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;

pub mod openweather;
pub mod proxy;

/// Raw reply relayed between provider, proxy and client: status code plus JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    pub status: u16,
    pub body: String,
}

/// Interpretation of a [`ProviderReply`] body.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    Weather(WeatherResult),
    Failure { code: String, message: String },
}

impl ProviderReply {
    /// Decide success from the body's `cod` field, as the provider reports it there
    /// rather than only in the HTTP status.
    pub fn outcome(&self) -> Result<ProviderOutcome, FetchError> {
        let envelope: OwEnvelope = serde_json::from_str(&self.body)?;

        if envelope.cod.as_code() != Some(200) {
            return Ok(ProviderOutcome::Failure {
                code: envelope.cod.to_string(),
                message: envelope.message.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&self.body)?;

        Ok(ProviderOutcome::Weather(WeatherResult {
            name: parsed.name,
            country: parsed.sys.country,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            conditions: parsed.weather,
        }))
    }
}

/// `cod` is a number on success (`200`) and usually a string on failure (`"404"`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCod {
    Number(u16),
    Text(String),
}

impl OwCod {
    fn as_code(&self) -> Option<u16> {
        match self {
            OwCod::Number(n) => Some(*n),
            OwCod::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for OwCod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwCod::Number(n) => write!(f, "{n}"),
            OwCod::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwEnvelope {
    cod: OwCod,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize, Default)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    wind: OwWind,
    #[serde(default)]
    weather: Vec<ConditionRecord>,
}

/// Anything that can turn a [`WeatherQuery`] into a provider reply.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch(&self, query: &WeatherQuery) -> Result<ProviderReply, FetchError>;
}

/// Construct the provider client used by the proxy.
pub fn openweather_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for the weather provider.\n\
                 Hint: run `weather configure` or set OPENWEATHER_SECRET."
        )
    })?;

    OpenWeatherClient::new(api_key.to_owned(), config.upstream_url())
}

/// Construct the proxy client used by front-ends.
pub fn proxy_from_config(config: &Config) -> anyhow::Result<ProxyClient> {
    ProxyClient::new(config.proxy_url())
}

pub(crate) fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        &body[..end]
    } else {
        body
    }
}
