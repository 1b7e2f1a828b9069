use anyhow::Context;
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use weather_core::{Config, provider::openweather_from_config};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-proxy", version, about = "Weather provider proxy")]
pub struct Cli {
    /// Address to listen on; defaults to the config value or 127.0.0.1:8888.
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// Provider base URL.
    #[arg(long)]
    pub upstream: Option<String>,

    /// Provider API key.
    #[arg(long, env = "OPENWEATHER_SECRET", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Config file to read instead of the platform default.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Merge flags over the config file.
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        if let Some(key) = &self.api_key {
            config.set_api_key(key);
        }
        if let Some(upstream) = &self.upstream {
            config.upstream_url = Some(upstream.clone());
        }
        if let Some(listen) = self.listen {
            config.listen = Some(listen.to_string());
        }

        Ok(config)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.resolve_config()?;
        let address = config.listen_addr()?;
        let provider = openweather_from_config(&config)
            .context("Cannot start the proxy without a provider credential")?;

        tracing::info!(upstream = provider.endpoint(), "forwarding to weather provider");

        server::run(address, server::AppState::new(Arc::new(provider))).await
    }
}
