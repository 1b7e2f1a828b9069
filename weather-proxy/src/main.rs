//! Binary crate for the `weather-proxy` HTTP service.
//!
//! This crate focuses on:
//! - Holding the provider credential server-side
//! - Relaying `GET /api/fetch-weather` to the provider verbatim

use clap::Parser;

mod cli;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
