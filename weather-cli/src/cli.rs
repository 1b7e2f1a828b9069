use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Password, PasswordDisplayMode, Text};
use std::sync::Arc;

use weather_core::{
    Config, Coordinates, LocationSource, Session, Submission,
    location::{FixedLocation, NoLocation, current_state},
    provider::proxy_from_config,
    view::render_session,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "WeatherCast: current conditions for a city")]
pub struct Cli {
    /// Proxy base URL; overrides the config file.
    #[arg(long, global = true)]
    pub proxy_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Coordinates standing in for the platform location API.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct LocationArgs {
    /// Latitude used for "here" lookups.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude used for "here" lookups.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the proxy URL, provider credential and default location.
    Configure,

    /// Show current weather for a city, or for your location with `--here`.
    Show {
        /// City name.
        city: Option<String>,

        /// Look up the weather at your location instead of a city.
        #[arg(long, conflicts_with = "city")]
        here: bool,

        #[command(flatten)]
        location: LocationArgs,
    },

    /// Prompt for cities until `:quit`.
    Interactive {
        #[command(flatten)]
        location: LocationArgs,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(url) = self.proxy_url {
            config.proxy_url = Some(url);
        }
        tracing::debug!(proxy = config.proxy_url(), "configuration loaded");

        match self.command {
            Command::Configure => configure(config),
            Command::Show { city, here, location } => {
                let submission = if here {
                    let source = location_source(location, &config);
                    Submission::Location(current_state(source.as_ref()).await)
                } else {
                    Submission::Text(city.unwrap_or_default())
                };
                show(&config, submission).await
            }
            Command::Interactive { location } => interactive(&config, location).await,
        }
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Explicit coordinates win over the configured location; without either there is
/// no location API to fall back to.
fn location_source(args: LocationArgs, config: &Config) -> Box<dyn LocationSource> {
    let fixed = match (args.lat, args.lon) {
        (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
        _ => config.location,
    };

    match fixed {
        Some(coordinates) => Box::new(FixedLocation(coordinates)),
        None => Box::new(NoLocation::unsupported()),
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let proxy_url = Text::new("Proxy URL:")
        .with_default(config.proxy_url())
        .prompt()?;
    config.proxy_url = Some(proxy_url);

    let api_key = Password::new("Provider API key (leave empty to keep current):")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(&api_key);
    }

    if Confirm::new("Set a default location for `--here`?")
        .with_default(config.location.is_some())
        .prompt()?
    {
        let latitude = CustomType::<f64>::new("Latitude:").prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:").prompt()?;
        config.location = Some(
            Coordinates::new(latitude, longitude).context("Coordinates are out of range")?,
        );
    } else {
        config.location = None;
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

async fn show(config: &Config, submission: Submission) -> anyhow::Result<()> {
    let session = Session::new(Arc::new(proxy_from_config(config)?));
    let view = session.submit(submission).await;

    if let Some(message) = view.error() {
        anyhow::bail!("{message}");
    }

    println!("{}", render_session(&view, today()));
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Quit,
    Dismiss,
    Here,
    Show,
    Lookup(String),
}

fn parse_command(line: &str) -> ReplCommand {
    match line.trim() {
        ":quit" | ":q" => ReplCommand::Quit,
        ":dismiss" => ReplCommand::Dismiss,
        ":here" => ReplCommand::Here,
        ":show" => ReplCommand::Show,
        _ => ReplCommand::Lookup(line.to_string()),
    }
}

async fn interactive(config: &Config, args: LocationArgs) -> anyhow::Result<()> {
    let session = Session::new(Arc::new(proxy_from_config(config)?));
    let source: Arc<dyn LocationSource> = location_source(args, config).into();

    println!(
        "Enter a city. `:here` uses your location, `:show` redraws, `:dismiss` clears an error, `:quit` exits."
    );

    loop {
        let line = tokio::task::spawn_blocking(|| Text::new("city>").prompt()).await?;
        let line = match line {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let submission = match parse_command(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Dismiss => {
                session.dismiss_error();
                println!("{}", render_session(&session.snapshot(), today()));
                continue;
            }
            ReplCommand::Show => {
                println!("{}", render_session(&session.snapshot(), today()));
                continue;
            }
            ReplCommand::Here => Submission::Location(current_state(source.as_ref()).await),
            ReplCommand::Lookup(text) => Submission::Text(text),
        };

        if let Ok((token, query)) = session.begin(submission) {
            println!("… loading {query}");
            session.resolve(token, &query).await;
        }
        println!("{}", render_session(&session.snapshot(), today()));
    }

    Ok(())
}
