//! Core library for the WeatherCast lookup.
//!
//! This crate defines:
//! - Configuration handling
//! - Shared domain models (queries, results, condition records)
//! - The condition-code to icon resolver
//! - HTTP clients for the weather provider and for the proxy endpoint
//! - The submission/session state machine driven by front-ends
//!
//! It is used by `weather-cli` and `weather-proxy`, but can also be reused by other binaries.

pub mod config;
pub mod error;
pub mod icon;
pub mod location;
pub mod model;
pub mod provider;
pub mod session;
pub mod view;

pub use config::Config;
pub use error::{FetchError, LocationError, SubmitError};
pub use icon::resolve_icon;
pub use location::{LocationSource, LocationState, PermissionStatus};
pub use model::{ConditionRecord, Coordinates, WeatherQuery, WeatherResult};
pub use provider::{ProviderOutcome, ProviderReply, WeatherFetcher};
pub use session::{Session, SessionView, Submission, UiState};
pub use view::WeatherView;
