use thiserror::Error;

/// Failure to obtain a reply from the proxy or the provider at all.
///
/// A reply with a non-200 `cod` is not a `FetchError`; it is a
/// [`ProviderOutcome::Failure`](crate::provider::ProviderOutcome::Failure).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse weather response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Submission rejected locally, before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("please enter a city name")]
    BlankInput,

    #[error("location unavailable: {0}")]
    LocationUnavailable(String),
}

/// Location service errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("geolocation not supported")]
    Unsupported,

    #[error("{0}")]
    Other(String),
}
