//! Geolocation state for "weather here" lookups.
//!
//! The platform location API is abstracted behind [`LocationSource`]; the
//! resulting [`LocationState`] is what a submission carries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, str::FromStr};

use crate::{LocationError, SubmitError, model::Coordinates};

/// Geolocation permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Prompt,
}

impl PermissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Granted => "granted",
            PermissionStatus::Denied => "denied",
            PermissionStatus::Prompt => "prompt",
        }
    }
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionStatus {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "granted" => Ok(PermissionStatus::Granted),
            "denied" => Ok(PermissionStatus::Denied),
            "prompt" => Ok(PermissionStatus::Prompt),
            other => Err(LocationError::Other(format!("unknown permission state '{other}'"))),
        }
    }
}

/// Last known position, or the reason there is none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationState {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub error: Option<String>,
}

impl LocationState {
    pub fn located(coordinates: Coordinates) -> Self {
        Self {
            latitude: Some(coordinates.latitude),
            longitude: Some(coordinates.longitude),
            error: None,
        }
    }

    pub fn failed(error: &LocationError) -> Self {
        Self { error: Some(error.to_string()), ..Self::default() }
    }

    /// Usable coordinates, or the validation error to show instead of querying.
    pub fn coordinates(&self) -> Result<Coordinates, SubmitError> {
        if let Some(err) = &self.error {
            return Err(SubmitError::LocationUnavailable(err.clone()));
        }

        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon).ok_or_else(|| {
                SubmitError::LocationUnavailable("coordinates out of range".to_string())
            }),
            _ => Err(SubmitError::LocationUnavailable("no position yet".to_string())),
        }
    }
}

/// Something that knows where the user is.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    /// `None` when the platform cannot report a permission state.
    async fn permission(&self) -> Option<PermissionStatus>;

    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Resolve the current [`LocationState`] from a source, honouring a denied permission.
pub async fn current_state(source: &dyn LocationSource) -> LocationState {
    if source.permission().await == Some(PermissionStatus::Denied) {
        return LocationState::failed(&LocationError::PermissionDenied);
    }

    match source.locate().await {
        Ok(coordinates) => {
            tracing::debug!(
                latitude = coordinates.latitude,
                longitude = coordinates.longitude,
                "location resolved"
            );
            LocationState::located(coordinates)
        }
        Err(err) => {
            tracing::debug!(error = %err, "location unavailable");
            LocationState::failed(&err)
        }
    }
}

/// A position supplied by the user (command line or config file).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn permission(&self) -> Option<PermissionStatus> {
        Some(PermissionStatus::Granted)
    }

    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// No position available on this platform, or access refused.
#[derive(Debug, Clone)]
pub struct NoLocation {
    reason: LocationError,
}

impl NoLocation {
    pub fn unsupported() -> Self {
        Self { reason: LocationError::Unsupported }
    }

    pub fn denied() -> Self {
        Self { reason: LocationError::PermissionDenied }
    }
}

#[async_trait]
impl LocationSource for NoLocation {
    async fn permission(&self) -> Option<PermissionStatus> {
        match self.reason {
            LocationError::PermissionDenied => Some(PermissionStatus::Denied),
            _ => None,
        }
    }

    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Err(self.reason.clone())
    }
}
