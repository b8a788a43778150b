use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Device location permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
}

impl PermissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
            PermissionState::Prompt => "prompt",
        }
    }
}

/// Raw coordinates read from the device, before the gate decorates them.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

/// A fresh location fix attached to tracked actions.
/// Never persisted: every mutating action asks for a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub map_link: String,
}

impl LocationFix {
    pub fn from_coordinates(c: Coordinates) -> Self {
        let map_link = map_link(c.latitude, c.longitude);
        Self {
            latitude: c.latitude,
            longitude: c.longitude,
            address: c.address.unwrap_or_default(),
            map_link,
        }
    }
}

pub fn map_link(latitude: f64, longitude: f64) -> String {
    format!("https://www.google.com/maps?q={},{}", latitude, longitude)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationErrorKind {
    PermissionDenied,
    /// The permission prompt was dismissed without an answer.
    PermissionPrompt,
    Unavailable,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct LocationError {
    pub kind: LocationErrorKind,
    /// The blocked action, e.g. "Punch-In" or "followup submission".
    pub action: String,
    pub message: String,
}

impl LocationError {
    pub fn new(kind: LocationErrorKind, action: &str) -> Self {
        let message = match kind {
            LocationErrorKind::PermissionDenied => format!(
                "Location permission denied: {} is blocked. Allow location access and try again.",
                action
            ),
            LocationErrorKind::PermissionPrompt => format!(
                "Location permission was not granted: {} needs your location.",
                action
            ),
            LocationErrorKind::Unavailable => format!(
                "Unable to read your location for {}. Check GPS/network and try again.",
                action
            ),
        };
        Self {
            kind,
            action: action.to_string(),
            message,
        }
    }
}
