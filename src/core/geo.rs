//! Location precondition for every tracked action.
//!
//! The gate never touches the attendance store. It answers a fix or a typed
//! failure naming the blocked action; callers abort on failure before any
//! network call is issued.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::LocationConfig;
use crate::models::location::{
    Coordinates, LocationError, LocationErrorKind, LocationFix, PermissionState,
};

/// Platform access to location permission and position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Current permission, without prompting.
    async fn permission_state(&self) -> PermissionState;

    /// Read a fresh position. May show the platform permission prompt when
    /// the state is still `Prompt`.
    async fn current_position(&self) -> Result<Coordinates, LocationErrorKind>;

    /// Settle a pending permission up front, at session start.
    async fn request_permission(&self) -> PermissionState {
        self.permission_state().await
    }
}

pub struct GeoPermissionGate<P: LocationProvider> {
    provider: P,
    fix_timeout: Duration,
}

impl<P: LocationProvider> GeoPermissionGate<P> {
    pub fn new(provider: P, fix_timeout: Duration) -> Self {
        Self {
            provider,
            fix_timeout,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Session-start step: ask for permission once so the first tracked
    /// action does not stall on a prompt.
    pub async fn initialize(&self) -> PermissionState {
        let state = self.provider.request_permission().await;
        debug!(permission = state.as_str(), "location permission initialised");
        state
    }

    /// Acquire a fresh fix for `action_label` (e.g. "Punch-In").
    pub async fn acquire_location(&self, action_label: &str) -> Result<LocationFix, LocationError> {
        let state = self.provider.permission_state().await;
        debug!(action = action_label, permission = state.as_str(), "location gate");

        if state == PermissionState::Denied {
            warn!(action = action_label, "location permission denied");
            return Err(LocationError::new(
                LocationErrorKind::PermissionDenied,
                action_label,
            ));
        }

        // A pending prompt waits on the user, so only a granted read is bounded.
        let read = async {
            if state == PermissionState::Granted {
                tokio::time::timeout(self.fix_timeout, self.provider.current_position()).await
            } else {
                Ok(self.provider.current_position().await)
            }
        };

        match read.await {
            Ok(Ok(coords)) => Ok(LocationFix::from_coordinates(coords)),
            Ok(Err(kind)) => {
                warn!(action = action_label, ?kind, "location fix failed");
                Err(LocationError::new(kind, action_label))
            }
            Err(_) => {
                warn!(action = action_label, "location fix timed out");
                Err(LocationError::new(LocationErrorKind::Unavailable, action_label))
            }
        }
    }
}

const STATE_PROMPT: u8 = 0;
const STATE_GRANTED: u8 = 1;
const STATE_DENIED: u8 = 2;

fn encode(p: PermissionState) -> u8 {
    match p {
        PermissionState::Prompt => STATE_PROMPT,
        PermissionState::Granted => STATE_GRANTED,
        PermissionState::Denied => STATE_DENIED,
    }
}

fn decode(v: u8) -> PermissionState {
    match v {
        STATE_GRANTED => PermissionState::Granted,
        STATE_DENIED => PermissionState::Denied,
        _ => PermissionState::Prompt,
    }
}

/// Location for a machine without GPS: coordinates come from configuration.
///
/// With `permission: prompt` the user is asked once per process; the answer
/// sticks until the process exits. Without a terminal the prompt cannot be
/// shown and the read fails with `PermissionPrompt`.
pub struct ConfiguredLocationProvider {
    cfg: LocationConfig,
    state: AtomicU8,
    interactive: bool,
}

impl ConfiguredLocationProvider {
    pub fn new(cfg: LocationConfig, interactive: bool) -> Self {
        let state = AtomicU8::new(encode(cfg.permission));
        Self {
            cfg,
            state,
            interactive,
        }
    }

    fn coordinates(&self) -> Result<Coordinates, LocationErrorKind> {
        match (self.cfg.latitude, self.cfg.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates {
                latitude,
                longitude,
                address: self.cfg.address.clone(),
            }),
            _ => Err(LocationErrorKind::Unavailable),
        }
    }

    async fn ask(&self) -> Result<bool, LocationErrorKind> {
        if !self.interactive {
            return Err(LocationErrorKind::PermissionPrompt);
        }

        let answer = tokio::task::spawn_blocking(|| {
            dialoguer::Confirm::new()
                .with_prompt("📍 Allow fieldtrack to use your location?")
                .default(true)
                .interact_opt()
        })
        .await;

        match answer {
            Ok(Ok(Some(allowed))) => Ok(allowed),
            _ => Err(LocationErrorKind::PermissionPrompt),
        }
    }

    /// Ask, and remember the answer for the rest of the process.
    async fn settle(&self) -> Result<PermissionState, LocationErrorKind> {
        let next = if self.ask().await? {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        self.state.store(encode(next), Ordering::SeqCst);
        Ok(next)
    }
}

#[async_trait]
impl LocationProvider for ConfiguredLocationProvider {
    async fn permission_state(&self) -> PermissionState {
        decode(self.state.load(Ordering::SeqCst))
    }

    async fn current_position(&self) -> Result<Coordinates, LocationErrorKind> {
        match self.permission_state().await {
            PermissionState::Granted => self.coordinates(),
            PermissionState::Denied => Err(LocationErrorKind::PermissionDenied),
            PermissionState::Prompt => match self.settle().await? {
                PermissionState::Granted => self.coordinates(),
                _ => Err(LocationErrorKind::PermissionDenied),
            },
        }
    }

    async fn request_permission(&self) -> PermissionState {
        match self.permission_state().await {
            PermissionState::Prompt if self.interactive => {
                self.settle().await.unwrap_or(PermissionState::Prompt)
            }
            state => state,
        }
    }
}
