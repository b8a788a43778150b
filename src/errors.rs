//! Unified application error type.
//! Engines, the backend client, the local cache and the CLI all return
//! AppError, so every failure reaches the transition boundary in one shape
//! and is turned into a user-facing message there.

use std::io;
use thiserror::Error;

use crate::models::location::LocationError;

/// Which tracked action a busy flag or a precondition failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    PunchIn,
    BreakIn,
    BreakOut,
    PunchOut,
    VisitIn,
    Checkout,
    Followup,
}

impl TransitionKind {
    /// Label used in user-facing messages ("Punch-In is blocked", ...).
    pub fn label(&self) -> &'static str {
        match self {
            TransitionKind::PunchIn => "Punch-In",
            TransitionKind::BreakIn => "Break-In",
            TransitionKind::BreakOut => "Break-Out",
            TransitionKind::PunchOut => "Punch-Out",
            TransitionKind::VisitIn => "Visit-In",
            TransitionKind::Checkout => "Visit-Out",
            TransitionKind::Followup => "followup submission",
        }
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A success-shaped reply whose message says "no".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusinessRejection {
    #[error("You have already punched out today; punch-in is disabled until tomorrow")]
    AlreadyPunchedOut { message: String },

    #[error("{action} was rejected by the server: {message}")]
    Declined {
        action: TransitionKind,
        message: String,
    },
}

/// Network-level failures: nothing reached a business decision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("server answered with HTTP {status}")]
    Status { status: u16 },

    #[error("malformed server response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_decode() {
            TransportError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            TransportError::Status {
                status: status.as_u16(),
            }
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Local cache
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    // ---------------------------
    // Tracking core
    // ---------------------------
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Rejected(#[from] BusinessRejection),

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error(
        "Followup for lead {lead_id} was saved but Visit-Out (ev_id {visit_event_id}) failed: {source}. \
         The visit is still open; run `visit-out --resume` to finish the checkout"
    )]
    InconsistentState {
        lead_id: String,
        visit_event_id: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("{0} is already in progress")]
    Busy(TransitionKind),

    #[error("{kind} is not allowed right now: {reason}")]
    TransitionNotAllowed {
        kind: TransitionKind,
        reason: &'static str,
    },

    #[error("Another visit is open on lead {open_lead}; close it before visiting lead {requested}")]
    VisitSlotOccupied { open_lead: String, requested: String },

    #[error("A visit is already open on lead {0}")]
    VisitAlreadyOpen(String),

    #[error("No open visit on lead {0}")]
    NoOpenVisit(String),

    #[error("Role '{0}' is not allowed to record field visits")]
    RoleNotAllowed(String),

    #[error("Invalid followup: {0}")]
    InvalidFollowup(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// True when the failure happened before anything was sent to the backend.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AppError::Location(_)
                | AppError::Busy(_)
                | AppError::TransitionNotAllowed { .. }
                | AppError::VisitSlotOccupied { .. }
                | AppError::VisitAlreadyOpen(_)
                | AppError::NoOpenVisit(_)
                | AppError::RoleNotAllowed(_)
                | AppError::InvalidFollowup(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
