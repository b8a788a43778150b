//! Punch-in → break-in/out → punch-out.
//!
//! Each transition runs the same pipeline:
//! precondition on the derived flags → busy flag → location gate → backend
//! call → store update. A failure at any step leaves the store untouched;
//! the busy flag is released on every exit path.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::Transport;
use crate::api::wire::PunchInReply;
use crate::core::context::TrackingContext;
use crate::core::geo::LocationProvider;
use crate::core::single_flight::SingleFlight;
use crate::errors::{AppError, AppResult, BusinessRejection, TransitionKind};
use crate::models::direction::Direction;
use crate::models::session::{AttendanceFlags, AttendanceSession};

/// First step of the punch-out dialog. Dropping it cancels the punch-out.
#[derive(Debug)]
pub struct PunchOutDialog {
    _private: (),
}

/// Second step: the user has confirmed once and now sees the warning that
/// punch-out cannot be undone today.
#[derive(Debug)]
pub struct PunchOutWarning {
    _private: (),
}

/// Proof that both dialog steps were accepted. Only obtainable through
/// [`PunchOutDialog`], and the only way to call [`PunchTransitionEngine::punch_out`].
#[derive(Debug)]
pub struct PunchOutConfirmation {
    _private: (),
}

impl PunchOutDialog {
    pub const PROMPT: &'static str = "Do you want to punch out now?";

    pub fn open() -> Self {
        Self { _private: () }
    }

    pub fn confirm(self) -> PunchOutWarning {
        PunchOutWarning { _private: () }
    }
}

impl PunchOutWarning {
    pub const PROMPT: &'static str =
        "Punch-out is final for today: you will not be able to punch in again. Continue?";

    pub fn acknowledge_irreversible(self) -> PunchOutConfirmation {
        PunchOutConfirmation { _private: () }
    }
}

pub struct PunchTransitionEngine<T: Transport, P: LocationProvider> {
    ctx: Arc<TrackingContext<T, P>>,
    flights: SingleFlight,
}

fn not_allowed(kind: TransitionKind, reason: &'static str) -> AppError {
    AppError::TransitionNotAllowed { kind, reason }
}

impl<T: Transport, P: LocationProvider> PunchTransitionEngine<T, P> {
    pub fn new(ctx: Arc<TrackingContext<T, P>>) -> Self {
        Self {
            ctx,
            flights: SingleFlight::new(),
        }
    }

    pub fn flags(&self) -> AttendanceFlags {
        self.ctx.store.flags()
    }

    /// Whether the control for `kind` should currently show as busy.
    pub fn is_busy(&self, kind: TransitionKind) -> bool {
        self.flights.is_busy(kind)
    }

    pub async fn punch_in(&self) -> AppResult<AttendanceSession> {
        let kind = TransitionKind::PunchIn;
        let snap = self.ctx.store.snapshot();
        if snap.punch_in_locked {
            return Err(BusinessRejection::AlreadyPunchedOut {
                message: "punch-in locked for today".into(),
            }
            .into());
        }
        if !snap.flags().can_punch_in {
            return Err(not_allowed(kind, "already punched in today"));
        }

        let _flight = self.flights.enter(kind)?;
        self.ctx.gate.acquire_location(kind.label()).await?;

        let at = self.ctx.clock.now();
        match self.ctx.client.punch_in(self.ctx.employee_id(), &at).await? {
            PunchInReply::Accepted { attendance_id } => {
                info!(employee = self.ctx.employee_id(), %attendance_id, "punched in");
                self.ctx.store.record_punch_in(attendance_id, at)?;
                Ok(self.ctx.store.session())
            }
            PunchInReply::AlreadyPunchedOut { message } => {
                warn!(employee = self.ctx.employee_id(), %message, "punch-in refused: day closed");
                self.ctx.store.lock_punch_in();
                Err(BusinessRejection::AlreadyPunchedOut { message }.into())
            }
        }
    }

    pub async fn break_in(&self) -> AppResult<AttendanceSession> {
        let kind = TransitionKind::BreakIn;
        let session = self.ctx.store.session();
        if !session.flags().can_break_in {
            return Err(not_allowed(kind, "you must be punched in and not already on break"));
        }
        let attendance_id = session
            .attendance_id
            .ok_or_else(|| not_allowed(kind, "no attendance id for today"))?;

        let _flight = self.flights.enter(kind)?;
        self.ctx.gate.acquire_location(kind.label()).await?;

        let at = self.ctx.clock.now();
        let break_id = self
            .ctx
            .client
            .toggle_break(&attendance_id, Direction::In, None, &at)
            .await?
            .into_result(kind)?
            .ok_or_else(|| AppError::Other("break-in accepted without a break id".into()))?;

        info!(%attendance_id, %break_id, "break started");
        self.ctx.store.record_break_in(break_id)?;
        Ok(self.ctx.store.session())
    }

    pub async fn break_out(&self) -> AppResult<AttendanceSession> {
        let kind = TransitionKind::BreakOut;
        let session = self.ctx.store.session();
        if !session.flags().can_break_out {
            return Err(not_allowed(kind, "no break is open"));
        }
        let (Some(attendance_id), Some(break_id)) = (session.attendance_id, session.break_id)
        else {
            return Err(not_allowed(kind, "no break is open"));
        };

        let _flight = self.flights.enter(kind)?;
        self.ctx.gate.acquire_location(kind.label()).await?;

        let at = self.ctx.clock.now();
        self.ctx
            .client
            .toggle_break(&attendance_id, Direction::Out, Some(&break_id), &at)
            .await?
            .into_result(kind)?;

        info!(%attendance_id, %break_id, "break ended");
        self.ctx.store.record_break_out(&break_id)?;
        Ok(self.ctx.store.session())
    }

    /// Terminal transition for the day; needs both dialog confirmations.
    pub async fn punch_out(&self, _confirmed: PunchOutConfirmation) -> AppResult<AttendanceSession> {
        let kind = TransitionKind::PunchOut;
        let session = self.ctx.store.session();
        if !session.flags().can_punch_out {
            return Err(not_allowed(kind, "you are not punched in"));
        }
        let attendance_id = session
            .attendance_id
            .ok_or_else(|| not_allowed(kind, "no attendance id for today"))?;

        let _flight = self.flights.enter(kind)?;
        self.ctx.gate.acquire_location(kind.label()).await?;

        let at = self.ctx.clock.now();
        self.ctx
            .client
            .punch_out(self.ctx.employee_id(), &attendance_id, &at)
            .await?
            .into_result(kind)?;

        info!(employee = self.ctx.employee_id(), %attendance_id, "punched out");
        self.ctx.store.record_punch_out(&attendance_id, at)?;
        Ok(self.ctx.store.session())
    }
}
