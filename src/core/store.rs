//! Process-wide attendance state, held in an explicit container.
//!
//! Engines receive an `Arc<AttendanceStore>` instead of reaching for a
//! global, so every test builds its own isolated store.
//!
//! Every mutator re-checks the session invariants at write time: two
//! transitions of different kinds may be in flight together, and the one that
//! lands second must not produce a break outside an open attendance window.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::api::wire::ServerAttendanceStatus;
use crate::errors::{AppError, AppResult, TransitionKind};
use crate::models::session::{AttendanceFlags, AttendanceSession};
use crate::models::visit::{VisitPhase, VisitRecord};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub session: AttendanceSession,
    /// Set when the server refused punch-in because the day is closed.
    pub punch_in_locked: bool,
    /// The singleton visit slot; `None` means no open visit.
    pub visit: Option<VisitRecord>,
}

impl StoreSnapshot {
    pub fn flags(&self) -> AttendanceFlags {
        AttendanceFlags::derive(&self.session, self.punch_in_locked)
    }
}

pub struct AttendanceStore {
    state: watch::Sender<StoreSnapshot>,
}

impl Default for AttendanceStore {
    fn default() -> Self {
        Self::new()
    }
}

fn changed_underneath(kind: TransitionKind) -> AppError {
    AppError::TransitionNotAllowed {
        kind,
        reason: "attendance state changed while the request was in flight",
    }
}

impl AttendanceStore {
    pub fn new() -> Self {
        Self::from_snapshot(StoreSnapshot::default())
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let (state, _) = watch::channel(snapshot);
        Self { state }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> AttendanceSession {
        self.state.borrow().session.clone()
    }

    pub fn flags(&self) -> AttendanceFlags {
        self.state.borrow().flags()
    }

    pub fn visit(&self) -> Option<VisitRecord> {
        self.state.borrow().visit.clone()
    }

    /// Logout: back to an empty store.
    pub fn reset(&self) {
        self.state.send_replace(StoreSnapshot::default());
        debug!("attendance store reset");
    }

    // -----------------------------------------------------------------
    // Attendance transitions
    // -----------------------------------------------------------------

    pub(crate) fn record_punch_in(&self, attendance_id: String, at: NaiveDateTime) -> AppResult<()> {
        let mut ok = false;
        self.state.send_if_modified(|s| {
            if s.session.is_punched_in() || s.session.is_punched_out() {
                return false;
            }
            s.session = AttendanceSession {
                attendance_id: Some(attendance_id),
                punch_in_at: Some(at),
                punch_out_at: None,
                break_id: None,
            };
            s.punch_in_locked = false;
            ok = true;
            true
        });
        if ok { Ok(()) } else { Err(changed_underneath(TransitionKind::PunchIn)) }
    }

    /// "Already punched out" keeps punch-in disabled without touching the session.
    pub(crate) fn lock_punch_in(&self) {
        self.state.send_if_modified(|s| {
            let changed = !s.punch_in_locked;
            s.punch_in_locked = true;
            changed
        });
    }

    pub(crate) fn record_break_in(&self, break_id: String) -> AppResult<()> {
        let mut ok = false;
        self.state.send_if_modified(|s| {
            let open = s.session.is_punched_in() && !s.session.is_punched_out();
            if !open || s.session.is_on_break() {
                return false;
            }
            s.session.break_id = Some(break_id);
            ok = true;
            true
        });
        if ok { Ok(()) } else { Err(changed_underneath(TransitionKind::BreakIn)) }
    }

    pub(crate) fn record_break_out(&self, break_id: &str) -> AppResult<()> {
        let mut ok = false;
        self.state.send_if_modified(|s| {
            if s.session.break_id.as_deref() != Some(break_id) {
                return false;
            }
            s.session.break_id = None;
            ok = true;
            true
        });
        if ok { Ok(()) } else { Err(changed_underneath(TransitionKind::BreakOut)) }
    }

    /// Terminal for the day: ids are dropped, the punch times stay as the
    /// closed-day marker so punch-in remains disabled until a reset or a
    /// sync for a new day.
    pub(crate) fn record_punch_out(&self, attendance_id: &str, at: NaiveDateTime) -> AppResult<()> {
        let mut ok = false;
        self.state.send_if_modified(|s| {
            if s.session.attendance_id.as_deref() != Some(attendance_id)
                || s.session.is_punched_out()
            {
                return false;
            }
            s.session.attendance_id = None;
            s.session.break_id = None;
            s.session.punch_out_at = Some(at);
            ok = true;
            true
        });
        if ok { Ok(()) } else { Err(changed_underneath(TransitionKind::PunchOut)) }
    }

    // -----------------------------------------------------------------
    // Visit slot
    // -----------------------------------------------------------------

    pub(crate) fn open_visit(&self, record: VisitRecord) -> AppResult<()> {
        let mut occupied_by = None;
        self.state.send_if_modified(|s| {
            if let Some(current) = &s.visit {
                occupied_by = Some(current.reference_id.clone());
                return false;
            }
            s.visit = Some(record.clone());
            true
        });
        match occupied_by {
            None => Ok(()),
            Some(open_lead) => Err(AppError::VisitSlotOccupied {
                open_lead,
                requested: record.reference_id,
            }),
        }
    }

    pub(crate) fn set_visit_phase(&self, visit_event_id: &str, phase: VisitPhase) {
        self.state.send_if_modified(|s| match &mut s.visit {
            Some(v) if v.visit_event_id == visit_event_id && v.phase != phase => {
                v.phase = phase;
                true
            }
            _ => false,
        });
    }

    /// Close the slot, but only if it still holds this visit.
    pub(crate) fn close_visit(&self, visit_event_id: &str) {
        self.state.send_if_modified(|s| {
            let matches = s
                .visit
                .as_ref()
                .map(|v| v.visit_event_id == visit_event_id)
                .unwrap_or(false);
            if matches {
                s.visit = None;
            }
            matches
        });
    }

    // -----------------------------------------------------------------
    // Server reconciliation
    // -----------------------------------------------------------------

    /// Overwrite local state with the server's view of today.
    pub(crate) fn apply_server_status(&self, status: ServerAttendanceStatus) {
        self.state.send_modify(|s| {
            s.session = status.session;
            s.punch_in_locked = false;

            s.visit = match (s.visit.take(), status.open_visit) {
                // Same visit: keep the local phase and open time.
                (Some(local), Some(remote)) if local.visit_event_id == remote.visit_event_id => {
                    Some(local)
                }
                (_, remote) => remote,
            };
        });
        debug!("attendance store reconciled with server status");
    }
}
