use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Client copy of today's attendance record.
///
/// The server owns the durable record; this copy is hydrated by the status
/// sync and mutated only by the punch engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSession {
    pub attendance_id: Option<String>,
    pub punch_in_at: Option<NaiveDateTime>,
    pub punch_out_at: Option<NaiveDateTime>,
    pub break_id: Option<String>,
}

impl AttendanceSession {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn is_punched_in(&self) -> bool {
        self.punch_in_at.is_some()
    }

    pub fn is_punched_out(&self) -> bool {
        self.punch_out_at.is_some()
    }

    pub fn is_on_break(&self) -> bool {
        self.break_id.is_some()
    }

    /// `break_id` set ⇒ punched in and not punched out.
    pub fn is_consistent(&self) -> bool {
        !self.is_on_break() || (self.is_punched_in() && !self.is_punched_out())
    }

    pub fn flags(&self) -> AttendanceFlags {
        AttendanceFlags::derive(self, false)
    }
}

/// Button states derived from the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceFlags {
    pub can_punch_in: bool,
    pub can_break_in: bool,
    pub can_break_out: bool,
    pub can_punch_out: bool,
}

impl AttendanceFlags {
    /// `punch_in_locked` is raised when the server refused a punch-in
    /// because the day is already closed.
    pub fn derive(s: &AttendanceSession, punch_in_locked: bool) -> Self {
        let punched_in = s.is_punched_in();
        let punched_out = s.is_punched_out();
        let on_break = s.is_on_break();

        Self {
            can_punch_in: !punched_in && !punched_out && !punch_in_locked,
            can_break_in: punched_in && !on_break && !punched_out,
            can_break_out: on_break,
            can_punch_out: punched_in && !punched_out,
        }
    }
}
