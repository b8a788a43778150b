//! Time utilities: the backend's wire timestamp formats and HH:MM parsing.

use crate::errors::{AppError, AppResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Attendance/visit wire format: `dd-MM-yy h:mm a` (e.g. `05-03-25 9:07 AM`).
pub const ATTENDANCE_WIRE_FORMAT: &str = "%d-%m-%y %-I:%M %p";

/// Followup wire format: `dd-MM-yyyy hh:mm a` (e.g. `05-03-2025 09:07 AM`).
pub const FOLLOWUP_WIRE_FORMAT: &str = "%d-%m-%Y %I:%M %p";

pub fn format_attendance_ts(ts: &NaiveDateTime) -> String {
    ts.format(ATTENDANCE_WIRE_FORMAT).to_string()
}

pub fn format_followup_ts(ts: &NaiveDateTime) -> String {
    ts.format(FOLLOWUP_WIRE_FORMAT).to_string()
}

/// Parse a server timestamp. The backend echoes the attendance format but
/// some endpoints answer with ISO-like strings, so both are accepted.
pub fn parse_server_ts(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    const FORMATS: [&str; 5] = [
        "%d-%m-%y %I:%M %p",
        "%d-%m-%Y %I:%M %p",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
}

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t, "%H:%M").ok()
}

/// Parse a CLI timestamp: `YYYY-MM-DD HH:MM` or `HH:MM` (today).
pub fn parse_cli_datetime(s: &str, today: NaiveDate) -> AppResult<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }
    parse_time(s.trim())
        .map(|t| today.and_time(t))
        .ok_or_else(|| AppError::InvalidTime(s.to_string()))
}

/// `HH:MM` of an optional timestamp, `--:--` when missing.
pub fn hhmm_or_placeholder(ts: Option<&NaiveDateTime>) -> String {
    ts.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
