//! Persistence of the store snapshot between CLI invocations.
//!
//! The backend stays the source of truth; these rows only let a new process
//! start from the last known state when the status sync is unavailable.

use crate::core::store::StoreSnapshot;
use crate::errors::{AppError, AppResult};
use crate::models::session::AttendanceSession;
use crate::models::visit::{VisitPhase, VisitRecord};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn ts_to_db(ts: &Option<NaiveDateTime>) -> Option<String> {
    ts.map(|t| t.format(TS_FORMAT).to_string())
}

fn ts_from_db(idx: usize, s: Option<String>) -> rusqlite::Result<Option<NaiveDateTime>> {
    match s {
        None => Ok(None),
        Some(s) => NaiveDateTime::parse_from_str(&s, TS_FORMAT)
            .map(Some)
            .map_err(|_| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(AppError::InvalidTime(s.clone())),
                )
            }),
    }
}

struct CachedSession {
    employee_id: String,
    session: AttendanceSession,
    punch_in_locked: bool,
    updated_at: String,
}

impl CachedSession {
    /// Calendar day the cached attendance belongs to.
    fn day(&self) -> Option<NaiveDate> {
        match self.session.punch_in_at {
            Some(t) => Some(t.date()),
            None => DateTime::parse_from_rfc3339(&self.updated_at)
                .ok()
                .map(|t| t.naive_local().date()),
        }
    }
}

fn map_session(row: &Row) -> rusqlite::Result<CachedSession> {
    let employee_id: String = row.get("employee_id")?;
    let session = AttendanceSession {
        attendance_id: row.get("attendance_id")?,
        punch_in_at: ts_from_db(2, row.get("punch_in_at")?)?,
        punch_out_at: ts_from_db(3, row.get("punch_out_at")?)?,
        break_id: row.get("break_id")?,
    };
    Ok(CachedSession {
        employee_id,
        session,
        punch_in_locked: row.get::<_, i32>("punch_in_locked")? == 1,
        updated_at: row.get("updated_at")?,
    })
}

fn map_visit(row: &Row) -> rusqlite::Result<VisitRecord> {
    let phase_str: String = row.get("phase")?;
    let phase = VisitPhase::from_db_str(&phase_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            Box::new(AppError::Other(format!("Invalid visit phase: {}", phase_str))),
        )
    })?;

    Ok(VisitRecord {
        visit_event_id: row.get("ev_id")?,
        reference_id: row.get("reference_id")?,
        reference_type: row.get("reference_type")?,
        opened_at: ts_from_db(4, row.get("opened_at")?)?,
        phase,
    })
}

/// Load the cached snapshot for `employee_id`. A snapshot written for a
/// different employee is ignored.
///
/// Attendance is scoped to `today`: a session or day lock-out cached on an
/// earlier date is dropped. The visit slot is kept until the server closes it.
pub fn load_snapshot(
    conn: &Connection,
    employee_id: &str,
    today: NaiveDate,
) -> AppResult<Option<StoreSnapshot>> {
    let cached = conn
        .query_row(
            "SELECT employee_id, attendance_id, punch_in_at, punch_out_at, break_id, punch_in_locked,
                    updated_at
             FROM session_cache WHERE id = 1",
            [],
            map_session,
        )
        .optional()?;

    let Some(cached) = cached else {
        return Ok(None);
    };
    if cached.employee_id != employee_id {
        return Ok(None);
    }

    let (session, punch_in_locked) = if cached.day() == Some(today) {
        (cached.session, cached.punch_in_locked)
    } else {
        debug!(employee = employee_id, day = ?cached.day(), "cached attendance is from another day");
        (AttendanceSession::default(), false)
    };

    let visit = conn
        .query_row(
            "SELECT ev_id, reference_id, reference_type, opened_at, phase FROM visit_slot WHERE id = 1",
            [],
            map_visit,
        )
        .optional()?;

    Ok(Some(StoreSnapshot {
        session,
        punch_in_locked,
        visit,
    }))
}

pub fn save_snapshot(conn: &Connection, employee_id: &str, snap: &StoreSnapshot) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO session_cache
            (id, employee_id, attendance_id, punch_in_at, punch_out_at, break_id, punch_in_locked, updated_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            employee_id = excluded.employee_id,
            attendance_id = excluded.attendance_id,
            punch_in_at = excluded.punch_in_at,
            punch_out_at = excluded.punch_out_at,
            break_id = excluded.break_id,
            punch_in_locked = excluded.punch_in_locked,
            updated_at = excluded.updated_at",
        params![
            employee_id,
            snap.session.attendance_id,
            ts_to_db(&snap.session.punch_in_at),
            ts_to_db(&snap.session.punch_out_at),
            snap.session.break_id,
            snap.punch_in_locked as i32,
            Local::now().to_rfc3339(),
        ],
    )?;

    match &snap.visit {
        Some(v) => {
            tx.execute(
                "INSERT INTO visit_slot (id, ev_id, reference_id, reference_type, opened_at, phase)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    ev_id = excluded.ev_id,
                    reference_id = excluded.reference_id,
                    reference_type = excluded.reference_type,
                    opened_at = excluded.opened_at,
                    phase = excluded.phase",
                params![
                    v.visit_event_id,
                    v.reference_id,
                    v.reference_type,
                    ts_to_db(&v.opened_at),
                    v.phase.as_str(),
                ],
            )?;
        }
        None => {
            tx.execute("DELETE FROM visit_slot", [])?;
        }
    }

    tx.commit()?;
    Ok(())
}

/// Logout: forget everything cached about the day.
pub fn clear_snapshot(conn: &Connection) -> AppResult<()> {
    conn.execute_batch("DELETE FROM session_cache; DELETE FROM visit_slot;")?;
    Ok(())
}
