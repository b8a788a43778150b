//! Wire payloads and reply decoding.
//!
//! The backend answers every mutation with an array of rows shaped like
//! `{"STATUS": ..., "MSG": ..., <ids>}`. Whether a reply is an acceptance is
//! decided here, once, and handed to the engines as a tagged value so nothing
//! downstream probes optional fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AppError, AppResult, BusinessRejection, TransitionKind, TransportError};
use crate::models::direction::Direction;
use crate::models::history::{AttendanceHistoryRecord, Interval, VisitInterval};
use crate::models::session::AttendanceSession;
use crate::models::visit::VisitRecord;
use crate::utils::date::parse_date;
use crate::utils::time::parse_server_ts;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_VISIT_SUCCESS: &str = "SUCCESS";

pub const MSG_PUNCH_IN: &str = "Punch in Successfully";
pub const MSG_PUNCH_OUT: &str = "Punch out Successfully";
pub const MSG_BREAK_IN: &str = "successfully Break in";
pub const MSG_BREAK_OUT: &str = "successfully Break out";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PunchInRequest<'a> {
    pub employee_id: &'a str,
    pub datetime: String,
}

#[derive(Debug, Serialize)]
pub struct BreakRequest<'a> {
    pub att_id: &'a str,
    pub break_type: &'static str,
    pub datetime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct PunchOutRequest<'a> {
    pub employee_id: &'a str,
    pub datetime: String,
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VisitRequest<'a> {
    pub visitor_type: &'static str,
    pub employee_id: &'a str,
    pub reference_id: &'a str,
    pub reference_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ev_id: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ReplyRow {
    #[serde(rename = "STATUS", default)]
    pub status: Option<String>,
    #[serde(rename = "MSG", default)]
    pub msg: Option<String>,
    #[serde(rename = "Id", default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub id_break: Option<Value>,
    #[serde(default)]
    pub ev_id: Option<Value>,
    #[serde(default)]
    pub reference_id: Option<Value>,
    #[serde(default)]
    pub punch_in: Option<String>,
    #[serde(default)]
    pub punch_out: Option<String>,
    #[serde(default)]
    pub followup_id: Option<Value>,
}

impl ReplyRow {
    fn msg_is(&self, expected: &str) -> bool {
        self.msg.as_deref().map(str::trim) == Some(expected)
    }

    fn status_is(&self, expected: &str) -> bool {
        self.status.as_deref().map(str::trim) == Some(expected)
    }

    fn message(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.status.clone())
            .unwrap_or_default()
    }
}

/// Outcome of a punch-in, the only call with a distinct business rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PunchInReply {
    Accepted { attendance_id: String },
    AlreadyPunchedOut { message: String },
}

/// Outcome of every other mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack<T> {
    Accepted(T),
    Declined { message: String },
}

impl<T> Ack<T> {
    /// Turn a decline into the matching business rejection.
    pub fn into_result(self, action: TransitionKind) -> AppResult<T> {
        match self {
            Ack::Accepted(v) => Ok(v),
            Ack::Declined { message } => {
                Err(BusinessRejection::Declined { action, message }.into())
            }
        }
    }
}

/// Server view of today's attendance, as returned by the status query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerAttendanceStatus {
    pub session: AttendanceSession,
    pub open_visit: Option<VisitRecord>,
}

/// Opaque ids come back as strings or numbers depending on the endpoint.
pub fn id_string(v: &Option<Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn malformed(msg: &str) -> AppError {
    AppError::Transport(TransportError::Malformed(msg.to_string()))
}

/// First row of a reply. Arrays are the norm; a bare object is tolerated.
fn rows(body: Value) -> AppResult<Vec<ReplyRow>> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(|e| malformed(&e.to_string())))
            .collect(),
        v @ Value::Object(_) => Ok(vec![
            serde_json::from_value(v).map_err(|e| malformed(&e.to_string()))?,
        ]),
        other => Err(malformed(&format!("unexpected reply: {}", other))),
    }
}

fn first_row(body: Value) -> AppResult<ReplyRow> {
    let row = rows(body)?
        .into_iter()
        .next()
        .ok_or_else(|| malformed("empty reply"))?;
    if row.status.is_none() {
        return Err(malformed("reply without STATUS"));
    }
    Ok(row)
}

pub fn decode_punch_in(body: Value) -> AppResult<PunchInReply> {
    let row = first_row(body)?;

    if row.status_is(STATUS_SUCCESS) && row.msg_is(MSG_PUNCH_IN) {
        let attendance_id =
            id_string(&row.id).ok_or_else(|| malformed("punch-in accepted without Id"))?;
        return Ok(PunchInReply::Accepted { attendance_id });
    }

    // Anything else, success-shaped or not, is the "day already closed" rule.
    Ok(PunchInReply::AlreadyPunchedOut {
        message: row.message(),
    })
}

/// Break-in yields the new break id; break-out yields nothing.
pub fn decode_break(body: Value, direction: Direction) -> AppResult<Ack<Option<String>>> {
    let row = first_row(body)?;
    let expected = match direction {
        Direction::In => MSG_BREAK_IN,
        Direction::Out => MSG_BREAK_OUT,
    };

    if !(row.status_is(STATUS_SUCCESS) && row.msg_is(expected)) {
        return Ok(Ack::Declined {
            message: row.message(),
        });
    }

    match direction {
        Direction::In => {
            let break_id = id_string(&row.id_break)
                .ok_or_else(|| malformed("break-in accepted without id_break"))?;
            Ok(Ack::Accepted(Some(break_id)))
        }
        Direction::Out => Ok(Ack::Accepted(None)),
    }
}

pub fn decode_punch_out(body: Value) -> AppResult<Ack<()>> {
    let row = first_row(body)?;
    if row.status_is(STATUS_SUCCESS) && row.msg_is(MSG_PUNCH_OUT) {
        Ok(Ack::Accepted(()))
    } else {
        Ok(Ack::Declined {
            message: row.message(),
        })
    }
}

/// Visit-in yields the `ev_id`; visit-out yields nothing.
pub fn decode_visit(body: Value, direction: Direction) -> AppResult<Ack<Option<String>>> {
    let row = first_row(body)?;
    if !row.status_is(STATUS_VISIT_SUCCESS) {
        return Ok(Ack::Declined {
            message: row.message(),
        });
    }

    match direction {
        Direction::In => {
            let ev_id =
                id_string(&row.ev_id).ok_or_else(|| malformed("visit-in accepted without ev_id"))?;
            Ok(Ack::Accepted(Some(ev_id)))
        }
        Direction::Out => Ok(Ack::Accepted(None)),
    }
}

/// Followup replies only agree on STATUS; its case varies between releases.
pub fn decode_followup(body: Value) -> AppResult<Ack<Option<String>>> {
    let row = first_row(body)?;
    let accepted = row
        .status
        .as_deref()
        .map(|s| s.trim().eq_ignore_ascii_case(STATUS_SUCCESS))
        .unwrap_or(false);

    if accepted {
        Ok(Ack::Accepted(
            id_string(&row.followup_id).or_else(|| id_string(&row.id)),
        ))
    } else {
        Ok(Ack::Declined {
            message: row.message(),
        })
    }
}

/// An empty array means nothing is recorded for today.
pub fn decode_status(body: Value) -> AppResult<ServerAttendanceStatus> {
    let Some(row) = rows(body)?.into_iter().next() else {
        return Ok(ServerAttendanceStatus::default());
    };

    let attendance_id = id_string(&row.id);
    let punch_in_at = row.punch_in.as_deref().and_then(parse_server_ts);
    let punch_out_at = row.punch_out.as_deref().and_then(parse_server_ts);

    // A break can only be open inside an open attendance window.
    let break_id = if punch_in_at.is_some() && punch_out_at.is_none() {
        id_string(&row.id_break)
    } else {
        None
    };

    let session = AttendanceSession {
        attendance_id: if punch_out_at.is_some() {
            None
        } else {
            attendance_id
        },
        punch_in_at,
        punch_out_at,
        break_id,
    };

    let open_visit = match (id_string(&row.ev_id), id_string(&row.reference_id)) {
        (Some(ev_id), Some(lead_id)) => Some(VisitRecord::open(ev_id, &lead_id, None)),
        _ => None,
    };

    Ok(ServerAttendanceStatus {
        session,
        open_visit,
    })
}

#[derive(Debug, Deserialize)]
struct RawInterval {
    start: String,
    #[serde(default)]
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawVisit {
    lead_id: Value,
    start: String,
    #[serde(default)]
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawHistoryRecord {
    date: String,
    #[serde(default)]
    login: Option<String>,
    #[serde(default)]
    logout: Option<String>,
    #[serde(default)]
    breaks: Vec<RawInterval>,
    #[serde(default)]
    visits: Vec<RawVisit>,
}

fn interval(start: &str, end: Option<&str>) -> AppResult<Interval> {
    let start = parse_server_ts(start)
        .ok_or_else(|| malformed(&format!("bad interval start: {}", start)))?;
    Ok(Interval::new(start, end.and_then(parse_server_ts)))
}

pub fn decode_report(body: Value) -> AppResult<Vec<AttendanceHistoryRecord>> {
    let raw: Vec<RawHistoryRecord> =
        serde_json::from_value(body).map_err(|e| malformed(&e.to_string()))?;

    raw.into_iter()
        .map(|r| {
            let date: NaiveDate = parse_date(&r.date)
                .ok_or_else(|| malformed(&format!("bad report date: {}", r.date)))?;

            let breaks = r
                .breaks
                .iter()
                .map(|b| interval(&b.start, b.end.as_deref()))
                .collect::<AppResult<Vec<_>>>()?;

            let visits = r
                .visits
                .iter()
                .map(|v| {
                    let lead_id = id_string(&Some(v.lead_id.clone()))
                        .ok_or_else(|| malformed("visit without lead_id"))?;
                    Ok(VisitInterval {
                        lead_id,
                        interval: interval(&v.start, v.end.as_deref())?,
                    })
                })
                .collect::<AppResult<Vec<_>>>()?;

            Ok(AttendanceHistoryRecord {
                date,
                login: r.login.as_deref().and_then(parse_server_ts),
                logout: r.logout.as_deref().and_then(parse_server_ts),
                breaks,
                visits,
            })
        })
        .collect()
}
