//! Read-only projection of attendance history into report rows.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::api::Transport;
use crate::core::context::TrackingContext;
use crate::core::geo::LocationProvider;
use crate::errors::AppResult;
use crate::models::history::AttendanceHistoryRecord;
use crate::utils::colors::colorize_open;
use crate::utils::formatting::mins2readable;
use crate::utils::table::{Column, Table};
use crate::utils::time::hhmm_or_placeholder;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub login: Option<NaiveDateTime>,
    pub logout: Option<NaiveDateTime>,
    pub break_count: usize,
    pub break_minutes: i64,
    /// logout − login − closed breaks; zero while the day is still open.
    pub worked_minutes: i64,
    pub visit_count: usize,
    pub visit_minutes: i64,
    /// Some interval of the day (attendance, break or visit) never closed.
    pub has_open_interval: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub days: usize,
    pub break_minutes: i64,
    pub worked_minutes: i64,
    pub visit_count: usize,
    pub visit_minutes: i64,
    pub open_days: usize,
}

pub struct AttendanceReportProjector<T: Transport, P: LocationProvider> {
    ctx: Arc<TrackingContext<T, P>>,
}

impl<T: Transport, P: LocationProvider> AttendanceReportProjector<T, P> {
    pub fn new(ctx: Arc<TrackingContext<T, P>>) -> Self {
        Self { ctx }
    }

    /// Fetch the acting employee's history for `[from, to]` and project it.
    pub async fn load(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<ReportRow>> {
        let records = self
            .ctx
            .client
            .attendance_report(self.ctx.employee_id(), from, to)
            .await?;
        Ok(project(&records))
    }
}

pub fn project_record(r: &AttendanceHistoryRecord) -> ReportRow {
    let break_minutes: i64 = r.breaks.iter().map(|b| b.minutes()).sum();
    let visit_minutes: i64 = r.visits.iter().map(|v| v.interval.minutes()).sum();

    let worked_minutes = match (r.login, r.logout) {
        (Some(login), Some(logout)) if logout > login => {
            ((logout - login).num_minutes() - break_minutes).max(0)
        }
        _ => 0,
    };

    let has_open_interval = (r.login.is_some() && r.logout.is_none())
        || r.breaks.iter().any(|b| b.is_open())
        || r.visits.iter().any(|v| v.interval.is_open());

    ReportRow {
        date: r.date,
        login: r.login,
        logout: r.logout,
        break_count: r.breaks.len(),
        break_minutes,
        worked_minutes,
        visit_count: r.visits.len(),
        visit_minutes,
        has_open_interval,
    }
}

/// One row per day, oldest first.
pub fn project(records: &[AttendanceHistoryRecord]) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = records.iter().map(project_record).collect();
    rows.sort_by_key(|r| r.date);
    rows
}

pub fn totals(rows: &[ReportRow]) -> ReportTotals {
    rows.iter().fold(ReportTotals::default(), |mut acc, r| {
        acc.days += 1;
        acc.break_minutes += r.break_minutes;
        acc.worked_minutes += r.worked_minutes;
        acc.visit_count += r.visit_count;
        acc.visit_minutes += r.visit_minutes;
        if r.has_open_interval {
            acc.open_days += 1;
        }
        acc
    })
}

pub fn render(rows: &[ReportRow]) -> String {
    let mut table = Table::new(vec![
        Column::new("DATE", 10),
        Column::new("LOGIN", 5),
        Column::new("LOGOUT", 6),
        Column::new("BREAKS", 6),
        Column::new("BREAK", 7),
        Column::new("WORKED", 7),
        Column::new("VISITS", 6),
        Column::new("VISITED", 7),
    ]);

    for r in rows {
        table.add_row(vec![
            colorize_open(&r.date.format("%Y-%m-%d").to_string(), r.has_open_interval),
            hhmm_or_placeholder(r.login.as_ref()),
            hhmm_or_placeholder(r.logout.as_ref()),
            r.break_count.to_string(),
            mins2readable(r.break_minutes),
            mins2readable(r.worked_minutes),
            r.visit_count.to_string(),
            mins2readable(r.visit_minutes),
        ]);
    }

    let t = totals(rows);
    table.add_row(vec![
        format!("{} days", t.days),
        String::new(),
        String::new(),
        String::new(),
        mins2readable(t.break_minutes),
        mins2readable(t.worked_minutes),
        t.visit_count.to_string(),
        mins2readable(t.visit_minutes),
    ]);

    table.render()
}
