use chrono::{Datelike, NaiveDate};

use crate::errors::{AppError, AppResult};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// First and last day covered by a period: `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
pub fn period_bounds(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    // YYYY-MM-DD
    if let Some(d) = parse_date(p) {
        return Ok((d, d));
    }

    // YYYY-MM
    if let Some(first) = parse_date(&format!("{}-01", p)) {
        return Ok((first, last_day_of_month(first.year(), first.month())?));
    }

    // YYYY
    if let Ok(year) = p.parse::<i32>()
        && let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        )
    {
        return Ok((first, last));
    }

    Err(AppError::InvalidDate(format!("Invalid period: {}", p)))
}

/// Bounds of a `start:end` range where each side is a period.
pub fn range_bounds(range: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    match range.split_once(':') {
        Some((start, end)) => {
            let (from, _) = period_bounds(start)?;
            let (_, to) = period_bounds(end)?;
            if to < from {
                return Err(AppError::InvalidDate(format!(
                    "Range end precedes start: {}",
                    range
                )));
            }
            Ok((from, to))
        }
        None => period_bounds(range),
    }
}

pub fn current_month_bounds() -> AppResult<(NaiveDate, NaiveDate)> {
    let t = today();
    period_bounds(&t.format("%Y-%m").to_string())
}

fn last_day_of_month(year: i32, month: u32) -> AppResult<NaiveDate> {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| AppError::InvalidDate(format!("{}-{:02}", year, month)))
}
