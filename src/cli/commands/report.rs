use serde_json::json;

use crate::cli::app::App;
use crate::cli::parser::Commands;
use crate::core::report::{render, totals};
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::date::{current_month_bounds, period_bounds, range_bounds};

pub async fn handle(cmd: &Commands, app: &App) -> AppResult<()> {
    let Commands::Report {
        period,
        range,
        json,
    } = cmd
    else {
        return Ok(());
    };

    let (from, to) = match (period, range) {
        (Some(p), _) => period_bounds(p)?,
        (None, Some(r)) => range_bounds(r)?,
        (None, None) => current_month_bounds()?,
    };

    let rows = app.reports.load(from, to).await?;

    if *json {
        let out = json!({
            "employee_id": app.ctx.employee_id(),
            "from": from.format("%Y-%m-%d").to_string(),
            "to": to.format("%Y-%m-%d").to_string(),
            "rows": rows,
            "totals": totals(&rows),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    header(format!("Attendance report {} → {}", from, to));
    if rows.is_empty() {
        info("No attendance recorded in this period.");
        return Ok(());
    }
    print!("{}", render(&rows));
    Ok(())
}
