use ansi_term::Colour;

use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::{LogEntry, load_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::formatting::strip_ansi;

fn color_for_operation(op: &str) -> Colour {
    match op {
        "punch_in" | "visit_in" => Colour::Green,
        "punch_out" | "visit_out" => Colour::Red,
        "break_in" | "break_out" => Colour::Yellow,
        "followup" => Colour::Cyan,
        "migration_applied" => Colour::Purple,
        "login" | "logout" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

fn op_target(e: &LogEntry) -> String {
    if e.target.is_empty() {
        e.operation.clone()
    } else {
        format!("{} ({})", e.operation, e.target)
    }
}

fn pad(s: &str, width: usize) -> String {
    let visible = strip_ansi(s).chars().count();
    if visible >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visible))
    }
}

pub fn print_log(pool: &DbPool, operation: Option<&str>) -> AppResult<()> {
    let entries = load_log(&pool.conn, operation)?;
    if entries.is_empty() {
        info("The internal log is empty.");
        return Ok(());
    }

    let dates: Vec<String> = entries
        .iter()
        .map(|e| {
            chrono::DateTime::parse_from_rfc3339(&e.date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or_else(|_| e.date.clone())
        })
        .collect();

    let id_w = entries.iter().map(|e| e.id.to_string().len()).max().unwrap_or(2);
    let date_w = dates.iter().map(String::len).max().unwrap_or(10);
    let op_w = entries
        .iter()
        .map(|e| op_target(e).len())
        .max()
        .unwrap_or(10)
        .min(60);

    println!("📜 Internal log:\n");
    for (e, date) in entries.iter().zip(dates.iter()) {
        let colour = color_for_operation(&e.operation);
        let op = colour.paint(op_target(e)).to_string();
        println!(
            "{:>id_w$}: {:<date_w$} | {} => {}",
            e.id,
            date,
            pad(&op, op_w),
            e.message,
            id_w = id_w,
            date_w = date_w,
        );
    }
    println!();
    Ok(())
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log {
        print: true,
        operation,
    } = cmd
    {
        let pool = DbPool::open_initialized(&cfg.database)?;
        print_log(&pool, operation.as_deref())?;
    }

    Ok(())
}
