use std::fmt;

use crate::errors::AppError;

/// ANSI colors
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const FG_BLUE: &str = "\x1b[34m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";
const FG_MAGENTA: &str = "\x1b[35m";

/// Icons
const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";
const ICON_GEO: &str = "📍";
const ICON_SPLIT: &str = "🧩";

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", FG_BLUE, BOLD, ICON_INFO, RESET, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", FG_GREEN, BOLD, ICON_OK, RESET, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", FG_YELLOW, BOLD, ICON_WARN, RESET, msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}{}{} {}{}", FG_RED, BOLD, ICON_ERR, RESET, msg);
}

/// Formatted section header
pub fn header<T: fmt::Display>(msg: T) {
    println!(
        "{}{}====================== {}\n{}",
        FG_BLUE, BOLD, msg, RESET
    );
}

/// Print an engine failure as the toast the user should see.
/// Location problems and half-finished checkouts get their own icon so they
/// stand out from generic failures.
pub fn report_error(e: &AppError) {
    match e {
        AppError::Location(_) => {
            eprintln!("{}{}{} {}{}", FG_YELLOW, BOLD, ICON_GEO, RESET, e);
        }
        AppError::InconsistentState { .. } => {
            eprintln!("{}{}{} {}{}", FG_MAGENTA, BOLD, ICON_SPLIT, RESET, e);
        }
        AppError::Rejected(_) | AppError::Busy(_) => {
            eprintln!("{}{}{} {}{}", FG_YELLOW, BOLD, ICON_WARN, RESET, e);
        }
        _ => error(e),
    }
}
