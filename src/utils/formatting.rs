//! Formatting utilities used for CLI outputs.

use regex::Regex;

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// Minutes as `HH:MM`. Negative values are shown without a sign.
pub fn mins2readable(mins: i64) -> String {
    let abs_m = mins.abs();
    format!("{:02}:{:02}", abs_m / 60, abs_m % 60)
}

/// Drop ANSI color sequences, for width calculations.
pub fn strip_ansi(s: &str) -> String {
    match Regex::new(r"\x1B\[[0-9;]*[mK]") {
        Ok(re) => re.replace_all(s, "").into_owned(),
        Err(_) => s.to_string(),
    }
}
