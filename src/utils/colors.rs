/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Grey out placeholders (`--:--`), leave real values alone.
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--:--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}

/// Green for an enabled control, grey for a disabled one.
pub fn colorize_flag(label: &str, enabled: bool) -> String {
    if enabled {
        format!("{GREEN}{label}{RESET}")
    } else {
        format!("{GREY}{label}{RESET}")
    }
}

/// Yellow marker for rows with an interval that never closed.
pub fn colorize_open(value: &str, open: bool) -> String {
    if open {
        format!("{YELLOW}{value}{RESET}")
    } else {
        value.to_string()
    }
}
