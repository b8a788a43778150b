//! `login` / `logout`: who the tracked actions are recorded for.
//!
//! Both start the day from an empty store; the next command hydrates it
//! from the server.

use std::path::Path;

use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::clear_snapshot;
use crate::errors::{AppError, AppResult};
use crate::models::identity::EmployeeRole;
use crate::ui::messages::{info, success};

pub fn handle_login(cmd: &Commands, cfg: &Config, config_path: &Path) -> AppResult<()> {
    let Commands::Login { employee, role } = cmd else {
        return Ok(());
    };

    let employee = employee.trim();
    if employee.is_empty() {
        return Err(AppError::Config("employee id must not be empty".into()));
    }

    let role = match role {
        Some(code) => EmployeeRole::from_code(code)
            .ok_or_else(|| AppError::Config(format!("unknown role '{}'", code)))?,
        None => cfg.role,
    };

    let mut updated = cfg.clone();
    updated.employee_id = employee.to_string();
    updated.role = role;
    updated.save_to(config_path)?;

    let pool = DbPool::open_initialized(&cfg.database)?;
    clear_snapshot(&pool.conn)?;
    ttlog(
        &pool.conn,
        "login",
        employee,
        &format!("Logged in as {} ({})", employee, role.as_str()),
    )?;

    success(format!("Logged in as {} ({})", employee, role.as_str()));
    Ok(())
}

pub fn handle_logout(cfg: &Config, config_path: &Path) -> AppResult<()> {
    let previous = cfg.employee_id.clone();

    let mut updated = cfg.clone();
    updated.employee_id.clear();
    updated.save_to(config_path)?;

    let pool = DbPool::open_initialized(&cfg.database)?;
    clear_snapshot(&pool.conn)?;

    if previous.is_empty() {
        info("No employee was logged in.");
    } else {
        ttlog(&pool.conn, "logout", &previous, "Logged out")?;
        success(format!("Logged out {}", previous));
    }
    Ok(())
}
