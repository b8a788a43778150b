use crate::errors::AppResult;
use chrono::Local;
use rusqlite::Connection;
use rusqlite::params;

/// Write an audit line into the `log` table.
pub fn ttlog(conn: &Connection, operation: &str, target: &str, message: &str) -> AppResult<()> {
    let now = Local::now().to_rfc3339();

    let mut stmt = conn.prepare_cached(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    stmt.execute(params![now, operation, target, message])?;

    Ok(())
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub id: i64,
    pub date: String,
    pub operation: String,
    pub target: String,
    pub message: String,
}

/// Audit lines in insertion order, optionally filtered by operation.
pub fn load_log(conn: &Connection, operation: Option<&str>) -> AppResult<Vec<LogEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, date, operation, IFNULL(target, ''), message FROM log
         WHERE ?1 IS NULL OR operation = ?1
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![operation], |row| {
        Ok(LogEntry {
            id: row.get(0)?,
            date: row.get(1)?,
            operation: row.get(2)?,
            target: row.get(3)?,
            message: row.get(4)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
