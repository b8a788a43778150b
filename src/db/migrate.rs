use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists. Applied migrations are recorded in it,
/// so it has to exist before anything else runs.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_session_cache",
        description: "Created session_cache table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS session_cache (
                id             INTEGER PRIMARY KEY CHECK (id = 1),
                employee_id    TEXT NOT NULL,
                attendance_id  TEXT,
                punch_in_at    TEXT,
                punch_out_at   TEXT,
                break_id       TEXT,
                punch_in_locked INTEGER NOT NULL DEFAULT 0,
                updated_at     TEXT NOT NULL
            );
        "#,
    },
    Migration {
        version: "20250318_0002_visit_slot",
        description: "Created visit_slot table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS visit_slot (
                id             INTEGER PRIMARY KEY CHECK (id = 1),
                ev_id          TEXT NOT NULL,
                reference_id   TEXT NOT NULL,
                reference_type TEXT NOT NULL DEFAULT 'lead',
                opened_at      TEXT,
                phase          TEXT NOT NULL DEFAULT 'open'
                               CHECK (phase IN ('open', 'followup_recorded'))
            );
        "#,
    },
    Migration {
        version: "20250402_0003_log_indexes",
        description: "Added log indexes",
        sql: r#"
            CREATE INDEX IF NOT EXISTS idx_log_operation ON log(operation);
            CREATE INDEX IF NOT EXISTS idx_log_date ON log(date);
        "#,
    },
];

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(m.sql)?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [m.version, m.description],
    )?;
    tx.commit()?;

    success(format!("Migration applied: {} → {}", m.version, m.description));
    Ok(())
}

/// Versions not yet applied to this database, in order.
pub fn pending_migrations(conn: &Connection) -> Result<Vec<&'static str>> {
    ensure_log_table(conn)?;
    let mut out = Vec::new();
    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            out.push(m.version);
        }
    }
    Ok(out)
}

/// Public entry point: run all pending migrations.
///
/// Called by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            apply(conn, m)?;
        }
    }

    Ok(())
}
