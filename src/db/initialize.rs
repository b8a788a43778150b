use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;

/// Initialize the local cache.
/// Delegates all schema creation / upgrades to the migration engine.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    run_pending_migrations(conn)?;
    Ok(())
}
