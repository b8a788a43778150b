//! SQLite connection wrapper (lightweight for CLI usage).

use rusqlite::{Connection, Result};
use std::path::Path;

use crate::db::initialize::init_db;
use crate::errors::AppResult;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        Ok(Self { conn })
    }

    /// Open and bring the schema up to date in one step.
    pub fn open_initialized(path: &str) -> AppResult<Self> {
        if let Some(dir) = Path::new(path).parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        let pool = Self::new(path)?;
        init_db(&pool.conn)?;
        Ok(pool)
    }
}
