use std::path::Path;

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the configuration file (kept as is when it already exists)
///  - the local SQLite cache and all pending migrations
pub fn handle(cli: &Cli, config_path: &Path) -> AppResult<()> {
    let mut cfg = Config::load_from(config_path)?;
    if let Some(custom) = &cli.db {
        cfg.database = custom.clone();
    }

    println!("⚙️  Initializing fieldtrack…");
    println!("📄 Config file : {}", config_path.display());
    println!("🗄️  Database   : {}", &cfg.database);

    if !config_path.exists() || cli.db.is_some() {
        cfg.save_to(config_path)?;
    }

    let pool = DbPool::open_initialized(&cfg.database)?;
    success(format!("Database initialized at {}", &cfg.database));

    if let Err(e) = log::ttlog(
        &pool.conn,
        "init",
        "Database initialized",
        &format!("Database initialized at {}", &cfg.database),
    ) {
        warning(format!("Failed to write internal log: {}", e));
    }

    println!("🎉 fieldtrack initialization completed!");
    Ok(())
}
