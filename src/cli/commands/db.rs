use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::migrate::{pending_migrations, run_pending_migrations};
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success, warning};

/// Maintenance of the local cache: schema upgrades, integrity and size.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Db {
        migrate,
        check,
        vacuum,
        info: show_info,
    } = cmd
    else {
        return Ok(());
    };

    let mut pool = DbPool::new(&cfg.database)?;

    if *migrate {
        let pending = pending_migrations(&pool.conn)?;
        if pending.is_empty() {
            info("Cache schema is up to date.");
        } else {
            info(format!("Applying {} migration(s): {}", pending.len(), pending.join(", ")));
            run_pending_migrations(&pool.conn)?;
        }
        success("Migration completed.");
    }

    if *show_info {
        stats::print_db_info(&mut pool, &cfg.database)?;
    }

    if *check {
        let integrity: String = pool
            .conn
            .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;
        if integrity == "ok" {
            success("Integrity check passed.");
        } else {
            error(format!("Integrity check failed: {}", integrity));
        }

        let pending = pending_migrations(&pool.conn)?;
        if !pending.is_empty() {
            warning(format!(
                "Cache schema is behind ({}); run `fieldtrack db --migrate`.",
                pending.join(", ")
            ));
        }
    }

    if *vacuum {
        // Snapshot rows are rewritten on every command; reclaim the churn.
        pool.conn.execute_batch("VACUUM;")?;
        success("Vacuum completed.");
    }

    Ok(())
}
