use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_kb = (file_size as f64) / 1024.0;

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.1} KB", CYAN, RESET, file_kb);

    //
    // 2) AUDIT LINES
    //
    let count: i64 = pool.conn.query_row(
        "SELECT COUNT(*) FROM log WHERE operation <> 'migration_applied'",
        [],
        |row| row.get(0),
    )?;
    println!("{}• Audit lines:{} {}{}{}", CYAN, RESET, GREEN, count, RESET);

    //
    // 3) CACHED SESSION
    //
    let cached: Option<(String, String)> = pool
        .conn
        .query_row(
            "SELECT employee_id, updated_at FROM session_cache WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match cached {
        Some((employee, updated)) => {
            println!("{}• Cached session:{} employee {} (updated {})", CYAN, RESET, employee, updated)
        }
        None => println!("{}• Cached session:{} {GREY}--{RESET}", CYAN, RESET),
    }

    //
    // 4) OPEN VISIT
    //
    let visit: Option<(String, String)> = pool
        .conn
        .query_row(
            "SELECT reference_id, phase FROM visit_slot WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match visit {
        Some((lead, phase)) => println!("{}• Open visit:{} lead {} ({})", CYAN, RESET, lead, phase),
        None => println!("{}• Open visit:{} {GREY}--{RESET}", CYAN, RESET),
    }

    println!();
    Ok(())
}
