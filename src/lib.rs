pub mod data;
pub mod error;
pub mod models;
pub mod services;

use std::path::PathBuf;

use error::AppError;

/// Opens (creating if needed) the app's sqlite store in the platform data
/// directory and runs migrations.
pub fn init_db() -> Result<(rusqlite::Connection, PathBuf), AppError> {
    let dirs = directories::ProjectDirs::from("", "", "tivowatch")
        .ok_or_else(|| AppError::General("could not resolve app data dir".to_string()))?;
    let app_dir = dirs.data_dir().to_path_buf();
    std::fs::create_dir_all(&app_dir)?;
    let db_path = app_dir.join("tivowatch.db");
    let conn = rusqlite::Connection::open(&db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    data::migrations::run_migrations(&conn)?;
    Ok((conn, db_path))
}
