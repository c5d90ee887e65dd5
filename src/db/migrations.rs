//! Opening the post database and bootstrapping its schema.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

const SCHEMA: &str = include_str!("schema.sql");

/// Open the SQLite file at `db_path`, creating it and any missing parent
/// directories, then make sure the `posts` table exists.
///
/// # Errors
/// `sqlx::Error::Io` if a parent directory cannot be created; any connect or
/// schema error otherwise.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    let path = Path::new(db_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    apply_schema(&pool).await?;
    info!(path = %db_path, "Post database ready");
    Ok(pool)
}

/// Every statement in the schema is `IF NOT EXISTS`; existing rows survive a rerun.
async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty());
    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
