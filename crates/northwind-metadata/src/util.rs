use std::time::Duration;

use northwind_core::CoreError;
use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::MIGRATOR;

/// Parses `database_url` into connection options shared by the pool and the
/// health probe.
pub fn connect_options(
    database_url: &str,
    create_if_missing: bool,
) -> Result<SqliteConnectOptions, sqlx::Error> {
    Ok(database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(create_if_missing)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true))
}

/// Creates a lazily-connecting pool.
///
/// No connection is opened here, so an unreachable database never fails
/// construction; each query acquires its own connection and surfaces the
/// failure to the caller.
pub fn create_sqlite_pool(
    options: SqliteConnectOptions,
    max_connections: u32,
    acquire_timeout: Duration,
) -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_lazy_with(options)
}

/// Runs all outstanding migrations against the provided connection pool.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Maps a query failure onto the core taxonomy.
///
/// Connection-level failures become `Unavailable`; everything else is
/// `Internal`.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> CoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => CoreError::unavailable("sqlite", err.to_string()),
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            if message.contains("unable to open database") {
                CoreError::unavailable("sqlite", message)
            } else {
                CoreError::internal(message)
            }
        }
        other => CoreError::internal(other.to_string()),
    }
}
