use async_trait::async_trait;
use northwind_core::{ConnectionProbe, CoreResult};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};

use crate::util::map_sqlx_error;

/// Reachability check that bypasses the pool.
///
/// Every call opens its own connection, runs `SELECT 1`, and closes it, so
/// consecutive attempts never share state.
pub struct SqliteConnectionProbe {
    options: SqliteConnectOptions,
}

impl SqliteConnectionProbe {
    #[must_use]
    pub fn new(options: SqliteConnectOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl ConnectionProbe for SqliteConnectionProbe {
    async fn probe(&self) -> CoreResult<()> {
        let mut conn = SqliteConnection::connect_with(&self.options)
            .await
            .map_err(map_sqlx_error)?;

        sqlx::query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(map_sqlx_error)?;

        conn.close().await.map_err(map_sqlx_error)
    }
}
