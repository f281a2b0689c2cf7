//! SQLite implementation of the request tracker.

use async_trait::async_trait;
use northwind_core::{parse_timestamp, CoreError, CoreResult, RequestTracker, TrackingEntry};
use sqlx::{query, Row, SqlitePool};
use tokio::sync::Mutex;

use crate::util::map_sqlx_error;

/// Writes tracking entries to the `web_tracker` table.
///
/// Inserts go through one async mutex so identifiers are handed out in
/// strict order even when many requests arrive at once.
pub struct SqliteRequestTracker {
    pool: SqlitePool,
    writer: Mutex<()>,
}

impl SqliteRequestTracker {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            writer: Mutex::new(()),
        }
    }
}

#[async_trait]
impl RequestTracker for SqliteRequestTracker {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn track(&self, url_request: &str, source_ip: &str) -> CoreResult<TrackingEntry> {
        let mut entry = TrackingEntry::new(0, url_request, source_ip);

        let _guard = self.writer.lock().await;
        let row = query(
            "INSERT INTO web_tracker (url_request, source_ip, time_of_action)
             VALUES (?1, ?2, ?3) RETURNING id",
        )
        .bind(&entry.url_request)
        .bind(&entry.source_ip)
        .bind(entry.timestamp_text())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        entry.id = row
            .try_get("id")
            .map_err(|e| CoreError::internal(e.to_string()))?;
        Ok(entry)
    }

    async fn recent(&self, limit: usize) -> CoreResult<Vec<TrackingEntry>> {
        let rows = query(
            "SELECT id, url_request, source_ip, time_of_action
             FROM web_tracker ORDER BY id DESC LIMIT ?1",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| {
                let time_of_action: String = row
                    .try_get("time_of_action")
                    .map_err(|e| CoreError::internal(e.to_string()))?;
                Ok(TrackingEntry {
                    id: row
                        .try_get("id")
                        .map_err(|e| CoreError::internal(e.to_string()))?,
                    url_request: row
                        .try_get("url_request")
                        .map_err(|e| CoreError::internal(e.to_string()))?,
                    source_ip: row
                        .try_get("source_ip")
                        .map_err(|e| CoreError::internal(e.to_string()))?,
                    time_of_action: parse_timestamp(&time_of_action)
                        .map_err(|e| CoreError::internal(e.to_string()))?,
                })
            })
            .collect()
    }
}
