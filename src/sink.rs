//! Response persistence
//!
//! Writes submitted rating batches to the analytics store. The contract is
//! at-most-once: one batch attempt per submission, per-row failures are
//! reported back to the caller, and nothing is retried. The submit handler
//! logs failures for the operator and advances the session regardless, so a
//! failed write is invisible to the rater.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::responses::ResponseRecord;

/// One rejected row from a batch write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// Position of the failed record within the submitted batch
    pub index: usize,
    pub message: String,
}

/// Sink for response record batches
///
/// Implementations attempt the whole batch once and report per-row failures
/// instead of aborting; `Ok(vec![])` means every row was accepted.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn persist(&self, records: &[ResponseRecord]) -> Result<Vec<RowError>>;
}

/// SQLite-backed response sink
pub struct SqliteSink {
    pool: SqlitePool,
}

impl SqliteSink {
    /// Open (creating if missing) the responses database and ensure the
    /// schema exists.
    pub async fn connect(db_path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        let sink = Self::new(pool);
        sink.init_schema().await?;
        info!("Responses database ready: {}", db_path.display());
        Ok(sink)
    }

    /// Wrap an existing pool (used by tests with an in-memory database)
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                participant_id TEXT NOT NULL,
                instance_id INTEGER NOT NULL,
                question_label TEXT NOT NULL,
                response_value TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ResponseSink for SqliteSink {
    async fn persist(&self, records: &[ResponseRecord]) -> Result<Vec<RowError>> {
        // Empty batch is a no-op success, the store is not touched
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut errors = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let result = sqlx::query(
                r#"
                INSERT INTO responses (
                    participant_id, instance_id, question_label,
                    response_value, timestamp
                ) VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.participant_id)
            .bind(record.instance_id)
            .bind(record.question_label.as_str())
            .bind(&record.response_value)
            .bind(record.timestamp.to_rfc3339())
            .execute(&self.pool)
            .await;

            if let Err(e) = result {
                errors.push(RowError {
                    index,
                    message: e.to_string(),
                });
            }
        }
        Ok(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::{collect, RatingLabel};

    async fn memory_sink() -> SqliteSink {
        // Single persistent connection: an in-memory database exists per
        // connection, so the pool must never open a second one
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("Should open in-memory database");
        let sink = SqliteSink::new(pool);
        sink.init_schema().await.expect("Should create schema");
        sink
    }

    fn sample_batch() -> Vec<ResponseRecord> {
        collect(
            &[
                (RatingLabel::CoherenceRating, "Coherent".to_string()),
                (RatingLabel::CareRating, "Caring".to_string()),
                (RatingLabel::CorrectnessRating, "Correct".to_string()),
            ],
            "p1",
            7,
        )
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop_success() {
        let sink = memory_sink().await;
        let errors = sink.persist(&[]).await.unwrap();
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_batch_write_stores_all_rows() {
        let sink = memory_sink().await;
        let errors = sink.persist(&sample_batch()).await.unwrap();
        assert!(errors.is_empty());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM responses")
            .fetch_one(&sink.pool)
            .await
            .unwrap();
        assert_eq!(count, 3);

        let label: String = sqlx::query_scalar(
            "SELECT question_label FROM responses WHERE instance_id = 7 LIMIT 1",
        )
        .fetch_one(&sink.pool)
        .await
        .unwrap();
        assert_eq!(label, "coherence_rating");
    }

    #[tokio::test]
    async fn test_row_failures_are_surfaced_not_raised() {
        let sink = memory_sink().await;
        sqlx::query("DROP TABLE responses")
            .execute(&sink.pool)
            .await
            .unwrap();

        let batch = sample_batch();
        let errors = sink.persist(&batch).await.unwrap();
        assert_eq!(errors.len(), batch.len());
        assert_eq!(errors[0].index, 0);
        assert!(!errors[0].message.is_empty());
    }
}
