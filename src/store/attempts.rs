//! Attempt record repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::ledger::AttemptRecord;
use crate::{GuardError, Result};

/// Attempt record row as stored. Timestamps are parsed on the way out so a
/// malformed row surfaces as `StorageCorrupt` instead of a decode panic.
#[derive(Debug, sqlx::FromRow)]
struct AttemptRow {
    identity: String,
    attempt_count: i64,
    last_attempt_at: String,
    blocked: bool,
}

impl TryFrom<AttemptRow> for AttemptRecord {
    type Error = GuardError;

    fn try_from(row: AttemptRow) -> Result<AttemptRecord> {
        let last_attempt_at = DateTime::parse_from_rfc3339(&row.last_attempt_at)
            .map_err(|e| {
                GuardError::StorageCorrupt(format!(
                    "bad timestamp for identity {}: {e}",
                    row.identity
                ))
            })?
            .with_timezone(&Utc);

        Ok(AttemptRecord {
            identity: row.identity,
            attempt_count: row.attempt_count.max(0) as u32,
            last_attempt_at,
            blocked: row.blocked,
        })
    }
}

/// Repository for attempt record CRUD operations.
pub struct AttemptRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AttemptRepository<'a> {
    /// Create a new AttemptRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the record for an identity, if any.
    pub async fn get(&self, identity: &str) -> Result<Option<AttemptRecord>> {
        let row = sqlx::query_as::<_, AttemptRow>(
            "SELECT identity, attempt_count, last_attempt_at, blocked
             FROM attempt_records WHERE identity = $1",
        )
        .bind(identity)
        .fetch_optional(self.pool)
        .await?;

        row.map(AttemptRecord::try_from).transpose()
    }

    /// Insert or replace the record for its identity.
    pub async fn upsert(&self, record: &AttemptRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO attempt_records (identity, attempt_count, last_attempt_at, blocked)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT(identity) DO UPDATE SET
                 attempt_count = excluded.attempt_count,
                 last_attempt_at = excluded.last_attempt_at,
                 blocked = excluded.blocked",
        )
        .bind(&record.identity)
        .bind(record.attempt_count as i64)
        .bind(record.last_attempt_at.to_rfc3339())
        .bind(record.blocked)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete the record for an identity. Returns whether a row existed.
    pub async fn delete(&self, identity: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM attempt_records WHERE identity = $1")
            .bind(identity)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every record. Returns the number of rows removed.
    pub async fn clear_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM attempt_records")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;

    fn sample_record(identity: &str, attempt_count: u32) -> AttemptRecord {
        AttemptRecord {
            identity: identity.to_string(),
            attempt_count,
            last_attempt_at: Utc::now(),
            blocked: attempt_count >= 5,
        }
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = AttemptRepository::new(db.pool());

        assert!(repo.get("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = AttemptRepository::new(db.pool());

        let record = sample_record("alice@example.com", 2);
        repo.upsert(&record).await.unwrap();

        let loaded = repo.get("alice@example.com").await.unwrap().unwrap();
        assert_eq!(loaded.identity, "alice@example.com");
        assert_eq!(loaded.attempt_count, 2);
        assert!(!loaded.blocked);
        // RFC 3339 round-trip keeps sub-second precision
        assert_eq!(loaded.last_attempt_at, record.last_attempt_at);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = AttemptRepository::new(db.pool());

        repo.upsert(&sample_record("bob@example.com", 1)).await.unwrap();
        repo.upsert(&sample_record("bob@example.com", 5)).await.unwrap();

        let loaded = repo.get("bob@example.com").await.unwrap().unwrap();
        assert_eq!(loaded.attempt_count, 5);
        assert!(loaded.blocked);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = AttemptRepository::new(db.pool());

        repo.upsert(&sample_record("carol@example.com", 3)).await.unwrap();

        assert!(repo.delete("carol@example.com").await.unwrap());
        assert!(repo.get("carol@example.com").await.unwrap().is_none());
        // Second delete is a no-op
        assert!(!repo.delete("carol@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_all() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = AttemptRepository::new(db.pool());

        repo.upsert(&sample_record("a@example.com", 1)).await.unwrap();
        repo.upsert(&sample_record("b@example.com", 2)).await.unwrap();

        assert_eq!(repo.clear_all().await.unwrap(), 2);
        assert!(repo.get("a@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_timestamp_is_storage_corrupt() {
        let db = Database::open_in_memory().await.unwrap();

        sqlx::query(
            "INSERT INTO attempt_records (identity, attempt_count, last_attempt_at, blocked)
             VALUES ('bad@example.com', 5, 'not-a-timestamp', 1)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let repo = AttemptRepository::new(db.pool());
        let result = repo.get("bad@example.com").await;
        assert!(matches!(result, Err(GuardError::StorageCorrupt(_))));
    }
}
