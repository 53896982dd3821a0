//! Remembered-identity slot repository.

use sqlx::SqlitePool;

use crate::Result;

/// The stored recall pair.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RecallSlot {
    /// Remembered identity string.
    pub identity: String,
    /// Persisted remember flag.
    pub remember: bool,
}

/// Repository for the single recall slot.
pub struct RecallRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RecallRepository<'a> {
    /// Create a new RecallRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the stored slot, if any.
    pub async fn get(&self) -> Result<Option<RecallSlot>> {
        let slot = sqlx::query_as::<_, RecallSlot>(
            "SELECT identity, remember FROM recall_slot WHERE id = 1",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(slot)
    }

    /// Store the slot, replacing any prior value.
    pub async fn set(&self, identity: &str, remember: bool) -> Result<()> {
        sqlx::query(
            "INSERT INTO recall_slot (id, identity, remember) VALUES (1, $1, $2)
             ON CONFLICT(id) DO UPDATE SET
                 identity = excluded.identity,
                 remember = excluded.remember",
        )
        .bind(identity)
        .bind(remember)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove the slot entirely. Returns whether a row existed.
    pub async fn clear(&self) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recall_slot WHERE id = 1")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
