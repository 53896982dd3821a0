//! Remembered-identity preference for gatelock.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::store::RecallRepository;
use crate::{GuardError, Result};

/// Single-slot "remember this identity" preference store.
///
/// Independent of the attempt ledger. The slot is overwritten wholesale on
/// every update; there is no history and no expiry.
#[derive(Debug, Clone)]
pub struct IdentityRecall {
    pool: SqlitePool,
}

impl IdentityRecall {
    /// Create a recall store over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store or clear the remembered identity.
    ///
    /// With `remember = true` the pair replaces any prior value. With
    /// `remember = false` the stored value is removed entirely, regardless
    /// of which identity was previously stored.
    pub async fn set_remembered(&self, identity: &str, remember: bool) -> Result<()> {
        let repo = RecallRepository::new(&self.pool);

        if remember {
            repo.set(identity, true).await?;
            debug!(identity = %identity, "remembered identity");
        } else if repo.clear().await? {
            debug!("cleared remembered identity");
        }

        Ok(())
    }

    /// The remembered identity, if the persisted flag is set.
    pub async fn get_remembered(&self) -> Result<Option<String>> {
        let repo = RecallRepository::new(&self.pool);
        let slot = match repo.get().await {
            Ok(slot) => slot,
            Err(GuardError::StorageCorrupt(msg)) => {
                warn!(error = %msg, "corrupt recall slot, clearing");
                repo.clear().await?;
                None
            }
            Err(e) => return Err(e),
        };

        Ok(slot.filter(|s| s.remember).map(|s| s.identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;

    async fn test_recall() -> (IdentityRecall, Database) {
        let db = Database::open_in_memory().await.unwrap();
        (IdentityRecall::new(db.pool().clone()), db)
    }

    #[tokio::test]
    async fn test_empty_slot_returns_none() {
        let (recall, _db) = test_recall().await;

        assert!(recall.get_remembered().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let (recall, _db) = test_recall().await;

        recall.set_remembered("a@b.com", true).await.unwrap();
        assert_eq!(
            recall.get_remembered().await.unwrap().as_deref(),
            Some("a@b.com")
        );
    }

    #[tokio::test]
    async fn test_remember_false_clears_slot() {
        let (recall, _db) = test_recall().await;

        recall.set_remembered("a@b.com", true).await.unwrap();
        recall.set_remembered("a@b.com", false).await.unwrap();

        assert!(recall.get_remembered().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remember_false_clears_regardless_of_identity() {
        let (recall, _db) = test_recall().await;

        recall.set_remembered("a@b.com", true).await.unwrap();
        recall.set_remembered("someone-else@b.com", false).await.unwrap();

        assert!(recall.get_remembered().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_prior_value() {
        let (recall, _db) = test_recall().await;

        recall.set_remembered("first@b.com", true).await.unwrap();
        recall.set_remembered("second@b.com", true).await.unwrap();

        assert_eq!(
            recall.get_remembered().await.unwrap().as_deref(),
            Some("second@b.com")
        );
    }

    #[tokio::test]
    async fn test_unset_flag_hides_stale_identity() {
        let (recall, db) = test_recall().await;

        // A stale identity with the flag down is not reported
        sqlx::query("INSERT INTO recall_slot (id, identity, remember) VALUES (1, 'stale@b.com', 0)")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(recall.get_remembered().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let (recall, _db) = test_recall().await;

        recall.set_remembered("a@b.com", false).await.unwrap();
        recall.set_remembered("a@b.com", false).await.unwrap();

        assert!(recall.get_remembered().await.unwrap().is_none());
    }
}
