//! Attempt ledger: per-identity failure tracking and temporary lockout.
//!
//! Lockout expiry is lazy and read-triggered: discovering an expired
//! lockout removes the record as a side effect of the read. There is no
//! background sweep, and records carry absolute timestamps, so the ledger
//! stays correct across process restarts.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::store::AttemptRepository;
use crate::{GuardError, Result};

/// Maximum failed attempts before an identity is blocked.
pub const MAX_ATTEMPTS: u32 = 5;

/// Lockout duration (15 minutes).
pub const BLOCK_DURATION_SECS: u64 = 15 * 60;

/// Number of lock shards for per-identity serialization.
const SHARD_COUNT: usize = 16;

/// Attempt record for a single identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Identity key, case-sensitive as supplied by the caller.
    pub identity: String,
    /// Consecutive failures since the last clear or lockout expiry.
    pub attempt_count: u32,
    /// Timestamp of the most recent failed attempt.
    pub last_attempt_at: DateTime<Utc>,
    /// Whether the identity is currently blocked.
    pub blocked: bool,
}

/// Result of a blocked-status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStatus {
    /// The identity may attempt authentication.
    Clear,
    /// The identity is blocked for the remaining duration.
    Blocked(Duration),
}

impl BlockStatus {
    /// Check if the identity is blocked.
    pub fn is_blocked(&self) -> bool {
        matches!(self, BlockStatus::Blocked(_))
    }

    /// Remaining wait time, if blocked.
    pub fn time_left(&self) -> Option<Duration> {
        match self {
            BlockStatus::Blocked(left) => Some(*left),
            BlockStatus::Clear => None,
        }
    }
}

/// Per-identity failed-attempt ledger backed by the durable store.
///
/// Mutations are serialized per identity: the shard lock for an identity is
/// held across the whole read-modify-write, so concurrent failures for the
/// same identity never lose an increment, while unrelated identities
/// proceed in parallel.
#[derive(Debug)]
pub struct AttemptLedger {
    pool: SqlitePool,
    max_attempts: u32,
    block_duration: Duration,
    shards: Vec<Mutex<()>>,
}

impl AttemptLedger {
    /// Create a ledger with default thresholds.
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_config(pool, MAX_ATTEMPTS, BLOCK_DURATION_SECS)
    }

    /// Create a ledger with custom thresholds.
    pub fn with_config(pool: SqlitePool, max_attempts: u32, block_duration_secs: u64) -> Self {
        Self {
            pool,
            max_attempts,
            block_duration: Duration::from_secs(block_duration_secs),
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(())).collect(),
        }
    }

    fn shard(&self, identity: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        identity.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }

    /// Load a record, resetting the ledger if stored data fails to decode.
    /// Lockout state is best-effort protective state; a genuine storage
    /// failure still propagates.
    async fn load(&self, identity: &str) -> Result<Option<AttemptRecord>> {
        let repo = AttemptRepository::new(&self.pool);
        match repo.get(identity).await {
            Ok(record) => Ok(record),
            Err(GuardError::StorageCorrupt(msg)) => {
                warn!(
                    identity = %identity,
                    error = %msg,
                    "corrupt attempt record, resetting ledger"
                );
                repo.clear_all().await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Record a failed attempt for an identity.
    ///
    /// Creates a fresh record at count 1 if none exists, otherwise
    /// increments. Returns the updated record.
    pub async fn record_failure(&self, identity: &str) -> Result<AttemptRecord> {
        let _guard = self.shard(identity).lock().await;

        let attempt_count = match self.load(identity).await? {
            Some(record) => record.attempt_count.saturating_add(1),
            None => 1,
        };
        let record = AttemptRecord {
            identity: identity.to_string(),
            attempt_count,
            last_attempt_at: Utc::now(),
            blocked: attempt_count >= self.max_attempts,
        };
        AttemptRepository::new(&self.pool).upsert(&record).await?;

        debug!(
            identity = %identity,
            attempt_count = record.attempt_count,
            "recorded failed attempt"
        );
        if record.blocked {
            warn!(
                identity = %identity,
                attempt_count = record.attempt_count,
                "identity blocked"
            );
        }

        Ok(record)
    }

    /// Clear all attempts for an identity (call on successful authentication).
    ///
    /// Idempotent; clearing an identity with no record is a no-op.
    pub async fn clear(&self, identity: &str) -> Result<()> {
        let _guard = self.shard(identity).lock().await;

        if AttemptRepository::new(&self.pool).delete(identity).await? {
            debug!(identity = %identity, "cleared failed attempts");
        }

        Ok(())
    }

    /// Check whether an identity is currently blocked.
    ///
    /// Discovering an expired lockout clears the record and reports
    /// [`BlockStatus::Clear`].
    pub async fn check(&self, identity: &str) -> Result<BlockStatus> {
        let _guard = self.shard(identity).lock().await;

        let record = match self.load(identity).await? {
            Some(record) if record.blocked => record,
            _ => return Ok(BlockStatus::Clear),
        };

        // A timestamp in the future reads as zero elapsed time
        let elapsed = (Utc::now() - record.last_attempt_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        if elapsed >= self.block_duration {
            AttemptRepository::new(&self.pool).delete(identity).await?;
            info!(identity = %identity, "lockout expired");
            return Ok(BlockStatus::Clear);
        }

        Ok(BlockStatus::Blocked(self.block_duration - elapsed))
    }

    /// Attempts left before lockout.
    ///
    /// Informational only; never mutates records and never triggers expiry.
    pub async fn attempts_remaining(&self, identity: &str) -> Result<u32> {
        match self.load(identity).await? {
            Some(record) => Ok(self.max_attempts.saturating_sub(record.attempt_count)),
            None => Ok(self.max_attempts),
        }
    }
}
