//! Test helpers for gatelock integration tests.

use tempfile::TempDir;

use gatelock::{AttemptLedger, Database, IdentityRecall};

/// Database file name inside the temporary directory.
pub const DB_FILE: &str = "guard.db";

/// Open a file-backed database in a fresh temporary directory.
///
/// The directory handle must stay alive for as long as the database is in
/// use.
pub async fn temp_database() -> (Database, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let db = Database::open(dir.path().join(DB_FILE))
        .await
        .expect("open database");
    (db, dir)
}

/// Ledger with default thresholds over the given database.
pub fn ledger(db: &Database) -> AttemptLedger {
    AttemptLedger::new(db.pool().clone())
}

/// Recall store over the given database.
#[allow(dead_code)]
pub fn recall(db: &Database) -> IdentityRecall {
    IdentityRecall::new(db.pool().clone())
}
