//! Database schema and migrations for gatelock.

/// Database migrations.
///
/// Each migration is a SQL script executed in order. The schema_version
/// table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: attempt ledger
    r#"
-- One row per identity with recorded failures
CREATE TABLE attempt_records (
    identity        TEXT PRIMARY KEY,
    attempt_count   INTEGER NOT NULL,
    last_attempt_at TEXT NOT NULL,        -- RFC 3339 UTC
    blocked         INTEGER NOT NULL DEFAULT 0
);
"#,
    // v2: remembered-identity slot
    r#"
-- Single-row preference slot for "remember this identity"
CREATE TABLE recall_slot (
    id       INTEGER PRIMARY KEY CHECK (id = 1),
    identity TEXT NOT NULL,
    remember INTEGER NOT NULL DEFAULT 0
);
"#,
];
