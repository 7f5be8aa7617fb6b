//! Shared primitive type aliases.

/// Primary key type for every persisted entity (`BIGSERIAL` in PostgreSQL).
pub type DbId = i64;

/// UTC timestamp used for all `TIMESTAMPTZ` columns.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
