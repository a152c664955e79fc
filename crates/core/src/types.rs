/// Operator and client primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Opaque session tokens are random UUIDs used directly as primary keys
/// and URL path segments.
pub type SessionToken = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
