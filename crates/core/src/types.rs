/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Row bookkeeping timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Edit times are stored as whole seconds since the Unix epoch.
pub type UnixTimestamp = i64;
