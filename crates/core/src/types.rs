//! Shared primitive type aliases.

/// All entity primary keys are opaque UUIDs generated at creation time.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
