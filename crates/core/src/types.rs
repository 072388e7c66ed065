/// All database primary keys are UUIDs, minted by the caller so that an
/// identifier can exist before its row does (e.g. the replacement artifact
/// id handed to a revision task).
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
