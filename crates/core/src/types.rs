/// Articles are identified by an opaque, server-assigned string.
pub type ArticleId = String;

/// Admin accounts are identified by an opaque, server-assigned string.
pub type AdminId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
