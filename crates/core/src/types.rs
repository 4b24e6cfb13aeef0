/// Identifiers issued by the order-management system (`order_...`, `ful_...`).
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
