use chrono::{DateTime, Utc};

/// One row per transfer operation; `group_time` is shared by every ticket
/// moved in that operation.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct TransferHistoryEntry {
    pub id: i64,
    pub reservation_id: i64,
    pub event_id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub ticket_count: i64,
    pub reason: Option<String>,
    pub group_time: DateTime<Utc>,
}
