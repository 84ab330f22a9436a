use crate::entities::TransferHistoryEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransferRequest {
    pub reservation_id: i64,
    pub event_id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub transfer_count: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransferResponse {
    pub reservation_id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub ticket_count: i64,
    pub group_time: DateTime<Utc>,
    /// Ticket numbers that changed hands, lowest first.
    pub moved_ticket_numbers: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransferHistoryResponse {
    pub id: i64,
    pub reservation_id: i64,
    pub event_id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub ticket_count: i64,
    pub reason: Option<String>,
    pub group_time: DateTime<Utc>,
}

impl From<TransferHistoryEntry> for TransferHistoryResponse {
    fn from(t: TransferHistoryEntry) -> Self {
        Self {
            id: t.id,
            reservation_id: t.reservation_id,
            event_id: t.event_id,
            from_user_id: t.from_user_id,
            to_user_id: t.to_user_id,
            ticket_count: t.ticket_count,
            reason: t.reason,
            group_time: t.group_time,
        }
    }
}
