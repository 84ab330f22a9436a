use crate::entities::{Ticket, TicketStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TicketResponse {
    pub id: i64,
    pub reservation_id: i64,
    pub event_id: i64,
    pub owner_id: i64,
    pub ticket_number: i64,
    pub code: String,
    pub status: TicketStatus,
    pub transferred_at: Option<DateTime<Utc>>,
}

impl From<Ticket> for TicketResponse {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            reservation_id: t.reservation_id,
            event_id: t.event_id,
            owner_id: t.owner_id,
            ticket_number: t.ticket_number,
            code: t.code,
            status: t.status,
            transferred_at: t.transferred_at,
        }
    }
}

/// Administrative aggregation of tickets sharing reservation, owner, event
/// and status. Derived by grouping, never persisted; a reservation shows up
/// as several groups after a partial transfer.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TicketGroup {
    pub reservation_id: i64,
    pub owner_id: i64,
    pub event_id: i64,
    pub status: TicketStatus,
    pub ticket_count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TicketGroupQuery {
    pub event_id: Option<i64>,
    pub reservation_id: Option<i64>,
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefundAccountRequest {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestCancelAllRequest {
    pub event_id: i64,
    pub reservation_id: i64,
    pub owner_id: i64,
    /// Required the first time a transfer recipient requests cancellation;
    /// ignored for the original payer.
    pub refund_account: Option<RefundAccountRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestCancelAllResponse {
    pub requested_count: i64,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApproveCancelRequest {
    pub event_id: i64,
    pub reservation_id: i64,
    pub owner_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApproveCancelResponse {
    pub approved_count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkUsedRequest {
    pub event_id: i64,
    pub reservation_id: i64,
    pub owner_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkUsedResponse {
    pub used_count: i64,
}
