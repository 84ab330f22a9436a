use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row per seat unit. `ticket_number` runs 1..=quantity within the
/// reservation; `owner_id` may diverge from the reservation's user after a
/// transfer while the row count stays fixed for the reservation's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Ticket {
    pub id: i64,
    pub reservation_id: i64,
    pub event_id: i64,
    pub owner_id: i64,
    pub ticket_number: i64,
    pub code: String,
    pub status: TicketStatus,
    pub transferred_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Active → CancelRequested → Cancelled (admin approval, one-directional);
/// Active → Used; Active → Transferred, which immediately re-activates under
/// the new owner — no row rests in Transferred, the fact is kept in
/// `transferred_at` and the transfer history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Active,
    CancelRequested,
    Cancelled,
    Used,
    Transferred,
}
