use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Reservation {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub ticket_holder: String,
    pub quantity: i64,
    pub status: ReservationStatus,
    pub reserved_at: DateTime<Utc>,
}

/// Pending reservations either get confirmed (tickets materialize) or voided
/// (nothing was ever allocated). Both outcomes are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Voided,
}
