use crate::entities::{Reservation, ReservationStatus};
use crate::models::TicketResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    pub event_id: i64,
    pub user_id: i64,
    pub ticket_holder: String,
    pub quantity: i64,
}

/// Self-service cancellation of a still-pending reservation; only the owner
/// may discard it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelPendingRequest {
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub user_id: Option<i64>,
    pub event_id: Option<i64>,
    pub status: Option<ReservationStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationResponse {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub ticket_holder: String,
    pub quantity: i64,
    pub status: ReservationStatus,
    pub reserved_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConfirmReservationResponse {
    pub reservation: ReservationResponse,
    pub tickets: Vec<TicketResponse>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            event_id: r.event_id,
            user_id: r.user_id,
            ticket_holder: r.ticket_holder,
            quantity: r.quantity,
            status: r.status,
            reserved_at: r.reserved_at,
        }
    }
}
