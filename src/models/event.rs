use crate::entities::{Event, EventStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub seat_capacity: i64,
    pub ticket_price: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventStatusRequest {
    pub status: EventStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<EventStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub id: i64,
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub seat_capacity: i64,
    pub reserved_quantity: i64,
    pub ticket_price: i64,
    pub status: EventStatus,
}

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            name: e.name,
            date: e.date,
            location: e.location,
            seat_capacity: e.seat_capacity,
            reserved_quantity: e.reserved_quantity,
            ticket_price: e.ticket_price,
            status: e.status,
        }
    }
}
