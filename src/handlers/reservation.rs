use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::external::{TwilioService, reservation_confirmed_message};
use crate::models::{CancelPendingRequest, CreateReservationRequest, ReservationQuery};
use crate::services::{EventService, ReservationService, UserService};

#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservation",
    request_body = CreateReservationRequest,
    responses(
        (status = 200, description = "Pending reservation created"),
        (status = 400, description = "Invalid quantity or holder"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn create_reservation(
    reservation_service: web::Data<ReservationService>,
    request: web::Json<CreateReservationRequest>,
) -> Result<HttpResponse> {
    match reservation_service
        .create_reservation(request.into_inner())
        .await
    {
        Ok(reservation) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": reservation
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservation",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page"),
        ("user_id" = Option<i64>, Query, description = "Filter by owner"),
        ("event_id" = Option<i64>, Query, description = "Filter by event"),
        ("status" = Option<String>, Query, description = "Filter by reservation status")
    ),
    responses(
        (status = 200, description = "Reservation list")
    )
)]
pub async fn list_reservations(
    reservation_service: web::Data<ReservationService>,
    query: web::Query<ReservationQuery>,
) -> Result<HttpResponse> {
    match reservation_service.list_reservations(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "reservation",
    params(
        ("id" = i64, Path, description = "Reservation id")
    ),
    responses(
        (status = 200, description = "Reservation detail"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    reservation_service: web::Data<ReservationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match reservation_service.get_reservation(path.into_inner()).await {
        Ok(reservation) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": reservation
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/reservations/{id}/confirm",
    tag = "reservation",
    params(
        ("id" = i64, Path, description = "Reservation id")
    ),
    responses(
        (status = 200, description = "Reservation confirmed, tickets issued"),
        (status = 409, description = "Not pending, capacity exceeded or concurrent change"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn confirm_reservation(
    reservation_service: web::Data<ReservationService>,
    event_service: web::Data<EventService>,
    user_service: web::Data<UserService>,
    twilio_service: web::Data<TwilioService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match reservation_service.confirm(path.into_inner()).await {
        Ok(response) => {
            // Best-effort confirmation SMS; delivery problems never fail the
            // admin action.
            let reservation = &response.reservation;
            let event_name = event_service
                .get_event(reservation.event_id)
                .await
                .map(|e| e.name)
                .unwrap_or_default();
            if let Ok(Some(phone)) = user_service.get_phone(reservation.user_id).await {
                let body = reservation_confirmed_message(
                    &event_name,
                    &reservation.ticket_holder,
                    reservation.quantity,
                );
                if let Err(e) = twilio_service.send_sms(&phone, &body).await {
                    log::warn!("Confirmation SMS failed: {e}");
                }
            }

            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": response
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/reservations/{id}/void",
    tag = "reservation",
    params(
        ("id" = i64, Path, description = "Reservation id")
    ),
    responses(
        (status = 200, description = "Reservation voided"),
        (status = 409, description = "Not pending"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn void_reservation(
    reservation_service: web::Data<ReservationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match reservation_service.void(path.into_inner()).await {
        Ok(reservation) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": reservation
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel",
    tag = "reservation",
    params(
        ("id" = i64, Path, description = "Reservation id")
    ),
    request_body = CancelPendingRequest,
    responses(
        (status = 200, description = "Pending reservation cancelled by its owner"),
        (status = 400, description = "Requester does not own the reservation"),
        (status = 409, description = "Not pending")
    )
)]
pub async fn cancel_pending_reservation(
    reservation_service: web::Data<ReservationService>,
    path: web::Path<i64>,
    request: web::Json<CancelPendingRequest>,
) -> Result<HttpResponse> {
    match reservation_service
        .cancel_pending(path.into_inner(), request.user_id)
        .await
    {
        Ok(reservation) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": reservation
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn reservation_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reservations")
            .route("", web::post().to(create_reservation))
            .route("", web::get().to(list_reservations))
            .route("/{id}", web::get().to(get_reservation))
            .route("/{id}/confirm", web::post().to(confirm_reservation))
            .route("/{id}/void", web::post().to(void_reservation))
            .route("/{id}/cancel", web::post().to(cancel_pending_reservation)),
    );
}
