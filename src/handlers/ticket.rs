use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::external::{TwilioService, cancellation_approved_message};
use crate::models::{
    ApproveCancelRequest, MarkUsedRequest, RefundQuoteQuery, RequestCancelAllRequest,
    TicketGroupQuery,
};
use crate::services::{EventService, RefundService, TicketService, UserService};

#[utoipa::path(
    get,
    path = "/tickets/groups",
    tag = "ticket",
    params(
        ("event_id" = Option<i64>, Query, description = "Filter by event"),
        ("reservation_id" = Option<i64>, Query, description = "Filter by reservation"),
        ("status" = Option<String>, Query, description = "Filter by ticket status")
    ),
    responses(
        (status = 200, description = "Ticket groups")
    )
)]
pub async fn list_groups(
    ticket_service: web::Data<TicketService>,
    query: web::Query<TicketGroupQuery>,
) -> Result<HttpResponse> {
    match ticket_service.list_groups(&query).await {
        Ok(groups) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": groups
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/tickets/by-reservation/{id}",
    tag = "ticket",
    params(
        ("id" = i64, Path, description = "Reservation id")
    ),
    responses(
        (status = 200, description = "Tickets of the reservation")
    )
)]
pub async fn list_by_reservation(
    ticket_service: web::Data<TicketService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match ticket_service.list_by_reservation(path.into_inner()).await {
        Ok(tickets) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": tickets
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/tickets/cancel-request",
    tag = "ticket",
    request_body = RequestCancelAllRequest,
    responses(
        (status = 200, description = "Active tickets of the group moved to cancel-requested"),
        (status = 400, description = "No active tickets, or missing refund account for a transferred batch")
    )
)]
pub async fn request_cancel_all(
    ticket_service: web::Data<TicketService>,
    request: web::Json<RequestCancelAllRequest>,
) -> Result<HttpResponse> {
    match ticket_service.request_cancel_all(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/tickets/approve-cancel",
    tag = "ticket",
    request_body = ApproveCancelRequest,
    responses(
        (status = 200, description = "Cancel-requested tickets approved (idempotent)"),
        (status = 400, description = "No payment on file for the reservation")
    )
)]
pub async fn approve_cancel(
    ticket_service: web::Data<TicketService>,
    refund_service: web::Data<RefundService>,
    event_service: web::Data<EventService>,
    user_service: web::Data<UserService>,
    twilio_service: web::Data<TwilioService>,
    request: web::Json<ApproveCancelRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();

    // Quote before the transition so the request-time anchor still applies.
    let quote = refund_service
        .quote(&RefundQuoteQuery {
            reservation_id: request.reservation_id,
            owner_id: request.owner_id,
            ticket_count: None,
        })
        .await
        .ok();

    let owner_id = request.owner_id;
    let event_id = request.event_id;
    match ticket_service.approve_cancel_request(request).await {
        Ok(response) => {
            if response.approved_count > 0
                && let Some(quote) = quote
            {
                let event_name = event_service
                    .get_event(event_id)
                    .await
                    .map(|e| e.name)
                    .unwrap_or_default();
                if let Ok(Some(phone)) = user_service.get_phone(owner_id).await {
                    let body = cancellation_approved_message(
                        &event_name,
                        response.approved_count,
                        quote.amount,
                    );
                    if let Err(e) = twilio_service.send_sms(&phone, &body).await {
                        log::warn!("Cancellation SMS failed: {e}");
                    }
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
    path = "/tickets/mark-used",
    tag = "ticket",
    request_body = MarkUsedRequest,
    responses(
        (status = 200, description = "Active tickets of the group marked used (idempotent)"),
        (status = 400, description = "Group has no active or used tickets")
    )
)]
pub async fn mark_used(
    ticket_service: web::Data<TicketService>,
    request: web::Json<MarkUsedRequest>,
) -> Result<HttpResponse> {
    match ticket_service.mark_used(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/tickets/refund-quote",
    tag = "ticket",
    params(
        ("reservation_id" = i64, Query, description = "Reservation id"),
        ("owner_id" = i64, Query, description = "Current ticket owner"),
        ("ticket_count" = Option<i64>, Query, description = "Tickets to cancel; defaults to the pending group")
    ),
    responses(
        (status = 200, description = "Refund quote"),
        (status = 400, description = "No tickets to cancel")
    )
)]
pub async fn refund_quote(
    refund_service: web::Data<RefundService>,
    query: web::Query<RefundQuoteQuery>,
) -> Result<HttpResponse> {
    match refund_service.quote(&query).await {
        Ok(quote) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": quote
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn ticket_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tickets")
            .route("/groups", web::get().to(list_groups))
            .route("/by-reservation/{id}", web::get().to(list_by_reservation))
            .route("/cancel-request", web::post().to(request_cancel_all))
            .route("/approve-cancel", web::post().to(approve_cancel))
            .route("/mark-used", web::post().to(mark_used))
            .route("/refund-quote", web::get().to(refund_quote)),
    );
}
