use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::{PaymentQuery, RecordPaymentRequest};
use crate::services::PaymentService;

#[utoipa::path(
    post,
    path = "/payments",
    tag = "payment",
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Ledger entry appended"),
        (status = 400, description = "Negative amount"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn record_payment(
    payment_service: web::Data<PaymentService>,
    request: web::Json<RecordPaymentRequest>,
) -> Result<HttpResponse> {
    match payment_service.record(request.into_inner()).await {
        Ok(transaction) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": transaction
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments",
    tag = "payment",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page"),
        ("reservation_id" = Option<i64>, Query, description = "Filter by reservation"),
        ("event_id" = Option<i64>, Query, description = "Filter by event"),
        ("payment_type" = Option<String>, Query, description = "payment or refund")
    ),
    responses(
        (status = 200, description = "Ledger entries")
    )
)]
pub async fn list_payments(
    payment_service: web::Data<PaymentService>,
    query: web::Query<PaymentQuery>,
) -> Result<HttpResponse> {
    match payment_service.list(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments/net/{reservation_id}",
    tag = "payment",
    params(
        ("reservation_id" = i64, Path, description = "Reservation id")
    ),
    responses(
        (status = 200, description = "Payments minus refunds for the reservation")
    )
)]
pub async fn net_amount(
    payment_service: web::Data<PaymentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match payment_service
        .net_amount_for_reservation(path.into_inner())
        .await
    {
        Ok(net) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "net_amount": net }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("", web::post().to(record_payment))
            .route("", web::get().to(list_payments))
            .route("/net/{reservation_id}", web::get().to(net_amount)),
    );
}
