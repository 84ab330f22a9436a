use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::TransferRequest;
use crate::services::TransferService;

#[utoipa::path(
    post,
    path = "/transfers",
    tag = "transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Tickets transferred, lowest numbers first"),
        (status = 400, description = "Invalid count or insufficient tickets"),
        (status = 404, description = "Recipient not found")
    )
)]
pub async fn execute_transfer(
    transfer_service: web::Data<TransferService>,
    request: web::Json<TransferRequest>,
) -> Result<HttpResponse> {
    match transfer_service.transfer(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/transfers/{reservation_id}",
    tag = "transfer",
    params(
        ("reservation_id" = i64, Path, description = "Reservation id")
    ),
    responses(
        (status = 200, description = "Transfer history, newest first")
    )
)]
pub async fn transfer_history(
    transfer_service: web::Data<TransferService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match transfer_service.history(path.into_inner()).await {
        Ok(entries) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": entries
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn transfer_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/transfers")
            .route("", web::post().to(execute_transfer))
            .route("/{reservation_id}", web::get().to(transfer_history)),
    );
}
