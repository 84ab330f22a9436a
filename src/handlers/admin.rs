use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

use crate::services::StatsService;

#[utoipa::path(
    get,
    path = "/admin/stats/summary",
    tag = "admin",
    responses(
        (status = 200, description = "Period-over-period revenue and reservation counts")
    )
)]
pub async fn stats_summary(stats_service: web::Data<StatsService>) -> Result<HttpResponse> {
    match stats_service.dashboard_summary(Utc::now()).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/stats/events",
    tag = "admin",
    responses(
        (status = 200, description = "Per-event sales and cancellation rates")
    )
)]
pub async fn stats_events(stats_service: web::Data<StatsService>) -> Result<HttpResponse> {
    match stats_service.event_stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/stats/users",
    tag = "admin",
    responses(
        (status = 200, description = "Active and recently active user rates")
    )
)]
pub async fn stats_users(stats_service: web::Data<StatsService>) -> Result<HttpResponse> {
    match stats_service.user_rates(Utc::now()).await {
        Ok(rates) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": rates
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/stats/summary", web::get().to(stats_summary))
            .route("/stats/events", web::get().to(stats_events))
            .route("/stats/users", web::get().to(stats_users)),
    );
}
