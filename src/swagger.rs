use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{EventStatus, PaymentType, ReservationStatus, TicketStatus, UserStatus};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::event::create_event,
        handlers::event::list_events,
        handlers::event::get_event,
        handlers::event::update_event_status,
        handlers::user::create_user,
        handlers::user::get_user,
        handlers::reservation::create_reservation,
        handlers::reservation::list_reservations,
        handlers::reservation::get_reservation,
        handlers::reservation::confirm_reservation,
        handlers::reservation::void_reservation,
        handlers::reservation::cancel_pending_reservation,
        handlers::ticket::list_groups,
        handlers::ticket::list_by_reservation,
        handlers::ticket::request_cancel_all,
        handlers::ticket::approve_cancel,
        handlers::ticket::mark_used,
        handlers::ticket::refund_quote,
        handlers::transfer::execute_transfer,
        handlers::transfer::transfer_history,
        handlers::payment::record_payment,
        handlers::payment::list_payments,
        handlers::payment::net_amount,
        handlers::admin::stats_summary,
        handlers::admin::stats_events,
        handlers::admin::stats_users,
    ),
    components(
        schemas(
            ApiError,
            EventStatus,
            ReservationStatus,
            TicketStatus,
            PaymentType,
            UserStatus,
            CreateEventRequest,
            UpdateEventStatusRequest,
            EventResponse,
            CreateUserRequest,
            UserResponse,
            CreateReservationRequest,
            CancelPendingRequest,
            ReservationResponse,
            ConfirmReservationResponse,
            TicketResponse,
            TicketGroup,
            RefundAccountRequest,
            RequestCancelAllRequest,
            RequestCancelAllResponse,
            ApproveCancelRequest,
            ApproveCancelResponse,
            MarkUsedRequest,
            MarkUsedResponse,
            RefundQuoteResponse,
            RefundDestination,
            TransferRequest,
            TransferResponse,
            TransferHistoryResponse,
            RecordPaymentRequest,
            PaymentTransactionResponse,
            PeriodComparison,
            DashboardSummaryResponse,
            EventStatsResponse,
            UserRatesResponse,
        )
    ),
    tags(
        (name = "event", description = "Event catalogue"),
        (name = "user", description = "Platform users"),
        (name = "reservation", description = "Reservation lifecycle"),
        (name = "ticket", description = "Ticket lifecycle and refunds"),
        (name = "transfer", description = "Ticket ownership transfer"),
        (name = "payment", description = "Payment ledger"),
        (name = "admin", description = "Back-office statistics")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
