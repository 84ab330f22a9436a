use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefundQuoteQuery {
    pub reservation_id: i64,
    pub owner_id: i64,
    /// Defaults to the owner's pending cancellation group, falling back to
    /// their active tickets.
    pub ticket_count: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefundDestination {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    /// True when the destination comes from a transfer recipient's refund
    /// account rather than the original payment.
    pub via_transfer: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefundQuoteResponse {
    /// False when no payment transaction is on file; approval must not
    /// proceed in that case.
    pub refundable: bool,
    pub days_until_event: i64,
    pub rate: u32,
    pub ticket_count: i64,
    pub amount: i64,
    pub destination: Option<RefundDestination>,
}
