use crate::entities::{PaymentTransaction, PaymentType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordPaymentRequest {
    pub reservation_id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub payment_type: PaymentType,
    pub amount: i64,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    pub note: Option<String>,
    pub operator_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub reservation_id: Option<i64>,
    pub event_id: Option<i64>,
    pub payment_type: Option<PaymentType>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentTransactionResponse {
    pub id: i64,
    pub reservation_id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub payment_type: PaymentType,
    pub amount: i64,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    pub note: Option<String>,
    pub operated_at: DateTime<Utc>,
    pub operator_id: i64,
}

impl From<PaymentTransaction> for PaymentTransactionResponse {
    fn from(p: PaymentTransaction) -> Self {
        Self {
            id: p.id,
            reservation_id: p.reservation_id,
            user_id: p.user_id,
            event_id: p.event_id,
            payment_type: p.payment_type,
            amount: p.amount,
            bank_name: p.bank_name,
            account_number: p.account_number,
            account_holder: p.account_holder,
            note: p.note,
            operated_at: p.operated_at,
            operator_id: p.operator_id,
        }
    }
}
