use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Append-only ledger row; never updated or deleted.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct PaymentTransaction {
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

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Payment,
    Refund,
}
