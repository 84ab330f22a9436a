use chrono::{DateTime, Utc};

/// Where a transfer recipient's refund should be wired. Created lazily at the
/// recipient's first cancellation request; the original payer's bank details
/// live on the payment transaction instead.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct RefundAccount {
    pub id: i64,
    pub user_id: i64,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    pub created_at: DateTime<Utc>,
}
