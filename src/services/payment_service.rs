use crate::entities::PaymentTransaction;
use crate::error::{AppError, AppResult};
use crate::models::{PaymentQuery, PaymentTransactionResponse, RecordPaymentRequest};
use crate::utils::{PaginatedResponse, PaginationParams};
use chrono::Utc;
use sqlx::SqlitePool;

/// Append-only monetary ledger. Rows are never updated or deleted; the net
/// amount of any scope is payments minus refunds.
#[derive(Clone)]
pub struct PaymentService {
    pool: SqlitePool,
}

impl PaymentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        request: RecordPaymentRequest,
    ) -> AppResult<PaymentTransactionResponse> {
        if request.amount < 0 {
            return Err(AppError::ValidationError(
                "Amount must not be negative".to_string(),
            ));
        }

        let reservation_exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE id = ?")
                .bind(request.reservation_id)
                .fetch_one(&self.pool)
                .await?;
        if reservation_exists == 0 {
            return Err(AppError::NotFound(format!(
                "Reservation {} not found",
                request.reservation_id
            )));
        }

        let operated_at = Utc::now();
        let id = sqlx::query(
            "INSERT INTO payment_transactions \
             (reservation_id, user_id, event_id, payment_type, amount, bank_name, account_number, account_holder, note, operated_at, operator_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(request.reservation_id)
        .bind(request.user_id)
        .bind(request.event_id)
        .bind(request.payment_type)
        .bind(request.amount)
        .bind(&request.bank_name)
        .bind(&request.account_number)
        .bind(&request.account_holder)
        .bind(&request.note)
        .bind(operated_at)
        .bind(request.operator_id)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        log::info!(
            "Recorded {:?} of {} for reservation {} by operator {}",
            request.payment_type,
            request.amount,
            request.reservation_id,
            request.operator_id
        );

        let row = sqlx::query_as::<_, PaymentTransaction>(
            "SELECT * FROM payment_transactions WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(PaymentTransactionResponse::from(row))
    }

    pub async fn list(
        &self,
        query: &PaymentQuery,
    ) -> AppResult<PaginatedResponse<PaymentTransactionResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut sql = String::from("SELECT * FROM payment_transactions WHERE 1=1");
        let mut count_sql = String::from("SELECT COUNT(*) FROM payment_transactions WHERE 1=1");
        for clause in [
            (query.reservation_id.is_some(), " AND reservation_id = ?"),
            (query.event_id.is_some(), " AND event_id = ?"),
            (query.payment_type.is_some(), " AND payment_type = ?"),
        ] {
            if clause.0 {
                sql.push_str(clause.1);
                count_sql.push_str(clause.1);
            }
        }
        sql.push_str(" ORDER BY operated_at DESC, id DESC LIMIT ? OFFSET ?");

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut list_query = sqlx::query_as::<_, PaymentTransaction>(&sql);
        if let Some(reservation_id) = query.reservation_id {
            count_query = count_query.bind(reservation_id);
            list_query = list_query.bind(reservation_id);
        }
        if let Some(event_id) = query.event_id {
            count_query = count_query.bind(event_id);
            list_query = list_query.bind(event_id);
        }
        if let Some(payment_type) = query.payment_type {
            count_query = count_query.bind(payment_type);
            list_query = list_query.bind(payment_type);
        }

        let total = count_query.fetch_one(&self.pool).await?;
        let rows = list_query
            .bind(params.get_limit() as i64)
            .bind(params.get_offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let items: Vec<PaymentTransactionResponse> = rows
            .into_iter()
            .map(PaymentTransactionResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    pub async fn net_amount_for_reservation(&self, reservation_id: i64) -> AppResult<i64> {
        let net: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(CASE WHEN payment_type = 'payment' THEN amount ELSE -amount END), 0) \
             FROM payment_transactions WHERE reservation_id = ?",
        )
        .bind(reservation_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(net)
    }
}
