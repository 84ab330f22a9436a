use crate::entities::{Ticket, TransferHistoryEntry};
use crate::error::{AppError, AppResult};
use crate::models::{TransferHistoryResponse, TransferRequest, TransferResponse};
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct TransferService {
    pool: SqlitePool,
}

impl TransferService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Reassigns ownership of the lowest-numbered `transfer_count` active
    /// tickets the sender holds under the reservation. The rows pass through
    /// the transferred status and come back out active under the recipient;
    /// only `owner_id`, `transferred_at` and the history record change — the
    /// reservation's total ticket count does not. The recipient's refund
    /// mapping is created later, at their first cancellation request, because
    /// their refund destination is unknown here.
    pub async fn transfer(&self, request: TransferRequest) -> AppResult<TransferResponse> {
        if request.transfer_count < 1 {
            return Err(AppError::ValidationError(
                "Transfer count must be at least 1".to_string(),
            ));
        }
        if request.from_user_id == request.to_user_id {
            return Err(AppError::ValidationError(
                "Cannot transfer tickets to the same user".to_string(),
            ));
        }

        let group_time = Utc::now();
        let mut tx = self.pool.begin().await?;

        let recipient: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(request.to_user_id)
            .fetch_one(&mut *tx)
            .await?;
        if recipient == 0 {
            return Err(AppError::NotFound(format!(
                "User {} not found",
                request.to_user_id
            )));
        }

        let available = sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets \
             WHERE reservation_id = ? AND event_id = ? AND owner_id = ? AND status = 'active' \
             ORDER BY ticket_number ASC",
        )
        .bind(request.reservation_id)
        .bind(request.event_id)
        .bind(request.from_user_id)
        .fetch_all(&mut *tx)
        .await?;

        if request.transfer_count > available.len() as i64 {
            return Err(AppError::InsufficientTickets(format!(
                "User {} holds {} active tickets under reservation {}, cannot transfer {}",
                request.from_user_id,
                available.len(),
                request.reservation_id,
                request.transfer_count
            )));
        }

        // Lowest ticket numbers move first.
        let moving: Vec<&Ticket> = available
            .iter()
            .take(request.transfer_count as usize)
            .collect();

        for ticket in &moving {
            let claimed = sqlx::query(
                "UPDATE tickets SET owner_id = ?, status = 'transferred', transferred_at = ?, updated_at = ? \
                 WHERE id = ? AND status = 'active'",
            )
            .bind(request.to_user_id)
            .bind(group_time)
            .bind(group_time)
            .bind(ticket.id)
            .execute(&mut *tx)
            .await?;

            if claimed.rows_affected() == 0 {
                return Err(AppError::Conflict(format!(
                    "Ticket {} changed concurrently during transfer",
                    ticket.id
                )));
            }

            // Transferred is a recorded fact, not a resting state: the ticket
            // stays usable under its new owner.
            sqlx::query("UPDATE tickets SET status = 'active' WHERE id = ? AND status = 'transferred'")
                .bind(ticket.id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "INSERT INTO transfer_histories (reservation_id, event_id, from_user_id, to_user_id, ticket_count, reason, group_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(request.reservation_id)
        .bind(request.event_id)
        .bind(request.from_user_id)
        .bind(request.to_user_id)
        .bind(request.transfer_count)
        .bind(&request.reason)
        .bind(group_time)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let moved_ticket_numbers: Vec<i64> = moving.iter().map(|t| t.ticket_number).collect();
        log::info!(
            "Transferred tickets {:?} of reservation {} from user {} to user {}",
            moved_ticket_numbers,
            request.reservation_id,
            request.from_user_id,
            request.to_user_id
        );

        Ok(TransferResponse {
            reservation_id: request.reservation_id,
            from_user_id: request.from_user_id,
            to_user_id: request.to_user_id,
            ticket_count: request.transfer_count,
            group_time,
            moved_ticket_numbers,
        })
    }

    pub async fn history(&self, reservation_id: i64) -> AppResult<Vec<TransferHistoryResponse>> {
        let entries = sqlx::query_as::<_, TransferHistoryEntry>(
            "SELECT * FROM transfer_histories WHERE reservation_id = ? ORDER BY group_time DESC, id DESC",
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries
            .into_iter()
            .map(TransferHistoryResponse::from)
            .collect())
    }
}
