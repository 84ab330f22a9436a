use crate::entities::{Reservation, Ticket};
use crate::error::{AppError, AppResult};
use crate::models::{
    ApproveCancelRequest, ApproveCancelResponse, MarkUsedRequest, MarkUsedResponse,
    RequestCancelAllRequest, RequestCancelAllResponse, TicketGroup, TicketGroupQuery,
    TicketResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct TicketService {
    pool: SqlitePool,
}

impl TicketService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_by_reservation(&self, reservation_id: i64) -> AppResult<Vec<TicketResponse>> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE reservation_id = ? ORDER BY ticket_number ASC",
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets.into_iter().map(TicketResponse::from).collect())
    }

    /// Administrative grouping: one row per (reservation, owner, event,
    /// status). A partially transferred reservation shows up as several
    /// groups.
    pub async fn list_groups(&self, query: &TicketGroupQuery) -> AppResult<Vec<TicketGroup>> {
        let mut sql = String::from(
            "SELECT reservation_id, owner_id, event_id, status, COUNT(*) AS ticket_count \
             FROM tickets WHERE 1=1",
        );
        if query.event_id.is_some() {
            sql.push_str(" AND event_id = ?");
        }
        if query.reservation_id.is_some() {
            sql.push_str(" AND reservation_id = ?");
        }
        if query.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(
            " GROUP BY reservation_id, owner_id, event_id, status \
             ORDER BY reservation_id ASC, owner_id ASC",
        );

        let mut groups_query = sqlx::query_as::<_, TicketGroup>(&sql);
        if let Some(event_id) = query.event_id {
            groups_query = groups_query.bind(event_id);
        }
        if let Some(reservation_id) = query.reservation_id {
            groups_query = groups_query.bind(reservation_id);
        }
        if let Some(status) = query.status {
            groups_query = groups_query.bind(status);
        }

        let groups = groups_query.fetch_all(&self.pool).await?;
        Ok(groups)
    }

    /// Moves every active ticket of the (reservation, owner) group to
    /// cancel-requested. The stamped `updated_at` becomes the anchor for the
    /// refund-window calculation, not the original reservation time. A
    /// transfer recipient must supply refund bank details on their first
    /// request; the mapping created here routes their refund away from the
    /// original payer's account.
    pub async fn request_cancel_all(
        &self,
        request: RequestCancelAllRequest,
    ) -> AppResult<RequestCancelAllResponse> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let reservation =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
                .bind(request.reservation_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Reservation {} not found",
                        request.reservation_id
                    ))
                })?;

        let active_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets \
             WHERE reservation_id = ? AND owner_id = ? AND event_id = ? AND status = 'active'",
        )
        .bind(request.reservation_id)
        .bind(request.owner_id)
        .bind(request.event_id)
        .fetch_one(&mut *tx)
        .await?;

        if active_count == 0 {
            return Err(AppError::NoActiveTickets(format!(
                "No active tickets for reservation {} and owner {}",
                request.reservation_id, request.owner_id
            )));
        }

        // Transfer recipients refund to their own account, not the payer's.
        if request.owner_id != reservation.user_id {
            let mapping_exists: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM refund_request_mappings \
                 WHERE user_id = ? AND reservation_id = ? AND event_id = ?",
            )
            .bind(request.owner_id)
            .bind(request.reservation_id)
            .bind(request.event_id)
            .fetch_one(&mut *tx)
            .await?;

            if mapping_exists == 0 {
                let account = request.refund_account.as_ref().ok_or_else(|| {
                    AppError::ValidationError(
                        "Refund bank account is required for transferred tickets".to_string(),
                    )
                })?;

                let refund_account_id = sqlx::query(
                    "INSERT INTO refund_accounts (user_id, bank_name, account_number, account_holder, created_at) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(request.owner_id)
                .bind(&account.bank_name)
                .bind(&account.account_number)
                .bind(&account.account_holder)
                .bind(now)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();

                sqlx::query(
                    "INSERT INTO refund_request_mappings (user_id, refund_account_id, reservation_id, event_id) \
                     VALUES (?, ?, ?, ?)",
                )
                .bind(request.owner_id)
                .bind(refund_account_id)
                .bind(request.reservation_id)
                .bind(request.event_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        let updated = sqlx::query(
            "UPDATE tickets SET status = 'cancel_requested', updated_at = ? \
             WHERE reservation_id = ? AND owner_id = ? AND event_id = ? AND status = 'active'",
        )
        .bind(now)
        .bind(request.reservation_id)
        .bind(request.owner_id)
        .bind(request.event_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() != active_count as u64 {
            return Err(AppError::Conflict(format!(
                "Tickets of reservation {} changed concurrently",
                request.reservation_id
            )));
        }

        tx.commit().await?;

        log::info!(
            "Cancellation requested for {} tickets (reservation {}, owner {})",
            active_count,
            request.reservation_id,
            request.owner_id
        );

        Ok(RequestCancelAllResponse {
            requested_count: active_count,
            requested_at: now,
        })
    }

    /// Approves a pending cancellation group. A recorded purchase payment is
    /// required; whether the refund itself has already been wired is left to
    /// operator discipline and is deliberately not checked here. Approving an
    /// already-approved group affects zero tickets and succeeds.
    pub async fn approve_cancel_request(
        &self,
        request: ApproveCancelRequest,
    ) -> AppResult<ApproveCancelResponse> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let payments: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM payment_transactions \
             WHERE reservation_id = ? AND payment_type = 'payment'",
        )
        .bind(request.reservation_id)
        .fetch_one(&mut *tx)
        .await?;

        if payments == 0 {
            return Err(AppError::NoPaymentRecord(format!(
                "Reservation {} has no payment on file",
                request.reservation_id
            )));
        }

        let updated = sqlx::query(
            "UPDATE tickets SET status = 'cancelled', updated_at = ? \
             WHERE reservation_id = ? AND owner_id = ? AND event_id = ? AND status = 'cancel_requested'",
        )
        .bind(now)
        .bind(request.reservation_id)
        .bind(request.owner_id)
        .bind(request.event_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let approved_count = updated.rows_affected() as i64;
        if approved_count > 0 {
            log::info!(
                "Cancellation approved for {} tickets (reservation {}, owner {})",
                approved_count,
                request.reservation_id,
                request.owner_id
            );
        }

        Ok(ApproveCancelResponse { approved_count })
    }

    /// Entry-check flow: marks the group's active tickets as used. Calling it
    /// again for an already-used group is a no-op.
    pub async fn mark_used(&self, request: MarkUsedRequest) -> AppResult<MarkUsedResponse> {
        let now = Utc::now();

        let updated = sqlx::query(
            "UPDATE tickets SET status = 'used', updated_at = ? \
             WHERE reservation_id = ? AND owner_id = ? AND event_id = ? AND status = 'active'",
        )
        .bind(now)
        .bind(request.reservation_id)
        .bind(request.owner_id)
        .bind(request.event_id)
        .execute(&self.pool)
        .await?;

        let used_count = updated.rows_affected() as i64;
        if used_count == 0 {
            let already_used: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM tickets \
                 WHERE reservation_id = ? AND owner_id = ? AND event_id = ? AND status = 'used'",
            )
            .bind(request.reservation_id)
            .bind(request.owner_id)
            .bind(request.event_id)
            .fetch_one(&self.pool)
            .await?;

            if already_used == 0 {
                return Err(AppError::NoActiveTickets(format!(
                    "No active tickets for reservation {} and owner {}",
                    request.reservation_id, request.owner_id
                )));
            }
        }

        Ok(MarkUsedResponse { used_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::{seed_event, seed_reservation, seed_user, setup_pool};
    use crate::entities::TicketStatus;
    use crate::models::{RefundAccountRequest, TransferRequest};
    use crate::services::{PaymentService, ReservationService, TransferService};
    use crate::models::RecordPaymentRequest;
    use crate::entities::PaymentType;
    use chrono::Duration;

    async fn record_payment(pool: &SqlitePool, reservation: i64, user: i64, event: i64, amount: i64) {
        PaymentService::new(pool.clone())
            .record(RecordPaymentRequest {
                reservation_id: reservation,
                user_id: user,
                event_id: event,
                payment_type: PaymentType::Payment,
                amount,
                bank_name: "First Bank".to_string(),
                account_number: "110-222-333".to_string(),
                account_holder: "Payer".to_string(),
                note: None,
                operator_id: 1,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_request_cancel_all_stamps_group() {
        let pool = setup_pool().await;
        let reservations = ReservationService::new(pool.clone());
        let tickets = TicketService::new(pool.clone());

        let user = seed_user(&pool, "alice", None).await;
        let event = seed_event(&pool, "Gala", Utc::now() + Duration::days(30), 10, 50000).await;
        let reservation = seed_reservation(&pool, event, user, "Alice", 3).await;
        reservations.confirm(reservation).await.unwrap();

        let response = tickets
            .request_cancel_all(RequestCancelAllRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: user,
                refund_account: None,
            })
            .await
            .unwrap();
        assert_eq!(response.requested_count, 3);

        let statuses: Vec<TicketStatus> = sqlx::query_scalar(
            "SELECT status FROM tickets WHERE reservation_id = ? ORDER BY ticket_number",
        )
        .bind(reservation)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert!(statuses.iter().all(|s| *s == TicketStatus::CancelRequested));

        // Nothing active remains, so a second request is rejected.
        let again = tickets
            .request_cancel_all(RequestCancelAllRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: user,
                refund_account: None,
            })
            .await;
        assert!(matches!(again, Err(AppError::NoActiveTickets(_))));
    }

    #[tokio::test]
    async fn test_recipient_must_supply_refund_account() {
        let pool = setup_pool().await;
        let reservations = ReservationService::new(pool.clone());
        let transfers = TransferService::new(pool.clone());
        let tickets = TicketService::new(pool.clone());

        let alice = seed_user(&pool, "alice", None).await;
        let bob = seed_user(&pool, "bob", None).await;
        let event = seed_event(&pool, "Gala", Utc::now() + Duration::days(30), 10, 50000).await;
        let reservation = seed_reservation(&pool, event, alice, "Alice", 3).await;
        reservations.confirm(reservation).await.unwrap();

        transfers
            .transfer(TransferRequest {
                reservation_id: reservation,
                event_id: event,
                from_user_id: alice,
                to_user_id: bob,
                transfer_count: 1,
                reason: None,
            })
            .await
            .unwrap();

        let missing_account = tickets
            .request_cancel_all(RequestCancelAllRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: bob,
                refund_account: None,
            })
            .await;
        assert!(matches!(missing_account, Err(AppError::ValidationError(_))));

        let response = tickets
            .request_cancel_all(RequestCancelAllRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: bob,
                refund_account: Some(RefundAccountRequest {
                    bank_name: "Second Bank".to_string(),
                    account_number: "999-888-777".to_string(),
                    account_holder: "Bob".to_string(),
                }),
            })
            .await
            .unwrap();
        assert_eq!(response.requested_count, 1);

        let mappings: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM refund_request_mappings \
             WHERE user_id = ? AND reservation_id = ? AND event_id = ?",
        )
        .bind(bob)
        .bind(reservation)
        .bind(event)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(mappings, 1);
    }

    #[tokio::test]
    async fn test_approve_requires_payment_and_is_idempotent() {
        let pool = setup_pool().await;
        let reservations = ReservationService::new(pool.clone());
        let tickets = TicketService::new(pool.clone());

        let user = seed_user(&pool, "alice", None).await;
        let event = seed_event(&pool, "Gala", Utc::now() + Duration::days(30), 10, 50000).await;
        let reservation = seed_reservation(&pool, event, user, "Alice", 2).await;
        reservations.confirm(reservation).await.unwrap();

        tickets
            .request_cancel_all(RequestCancelAllRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: user,
                refund_account: None,
            })
            .await
            .unwrap();

        let no_payment = tickets
            .approve_cancel_request(ApproveCancelRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: user,
            })
            .await;
        assert!(matches!(no_payment, Err(AppError::NoPaymentRecord(_))));

        record_payment(&pool, reservation, user, event, 100000).await;

        let approved = tickets
            .approve_cancel_request(ApproveCancelRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: user,
            })
            .await
            .unwrap();
        assert_eq!(approved.approved_count, 2);

        let again = tickets
            .approve_cancel_request(ApproveCancelRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: user,
            })
            .await
            .unwrap();
        assert_eq!(again.approved_count, 0);

        // Cancellation does not reopen seats.
        let reserved: i64 =
            sqlx::query_scalar("SELECT reserved_quantity FROM events WHERE id = ?")
                .bind(event)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(reserved, 2);
    }

    #[tokio::test]
    async fn test_mark_used_is_idempotent_per_group() {
        let pool = setup_pool().await;
        let reservations = ReservationService::new(pool.clone());
        let tickets = TicketService::new(pool.clone());

        let user = seed_user(&pool, "alice", None).await;
        let event = seed_event(&pool, "Gala", Utc::now() + Duration::days(1), 10, 50000).await;
        let reservation = seed_reservation(&pool, event, user, "Alice", 2).await;
        reservations.confirm(reservation).await.unwrap();

        let first = tickets
            .mark_used(MarkUsedRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: user,
            })
            .await
            .unwrap();
        assert_eq!(first.used_count, 2);

        let second = tickets
            .mark_used(MarkUsedRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: user,
            })
            .await
            .unwrap();
        assert_eq!(second.used_count, 0);

        let nobody = seed_user(&pool, "nobody", None).await;
        let no_group = tickets
            .mark_used(MarkUsedRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: nobody,
            })
            .await;
        assert!(matches!(no_group, Err(AppError::NoActiveTickets(_))));
    }

    #[tokio::test]
    async fn test_groups_split_after_partial_transfer() {
        let pool = setup_pool().await;
        let reservations = ReservationService::new(pool.clone());
        let transfers = TransferService::new(pool.clone());
        let tickets = TicketService::new(pool.clone());

        let alice = seed_user(&pool, "alice", None).await;
        let bob = seed_user(&pool, "bob", None).await;
        let event = seed_event(&pool, "Gala", Utc::now() + Duration::days(30), 10, 50000).await;
        let reservation = seed_reservation(&pool, event, alice, "Alice", 5).await;
        reservations.confirm(reservation).await.unwrap();

        transfers
            .transfer(TransferRequest {
                reservation_id: reservation,
                event_id: event,
                from_user_id: alice,
                to_user_id: bob,
                transfer_count: 2,
                reason: Some("friends".to_string()),
            })
            .await
            .unwrap();

        let groups = tickets
            .list_groups(&TicketGroupQuery {
                event_id: Some(event),
                reservation_id: Some(reservation),
                status: None,
            })
            .await
            .unwrap();

        assert_eq!(groups.len(), 2);
        let alice_group = groups.iter().find(|g| g.owner_id == alice).unwrap();
        let bob_group = groups.iter().find(|g| g.owner_id == bob).unwrap();
        assert_eq!(alice_group.ticket_count, 3);
        assert_eq!(bob_group.ticket_count, 2);
        assert_eq!(alice_group.status, TicketStatus::Active);
        assert_eq!(bob_group.status, TicketStatus::Active);
    }

    /// Full lifecycle: confirm, partial transfer, recipient cancellation,
    /// approval. Seat counter stays at the confirmed level throughout.
    #[tokio::test]
    async fn test_end_to_end_transfer_then_cancel() {
        let pool = setup_pool().await;
        let reservations = ReservationService::new(pool.clone());
        let transfers = TransferService::new(pool.clone());
        let tickets = TicketService::new(pool.clone());

        let alice = seed_user(&pool, "alice", None).await;
        let bob = seed_user(&pool, "bob", None).await;
        let event = seed_event(&pool, "Gala", Utc::now() + Duration::days(30), 10, 50000).await;
        let reservation = seed_reservation(&pool, event, alice, "Alice", 3).await;

        let confirmed = reservations.confirm(reservation).await.unwrap();
        assert_eq!(confirmed.tickets.len(), 3);

        transfers
            .transfer(TransferRequest {
                reservation_id: reservation,
                event_id: event,
                from_user_id: alice,
                to_user_id: bob,
                transfer_count: 1,
                reason: None,
            })
            .await
            .unwrap();

        record_payment(&pool, reservation, alice, event, 150000).await;

        tickets
            .request_cancel_all(RequestCancelAllRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: bob,
                refund_account: Some(RefundAccountRequest {
                    bank_name: "Second Bank".to_string(),
                    account_number: "999-888-777".to_string(),
                    account_holder: "Bob".to_string(),
                }),
            })
            .await
            .unwrap();

        let approved = tickets
            .approve_cancel_request(ApproveCancelRequest {
                event_id: event,
                reservation_id: reservation,
                owner_id: bob,
            })
            .await
            .unwrap();
        assert_eq!(approved.approved_count, 1);

        // Ticket-row total for the reservation is invariant across the whole
        // lifecycle.
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE reservation_id = ?")
                .bind(reservation)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(total, 3);

        let alice_active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets \
             WHERE reservation_id = ? AND owner_id = ? AND status = 'active'",
        )
        .bind(reservation)
        .bind(alice)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(alice_active, 2);

        let bob_cancelled: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets \
             WHERE reservation_id = ? AND owner_id = ? AND status = 'cancelled'",
        )
        .bind(reservation)
        .bind(bob)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(bob_cancelled, 1);

        let reserved: i64 =
            sqlx::query_scalar("SELECT reserved_quantity FROM events WHERE id = ?")
                .bind(event)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(reserved, 3);
    }
}
