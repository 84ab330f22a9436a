use crate::entities::{Event, Reservation, ReservationStatus, Ticket};
use crate::error::{AppError, AppResult};
use crate::models::{
    ConfirmReservationResponse, CreateReservationRequest, ReservationQuery, ReservationResponse,
    TicketResponse,
};
use crate::utils::{PaginatedResponse, PaginationParams};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ReservationService {
    pool: SqlitePool,
}

impl ReservationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_reservation(
        &self,
        request: CreateReservationRequest,
    ) -> AppResult<ReservationResponse> {
        if request.quantity <= 0 {
            return Err(AppError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }
        if request.ticket_holder.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Ticket holder must not be empty".to_string(),
            ));
        }

        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(request.event_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", request.event_id)))?;

        if event.status == crate::entities::EventStatus::Completed {
            return Err(AppError::ValidationError(
                "Event has already taken place".to_string(),
            ));
        }

        let id = sqlx::query(
            "INSERT INTO reservations (event_id, user_id, ticket_holder, quantity, status, reserved_at) \
             VALUES (?, ?, ?, ?, 'pending', ?)",
        )
        .bind(request.event_id)
        .bind(request.user_id)
        .bind(&request.ticket_holder)
        .bind(request.quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_reservation(id).await
    }

    pub async fn get_reservation(&self, reservation_id: i64) -> AppResult<ReservationResponse> {
        let reservation =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
                .bind(reservation_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Reservation {} not found", reservation_id))
                })?;

        Ok(ReservationResponse::from(reservation))
    }

    pub async fn list_reservations(
        &self,
        query: &ReservationQuery,
    ) -> AppResult<PaginatedResponse<ReservationResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut sql = String::from("SELECT * FROM reservations WHERE 1=1");
        let mut count_sql = String::from("SELECT COUNT(*) FROM reservations WHERE 1=1");
        for clause in [
            (query.user_id.is_some(), " AND user_id = ?"),
            (query.event_id.is_some(), " AND event_id = ?"),
            (query.status.is_some(), " AND status = ?"),
        ] {
            if clause.0 {
                sql.push_str(clause.1);
                count_sql.push_str(clause.1);
            }
        }
        sql.push_str(" ORDER BY reserved_at DESC LIMIT ? OFFSET ?");

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut list_query = sqlx::query_as::<_, Reservation>(&sql);
        if let Some(user_id) = query.user_id {
            count_query = count_query.bind(user_id);
            list_query = list_query.bind(user_id);
        }
        if let Some(event_id) = query.event_id {
            count_query = count_query.bind(event_id);
            list_query = list_query.bind(event_id);
        }
        if let Some(status) = query.status {
            count_query = count_query.bind(status);
            list_query = list_query.bind(status);
        }

        let total = count_query.fetch_one(&self.pool).await?;
        let reservations = list_query
            .bind(params.get_limit() as i64)
            .bind(params.get_offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let items: Vec<ReservationResponse> = reservations
            .into_iter()
            .map(ReservationResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// Confirms a pending reservation: bumps the event's seat counter and
    /// materializes one active ticket per seat unit, all in one transaction.
    pub async fn confirm(&self, reservation_id: i64) -> AppResult<ConfirmReservationResponse> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let reservation =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
                .bind(reservation_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Reservation {} not found", reservation_id))
                })?;

        if reservation.status != ReservationStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Reservation {} is {:?}, only pending reservations can be confirmed",
                reservation_id, reservation.status
            )));
        }

        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(reservation.event_id)
            .fetch_one(&mut *tx)
            .await?;

        if event.reserved_quantity + reservation.quantity > event.seat_capacity {
            return Err(AppError::CapacityExceeded(format!(
                "Event {} has {} of {} seats taken; cannot confirm {} more",
                event.id, event.reserved_quantity, event.seat_capacity, reservation.quantity
            )));
        }

        let updated = sqlx::query(
            "UPDATE reservations SET status = 'confirmed' WHERE id = ? AND status = 'pending'",
        )
        .bind(reservation_id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Reservation {} was modified concurrently",
                reservation_id
            )));
        }

        // Guarded counter bump: a concurrent confirm that got in first makes
        // this affect zero rows instead of overshooting capacity.
        let bumped = sqlx::query(
            "UPDATE events SET reserved_quantity = reserved_quantity + ?, updated_at = ? \
             WHERE id = ? AND reserved_quantity + ? <= seat_capacity",
        )
        .bind(reservation.quantity)
        .bind(now)
        .bind(event.id)
        .bind(reservation.quantity)
        .execute(&mut *tx)
        .await?;
        if bumped.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Seat counter for event {} was modified concurrently",
                event.id
            )));
        }

        sqlx::query(
            "UPDATE events SET status = 'sold_out', updated_at = ? \
             WHERE id = ? AND reserved_quantity >= seat_capacity AND status IN ('pending', 'ongoing')",
        )
        .bind(now)
        .bind(event.id)
        .execute(&mut *tx)
        .await?;

        for ticket_number in 1..=reservation.quantity {
            sqlx::query(
                "INSERT INTO tickets (reservation_id, event_id, owner_id, ticket_number, code, status, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, 'active', ?, ?)",
            )
            .bind(reservation_id)
            .bind(reservation.event_id)
            .bind(reservation.user_id)
            .bind(ticket_number)
            .bind(Uuid::new_v4().to_string())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE reservation_id = ? ORDER BY ticket_number ASC",
        )
        .bind(reservation_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!(
            "Reservation {} confirmed: {} tickets issued for event {}",
            reservation_id,
            tickets.len(),
            reservation.event_id
        );

        let mut reservation = reservation;
        reservation.status = ReservationStatus::Confirmed;

        Ok(ConfirmReservationResponse {
            reservation: ReservationResponse::from(reservation),
            tickets: tickets.into_iter().map(TicketResponse::from).collect(),
        })
    }

    /// Discards a pending reservation during admin review. Nothing was ever
    /// allocated, so no seat counter or ticket is touched.
    pub async fn void(&self, reservation_id: i64) -> AppResult<ReservationResponse> {
        self.void_internal(reservation_id, None).await
    }

    /// Self-service variant of `void`, restricted to the reservation owner.
    pub async fn cancel_pending(
        &self,
        reservation_id: i64,
        user_id: i64,
    ) -> AppResult<ReservationResponse> {
        self.void_internal(reservation_id, Some(user_id)).await
    }

    async fn void_internal(
        &self,
        reservation_id: i64,
        requesting_user: Option<i64>,
    ) -> AppResult<ReservationResponse> {
        let reservation =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
                .bind(reservation_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Reservation {} not found", reservation_id))
                })?;

        if let Some(user_id) = requesting_user
            && reservation.user_id != user_id
        {
            return Err(AppError::ValidationError(
                "Only the reservation owner can cancel it".to_string(),
            ));
        }

        if reservation.status != ReservationStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Reservation {} is {:?}, only pending reservations can be voided",
                reservation_id, reservation.status
            )));
        }

        let result = sqlx::query(
            "UPDATE reservations SET status = 'voided' WHERE id = ? AND status = 'pending'",
        )
        .bind(reservation_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Reservation {} was modified concurrently",
                reservation_id
            )));
        }

        log::info!("Reservation {} voided", reservation_id);

        let mut reservation = reservation;
        reservation.status = ReservationStatus::Voided;
        Ok(ReservationResponse::from(reservation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::{seed_event, seed_reservation, seed_user, setup_pool};
    use crate::entities::{EventStatus, TicketStatus};
    use chrono::Duration;

    #[tokio::test]
    async fn test_confirm_materializes_tickets_and_bumps_counter() {
        let pool = setup_pool().await;
        let service = ReservationService::new(pool.clone());

        let user = seed_user(&pool, "alice", None).await;
        let event = seed_event(&pool, "Gala", Utc::now() + Duration::days(30), 10, 50000).await;
        let reservation = seed_reservation(&pool, event, user, "Alice", 3).await;

        let confirmed = service.confirm(reservation).await.unwrap();
        assert_eq!(confirmed.reservation.status, ReservationStatus::Confirmed);
        assert_eq!(confirmed.tickets.len(), 3);
        assert!(
            confirmed
                .tickets
                .iter()
                .all(|t| t.status == TicketStatus::Active && t.owner_id == user)
        );
        let numbers: Vec<i64> = confirmed.tickets.iter().map(|t| t.ticket_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        let reserved: i64 =
            sqlx::query_scalar("SELECT reserved_quantity FROM events WHERE id = ?")
                .bind(event)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(reserved, 3);
    }

    #[tokio::test]
    async fn test_confirm_rejects_capacity_overshoot() {
        let pool = setup_pool().await;
        let service = ReservationService::new(pool.clone());

        let user = seed_user(&pool, "bob", None).await;
        let event = seed_event(&pool, "Small", Utc::now() + Duration::days(5), 2, 1000).await;
        let first = seed_reservation(&pool, event, user, "Bob", 2).await;
        let second = seed_reservation(&pool, event, user, "Bob", 1).await;

        service.confirm(first).await.unwrap();

        let result = service.confirm(second).await;
        assert!(matches!(result, Err(AppError::CapacityExceeded(_))));

        let reserved: i64 =
            sqlx::query_scalar("SELECT reserved_quantity FROM events WHERE id = ?")
                .bind(event)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(reserved, 2);
    }

    #[tokio::test]
    async fn test_confirm_marks_event_sold_out_at_capacity() {
        let pool = setup_pool().await;
        let service = ReservationService::new(pool.clone());

        let user = seed_user(&pool, "carol", None).await;
        let event = seed_event(&pool, "Tiny", Utc::now() + Duration::days(5), 2, 1000).await;
        let reservation = seed_reservation(&pool, event, user, "Carol", 2).await;

        service.confirm(reservation).await.unwrap();

        let status: EventStatus = sqlx::query_scalar("SELECT status FROM events WHERE id = ?")
            .bind(event)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status, EventStatus::SoldOut);
    }

    #[tokio::test]
    async fn test_confirm_requires_pending() {
        let pool = setup_pool().await;
        let service = ReservationService::new(pool.clone());

        let user = seed_user(&pool, "dave", None).await;
        let event = seed_event(&pool, "Gala", Utc::now() + Duration::days(5), 10, 1000).await;
        let reservation = seed_reservation(&pool, event, user, "Dave", 1).await;

        service.void(reservation).await.unwrap();
        let result = service.confirm(reservation).await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_void_has_no_seat_or_ticket_effect() {
        let pool = setup_pool().await;
        let service = ReservationService::new(pool.clone());

        let user = seed_user(&pool, "erin", None).await;
        let event = seed_event(&pool, "Gala", Utc::now() + Duration::days(5), 10, 1000).await;
        let reservation = seed_reservation(&pool, event, user, "Erin", 4).await;

        let voided = service.void(reservation).await.unwrap();
        assert_eq!(voided.status, ReservationStatus::Voided);

        let reserved: i64 =
            sqlx::query_scalar("SELECT reserved_quantity FROM events WHERE id = ?")
                .bind(event)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(reserved, 0);

        let tickets: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE reservation_id = ?")
                .bind(reservation)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(tickets, 0);
    }

    #[tokio::test]
    async fn test_cancel_pending_restricted_to_owner() {
        let pool = setup_pool().await;
        let service = ReservationService::new(pool.clone());

        let owner = seed_user(&pool, "frank", None).await;
        let stranger = seed_user(&pool, "grace", None).await;
        let event = seed_event(&pool, "Gala", Utc::now() + Duration::days(5), 10, 1000).await;
        let reservation = seed_reservation(&pool, event, owner, "Frank", 1).await;

        let denied = service.cancel_pending(reservation, stranger).await;
        assert!(matches!(denied, Err(AppError::ValidationError(_))));

        let cancelled = service.cancel_pending(reservation, owner).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Voided);
    }
}
