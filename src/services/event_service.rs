use crate::entities::{Event, EventStatus};
use crate::error::{AppError, AppResult};
use crate::models::{CreateEventRequest, EventQuery, EventResponse, UpdateEventStatusRequest};
use crate::utils::{PaginatedResponse, PaginationParams};
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct EventService {
    pool: SqlitePool,
}

impl EventService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_event(&self, request: CreateEventRequest) -> AppResult<EventResponse> {
        if request.seat_capacity < 0 {
            return Err(AppError::ValidationError(
                "Seat capacity must not be negative".to_string(),
            ));
        }
        if request.ticket_price < 0 {
            return Err(AppError::ValidationError(
                "Ticket price must not be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO events (name, date, location, seat_capacity, reserved_quantity, ticket_price, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 0, ?, 'pending', ?, ?)",
        )
        .bind(&request.name)
        .bind(request.date)
        .bind(&request.location)
        .bind(request.seat_capacity)
        .bind(request.ticket_price)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_event(id).await
    }

    pub async fn get_event(&self, event_id: i64) -> AppResult<EventResponse> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

        Ok(EventResponse::from(event))
    }

    pub async fn list_events(
        &self,
        query: &EventQuery,
    ) -> AppResult<PaginatedResponse<EventResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut sql = String::from("SELECT * FROM events WHERE 1=1");
        let mut count_sql = String::from("SELECT COUNT(*) FROM events WHERE 1=1");
        if query.status.is_some() {
            sql.push_str(" AND status = ?");
            count_sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY date ASC LIMIT ? OFFSET ?");

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(status) = query.status {
            count_query = count_query.bind(status);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let mut list_query = sqlx::query_as::<_, Event>(&sql);
        if let Some(status) = query.status {
            list_query = list_query.bind(status);
        }
        let events = list_query
            .bind(params.get_limit() as i64)
            .bind(params.get_offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let items: Vec<EventResponse> = events.into_iter().map(EventResponse::from).collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// Administrative status override. Capacity-driven transitions (sold_out)
    /// happen inside reservation confirmation instead.
    pub async fn update_status(
        &self,
        event_id: i64,
        request: UpdateEventStatusRequest,
    ) -> AppResult<EventResponse> {
        let result = sqlx::query("UPDATE events SET status = ?, updated_at = ? WHERE id = ?")
            .bind(request.status)
            .bind(Utc::now())
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Event {} not found", event_id)));
        }

        log::info!("Event {} status set to {:?}", event_id, request.status);
        self.get_event(event_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_pool;
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_and_get_event() {
        let pool = setup_pool().await;
        let service = EventService::new(pool);

        let created = service
            .create_event(CreateEventRequest {
                name: "Spring Gala".to_string(),
                date: Utc::now() + Duration::days(30),
                location: "Main Hall".to_string(),
                seat_capacity: 100,
                ticket_price: 50000,
            })
            .await
            .unwrap();

        assert_eq!(created.reserved_quantity, 0);
        assert_eq!(created.status, EventStatus::Pending);

        let fetched = service.get_event(created.id).await.unwrap();
        assert_eq!(fetched.name, "Spring Gala");
    }

    #[tokio::test]
    async fn test_create_event_rejects_negative_capacity() {
        let pool = setup_pool().await;
        let service = EventService::new(pool);

        let result = service
            .create_event(CreateEventRequest {
                name: "Bad".to_string(),
                date: Utc::now(),
                location: "Hall".to_string(),
                seat_capacity: -1,
                ticket_price: 1000,
            })
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_status() {
        let pool = setup_pool().await;
        let service = EventService::new(pool);

        let created = service
            .create_event(CreateEventRequest {
                name: "Gala".to_string(),
                date: Utc::now() + Duration::days(10),
                location: "Hall".to_string(),
                seat_capacity: 10,
                ticket_price: 1000,
            })
            .await
            .unwrap();

        let updated = service
            .update_status(
                created.id,
                UpdateEventStatusRequest {
                    status: EventStatus::Ongoing,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, EventStatus::Ongoing);

        let missing = service
            .update_status(
                9999,
                UpdateEventStatusRequest {
                    status: EventStatus::Completed,
                },
            )
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
