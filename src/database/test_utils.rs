use super::DbPool;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;

/// In-memory database for service tests. A single connection is required:
/// every pooled connection to `sqlite::memory:` would otherwise open its own
/// empty database.
pub async fn setup_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory sqlite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

pub async fn seed_user(pool: &DbPool, nickname: &str, phone: Option<&str>) -> i64 {
    sqlx::query("INSERT INTO users (nickname, phone, status, created_at) VALUES (?, ?, 'active', ?)")
        .bind(nickname)
        .bind(phone)
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("failed to seed user")
        .last_insert_rowid()
}

pub async fn seed_event(
    pool: &DbPool,
    name: &str,
    date: DateTime<Utc>,
    seat_capacity: i64,
    ticket_price: i64,
) -> i64 {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO events (name, date, location, seat_capacity, reserved_quantity, ticket_price, status, created_at, updated_at) \
         VALUES (?, ?, 'Main Hall', ?, 0, ?, 'ongoing', ?, ?)",
    )
    .bind(name)
    .bind(date)
    .bind(seat_capacity)
    .bind(ticket_price)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .expect("failed to seed event")
    .last_insert_rowid()
}

pub async fn seed_reservation(
    pool: &DbPool,
    event_id: i64,
    user_id: i64,
    ticket_holder: &str,
    quantity: i64,
) -> i64 {
    sqlx::query(
        "INSERT INTO reservations (event_id, user_id, ticket_holder, quantity, status, reserved_at) \
         VALUES (?, ?, ?, ?, 'pending', ?)",
    )
    .bind(event_id)
    .bind(user_id)
    .bind(ticket_holder)
    .bind(quantity)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("failed to seed reservation")
    .last_insert_rowid()
}
