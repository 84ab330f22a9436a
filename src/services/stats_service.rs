use crate::entities::{Event, PaymentType, ReservationStatus};
use crate::error::AppResult;
use crate::models::{
    DashboardSummaryResponse, EventStatsResponse, PeriodComparison, UserRatesResponse,
};
use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Half-open [start, end) timestamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }
}

/// The fixed dashboard buckets relative to a reference "now". Weeks start on
/// Sunday.
#[derive(Debug, Clone, Copy)]
pub struct PeriodWindows {
    pub today: Window,
    pub yesterday: Window,
    pub this_week: Window,
    pub last_week: Window,
    pub this_month: Window,
    pub last_month: Window,
}

impl PeriodWindows {
    pub fn at(now: DateTime<Utc>) -> Self {
        let today_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let week_start =
            today_start - Duration::days(now.date_naive().weekday().num_days_from_sunday() as i64);
        let month_first = now.date_naive().with_day0(0).unwrap();
        let month_start = month_first.and_time(NaiveTime::MIN).and_utc();
        let next_month_start = month_first
            .checked_add_months(Months::new(1))
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc();
        let last_month_start = month_first
            .checked_sub_months(Months::new(1))
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc();

        Self {
            today: Window {
                start: today_start,
                end: today_start + Duration::days(1),
            },
            yesterday: Window {
                start: today_start - Duration::days(1),
                end: today_start,
            },
            this_week: Window {
                start: week_start,
                end: week_start + Duration::days(7),
            },
            last_week: Window {
                start: week_start - Duration::days(7),
                end: week_start,
            },
            this_month: Window {
                start: month_start,
                end: next_month_start,
            },
            last_month: Window {
                start: last_month_start,
                end: month_start,
            },
        }
    }
}

/// Percent change between a current and previous period value, rounded to the
/// nearest integer. A previous value of zero pins the result to ±100.
pub fn change_rate(current: i64, previous: i64) -> i64 {
    if previous == 0 {
        if current == 0 {
            0
        } else if current > 0 {
            100
        } else {
            -100
        }
    } else {
        ((current - previous) as f64 / previous as f64 * 100.0).round() as i64
    }
}

/// Rounds a non-negative rate to two decimal places, half-up.
pub fn round_two(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Read-only dashboard aggregation over the ledger and reservation records.
/// Reads are not transactionally isolated from concurrent writes; the numbers
/// are advisory, not balances.
#[derive(Clone)]
pub struct StatsService {
    pool: SqlitePool,
}

impl StatsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn dashboard_summary(
        &self,
        now: DateTime<Utc>,
    ) -> AppResult<DashboardSummaryResponse> {
        let windows = PeriodWindows::at(now);
        let since = windows.last_month.start.min(windows.last_week.start);

        let payments: Vec<(PaymentType, i64, DateTime<Utc>)> = sqlx::query_as(
            "SELECT payment_type, amount, operated_at FROM payment_transactions WHERE operated_at >= ?",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let reservations: Vec<DateTime<Utc>> =
            sqlx::query_scalar("SELECT reserved_at FROM reservations WHERE reserved_at >= ?")
                .bind(since)
                .fetch_all(&self.pool)
                .await?;

        let net = |window: &Window| -> i64 {
            payments
                .iter()
                .filter(|(_, _, operated_at)| window.contains(*operated_at))
                .map(|(payment_type, amount, _)| match payment_type {
                    PaymentType::Payment => *amount,
                    PaymentType::Refund => -amount,
                })
                .sum()
        };
        let created = |window: &Window| -> i64 {
            reservations
                .iter()
                .filter(|reserved_at| window.contains(**reserved_at))
                .count() as i64
        };

        let compare = |current: i64, previous: i64| PeriodComparison {
            current,
            previous,
            change_rate: change_rate(current, previous),
        };

        Ok(DashboardSummaryResponse {
            revenue_today: compare(net(&windows.today), net(&windows.yesterday)),
            revenue_week: compare(net(&windows.this_week), net(&windows.last_week)),
            revenue_month: compare(net(&windows.this_month), net(&windows.last_month)),
            reservations_today: compare(created(&windows.today), created(&windows.yesterday)),
            reservations_week: compare(created(&windows.this_week), created(&windows.last_week)),
            reservations_month: compare(created(&windows.this_month), created(&windows.last_month)),
        })
    }

    pub async fn event_stats(&self) -> AppResult<Vec<EventStatsResponse>> {
        let events = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY date ASC")
            .fetch_all(&self.pool)
            .await?;

        let payment_sums: Vec<(i64, PaymentType, i64)> = sqlx::query_as(
            "SELECT event_id, payment_type, COALESCE(SUM(amount), 0) \
             FROM payment_transactions GROUP BY event_id, payment_type",
        )
        .fetch_all(&self.pool)
        .await?;

        let reservation_sums: Vec<(i64, ReservationStatus, i64)> = sqlx::query_as(
            "SELECT event_id, status, COALESCE(SUM(quantity), 0) \
             FROM reservations GROUP BY event_id, status",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut net_by_event: HashMap<i64, i64> = HashMap::new();
        for (event_id, payment_type, amount) in payment_sums {
            let delta = match payment_type {
                PaymentType::Payment => amount,
                PaymentType::Refund => -amount,
            };
            *net_by_event.entry(event_id).or_insert(0) += delta;
        }

        // (confirmed, pending, cancelled) quantity sums per event; voided
        // reservations count as cancelled.
        let mut quantities: HashMap<i64, (i64, i64, i64)> = HashMap::new();
        for (event_id, status, quantity) in reservation_sums {
            let entry = quantities.entry(event_id).or_insert((0, 0, 0));
            match status {
                ReservationStatus::Confirmed => entry.0 += quantity,
                ReservationStatus::Pending => entry.1 += quantity,
                ReservationStatus::Voided => entry.2 += quantity,
            }
        }

        let stats = events
            .into_iter()
            .map(|event| {
                let (confirmed, pending, cancelled) =
                    quantities.get(&event.id).copied().unwrap_or((0, 0, 0));
                let total = confirmed + pending + cancelled;

                let sales_rate = if event.seat_capacity == 0 {
                    0.0
                } else {
                    round_two(
                        event.reserved_quantity as f64 / event.seat_capacity as f64 * 100.0,
                    )
                };
                let cancellation_rate = if total == 0 {
                    0.0
                } else {
                    round_two(cancelled as f64 / total as f64 * 100.0)
                };

                EventStatsResponse {
                    event_id: event.id,
                    name: event.name,
                    status: event.status,
                    seat_capacity: event.seat_capacity,
                    reserved_quantity: event.reserved_quantity,
                    net_revenue: net_by_event.get(&event.id).copied().unwrap_or(0),
                    confirmed_quantity: confirmed,
                    pending_quantity: pending,
                    cancelled_quantity: cancelled,
                    sales_rate,
                    cancellation_rate,
                }
            })
            .collect();

        Ok(stats)
    }

    pub async fn user_rates(&self, now: DateTime<Utc>) -> AppResult<UserRatesResponse> {
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let active_users: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;
        let recently_active_users: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT user_id) FROM reservations WHERE reserved_at >= ?",
        )
        .bind(now - Duration::days(30))
        .fetch_one(&self.pool)
        .await?;

        let rate = |count: i64| {
            if total_users == 0 {
                0.0
            } else {
                round_two(count as f64 / total_users as f64 * 100.0)
            }
        };

        Ok(UserRatesResponse {
            total_users,
            active_users,
            active_user_rate: rate(active_users),
            recently_active_users,
            activity_user_rate: rate(recently_active_users),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_change_rate_edge_cases() {
        assert_eq!(change_rate(0, 0), 0);
        assert_eq!(change_rate(5, 0), 100);
        assert_eq!(change_rate(-5, 0), -100);
        assert_eq!(change_rate(0, 5), -100);
        assert_eq!(change_rate(150, 100), 50);
        assert_eq!(change_rate(100, 150), -33);
    }

    #[test]
    fn test_round_two_half_up() {
        assert_eq!(round_two(100.0 / 3.0), 33.33);
        assert_eq!(round_two(200.0 / 3.0), 66.67);
        assert_eq!(round_two(87.5), 87.5);
        assert_eq!(round_two(0.0), 0.0);
    }

    #[test]
    fn test_period_windows_layout() {
        // Wednesday, 2026-08-05.
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 15, 30, 0).unwrap();
        let windows = PeriodWindows::at(now);

        let day = |d: u32| Utc.with_ymd_and_hms(2026, 8, d, 0, 0, 0).unwrap();

        assert_eq!(windows.today.start, day(5));
        assert_eq!(windows.today.end, day(6));
        assert_eq!(windows.yesterday.start, day(4));
        assert_eq!(windows.this_week.start, day(2)); // Sunday
        assert_eq!(windows.last_week.start, Utc.with_ymd_and_hms(2026, 7, 26, 0, 0, 0).unwrap());
        assert_eq!(windows.this_month.start, day(1));
        assert_eq!(windows.this_month.end, Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap());
        assert_eq!(windows.last_month.start, Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap());
        assert_eq!(windows.last_month.end, day(1));
    }

    #[test]
    fn test_window_bounds_are_half_open() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();
        let windows = PeriodWindows::at(now);

        assert!(windows.today.contains(windows.today.start));
        assert!(!windows.today.contains(windows.today.end));
        assert!(windows.yesterday.contains(windows.today.start - Duration::seconds(1)));
    }

    mod aggregation {
        use super::*;
        use crate::database::test_utils::{seed_event, seed_reservation, seed_user, setup_pool};
        use crate::services::ReservationService;

        async fn insert_payment(
            pool: &SqlitePool,
            reservation: i64,
            user: i64,
            event: i64,
            payment_type: &str,
            amount: i64,
            operated_at: DateTime<Utc>,
        ) {
            sqlx::query(
                "INSERT INTO payment_transactions \
                 (reservation_id, user_id, event_id, payment_type, amount, bank_name, account_number, account_holder, operated_at, operator_id) \
                 VALUES (?, ?, ?, ?, ?, 'Bank', '1-2-3', 'Holder', ?, 1)",
            )
            .bind(reservation)
            .bind(user)
            .bind(event)
            .bind(payment_type)
            .bind(amount)
            .bind(operated_at)
            .execute(pool)
            .await
            .unwrap();
        }

        #[tokio::test]
        async fn test_event_stats_rates() {
            let pool = setup_pool().await;
            let reservations = ReservationService::new(pool.clone());
            let service = StatsService::new(pool.clone());

            let user = seed_user(&pool, "alice", None).await;
            let event =
                seed_event(&pool, "Gala", Utc::now() + Duration::days(30), 10, 50000).await;

            let confirmed = seed_reservation(&pool, event, user, "Alice", 3).await;
            reservations.confirm(confirmed).await.unwrap();
            seed_reservation(&pool, event, user, "Alice", 2).await;
            let voided = seed_reservation(&pool, event, user, "Alice", 1).await;
            reservations.void(voided).await.unwrap();

            insert_payment(&pool, confirmed, user, event, "payment", 150000, Utc::now()).await;
            insert_payment(&pool, confirmed, user, event, "refund", 50000, Utc::now()).await;

            let stats = service.event_stats().await.unwrap();
            assert_eq!(stats.len(), 1);
            let s = &stats[0];
            assert_eq!(s.net_revenue, 100000);
            assert_eq!(s.confirmed_quantity, 3);
            assert_eq!(s.pending_quantity, 2);
            assert_eq!(s.cancelled_quantity, 1);
            assert_eq!(s.reserved_quantity, 3);
            assert_eq!(s.sales_rate, 30.0);
            // 1 of 6 reserved seats cancelled.
            assert_eq!(s.cancellation_rate, 16.67);
        }

        #[tokio::test]
        async fn test_event_stats_zero_denominators() {
            let pool = setup_pool().await;
            let service = StatsService::new(pool.clone());

            seed_event(&pool, "Empty", Utc::now() + Duration::days(5), 0, 1000).await;

            let stats = service.event_stats().await.unwrap();
            assert_eq!(stats[0].sales_rate, 0.0);
            assert_eq!(stats[0].cancellation_rate, 0.0);
        }

        #[tokio::test]
        async fn test_dashboard_summary_change_rates() {
            let pool = setup_pool().await;
            let service = StatsService::new(pool.clone());

            let now = Utc::now();
            let user = seed_user(&pool, "alice", None).await;
            let event = seed_event(&pool, "Gala", now + Duration::days(30), 10, 50000).await;
            let reservation = seed_reservation(&pool, event, user, "Alice", 2).await;

            insert_payment(&pool, reservation, user, event, "payment", 100000, now).await;
            insert_payment(
                &pool,
                reservation,
                user,
                event,
                "payment",
                50000,
                now - Duration::days(1),
            )
            .await;

            let summary = service.dashboard_summary(now).await.unwrap();
            assert_eq!(summary.revenue_today.current, 100000);
            assert_eq!(summary.revenue_today.previous, 50000);
            assert_eq!(summary.revenue_today.change_rate, 100);

            // The reservation seeded just now counts toward today only.
            assert_eq!(summary.reservations_today.current, 1);
            assert_eq!(summary.reservations_today.previous, 0);
            assert_eq!(summary.reservations_today.change_rate, 100);
        }

        #[tokio::test]
        async fn test_user_rates() {
            let pool = setup_pool().await;
            let service = StatsService::new(pool.clone());

            let alice = seed_user(&pool, "alice", None).await;
            seed_user(&pool, "bob", None).await;
            sqlx::query("INSERT INTO users (nickname, status, created_at) VALUES ('carol', 'inactive', ?)")
                .bind(Utc::now())
                .execute(&pool)
                .await
                .unwrap();

            let event = seed_event(&pool, "Gala", Utc::now() + Duration::days(30), 10, 1000).await;
            seed_reservation(&pool, event, alice, "Alice", 1).await;

            let rates = service.user_rates(Utc::now()).await.unwrap();
            assert_eq!(rates.total_users, 3);
            assert_eq!(rates.active_users, 2);
            assert_eq!(rates.active_user_rate, 66.67);
            assert_eq!(rates.recently_active_users, 1);
            assert_eq!(rates.activity_user_rate, 33.33);
        }
    }
}
