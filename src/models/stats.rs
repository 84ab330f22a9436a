use crate::entities::EventStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current-versus-previous window values with an integer percent change.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PeriodComparison {
    pub current: i64,
    pub previous: i64,
    pub change_rate: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummaryResponse {
    pub revenue_today: PeriodComparison,
    pub revenue_week: PeriodComparison,
    pub revenue_month: PeriodComparison,
    pub reservations_today: PeriodComparison,
    pub reservations_week: PeriodComparison,
    pub reservations_month: PeriodComparison,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventStatsResponse {
    pub event_id: i64,
    pub name: String,
    pub status: EventStatus,
    pub seat_capacity: i64,
    pub reserved_quantity: i64,
    pub net_revenue: i64,
    pub confirmed_quantity: i64,
    pub pending_quantity: i64,
    pub cancelled_quantity: i64,
    /// reserved / capacity × 100, two decimals.
    pub sales_rate: f64,
    /// cancelled / total reserved × 100, two decimals.
    pub cancellation_rate: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRatesResponse {
    pub total_users: i64,
    pub active_users: i64,
    pub active_user_rate: f64,
    /// Distinct users with a reservation in the trailing 30 days.
    pub recently_active_users: i64,
    pub activity_user_rate: f64,
}
