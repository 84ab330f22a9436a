/// Marks the tickets under (reservation_id, user_id, event_id) as a
/// transferred batch whose refund goes to the linked account. Presence of a
/// row is the sole signal that a ticket was received via transfer.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct RefundRequestMapping {
    pub id: i64,
    pub user_id: i64,
    pub refund_account_id: i64,
    pub reservation_id: i64,
    pub event_id: i64,
}
