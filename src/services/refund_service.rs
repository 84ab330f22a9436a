use crate::config::RefundPolicyConfig;
use crate::entities::{Event, PaymentTransaction, RefundAccount, Reservation};
use crate::error::{AppError, AppResult};
use crate::models::{RefundDestination, RefundQuoteQuery, RefundQuoteResponse};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Outcome of the pure tier computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundComputation {
    pub days_until_event: i64,
    pub rate: u32,
    pub amount: i64,
}

/// Computes the refund for cancelling `cancel_count` tickets of a
/// reservation that paid `payment_amount` for `reservation_quantity` seats.
///
/// The day count is a true floor of the time left before the event, so a
/// request twelve hours after the event lands on day -1, not day 0. Each
/// ticket refunds its pro-rated share of the original deposit — not the
/// event's current list price — floored once at the end.
pub fn compute_refund(
    policy: &RefundPolicyConfig,
    event_date: DateTime<Utc>,
    requested_at: DateTime<Utc>,
    payment_amount: i64,
    reservation_quantity: i64,
    cancel_count: i64,
) -> RefundComputation {
    let days_until_event = (event_date - requested_at).num_seconds().div_euclid(86_400);

    let rate = if days_until_event < 0 || days_until_event < policy.cancelable_until_days {
        0
    } else {
        policy
            .tiers
            .iter()
            .find(|tier| days_until_event >= tier.days_before)
            .map(|tier| tier.rate)
            .unwrap_or(0)
    };

    let amount = if rate == 0 || reservation_quantity <= 0 {
        0
    } else {
        let numerator = payment_amount as i128 * cancel_count as i128 * rate as i128;
        let denominator = reservation_quantity as i128 * 100;
        (numerator / denominator) as i64
    };

    RefundComputation {
        days_until_event,
        rate,
        amount,
    }
}

#[derive(Clone)]
pub struct RefundService {
    pool: SqlitePool,
    policy: RefundPolicyConfig,
}

impl RefundService {
    pub fn new(pool: SqlitePool, policy: RefundPolicyConfig) -> Self {
        Self { pool, policy }
    }

    /// Quotes the refund for an owner's ticket group under a reservation.
    ///
    /// The window anchor is the cancellation-request time (the group's
    /// stamped `updated_at`) when a request is pending, otherwise now. Without
    /// a payment on file the quote is flagged non-refundable and approval
    /// must not proceed. For transfer recipients the destination switches to
    /// their mapped refund account; the rate computation is identical.
    pub async fn quote(&self, query: &RefundQuoteQuery) -> AppResult<RefundQuoteResponse> {
        let reservation =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
                .bind(query.reservation_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Reservation {} not found", query.reservation_id))
                })?;

        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(reservation.event_id)
            .fetch_one(&self.pool)
            .await?;

        let (pending_count, pending_anchor): (i64, Option<DateTime<Utc>>) = sqlx::query_as(
            "SELECT COUNT(*), MAX(updated_at) FROM tickets \
             WHERE reservation_id = ? AND owner_id = ? AND status = 'cancel_requested'",
        )
        .bind(query.reservation_id)
        .bind(query.owner_id)
        .fetch_one(&self.pool)
        .await?;

        let active_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets \
             WHERE reservation_id = ? AND owner_id = ? AND status = 'active'",
        )
        .bind(query.reservation_id)
        .bind(query.owner_id)
        .fetch_one(&self.pool)
        .await?;

        let ticket_count = match query.ticket_count {
            Some(count) if count >= 1 => count,
            Some(_) => {
                return Err(AppError::ValidationError(
                    "Ticket count must be at least 1".to_string(),
                ));
            }
            None if pending_count > 0 => pending_count,
            None => active_count,
        };

        if ticket_count == 0 {
            return Err(AppError::NoActiveTickets(format!(
                "No tickets to cancel for reservation {} and owner {}",
                query.reservation_id, query.owner_id
            )));
        }

        let requested_at = match pending_anchor {
            Some(anchor) if pending_count > 0 => anchor,
            _ => Utc::now(),
        };

        let payment = sqlx::query_as::<_, PaymentTransaction>(
            "SELECT * FROM payment_transactions \
             WHERE reservation_id = ? AND payment_type = 'payment' \
             ORDER BY operated_at ASC, id ASC LIMIT 1",
        )
        .bind(query.reservation_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(payment) = payment else {
            let computation = compute_refund(
                &self.policy,
                event.date,
                requested_at,
                0,
                reservation.quantity,
                ticket_count,
            );
            return Ok(RefundQuoteResponse {
                refundable: false,
                days_until_event: computation.days_until_event,
                rate: 0,
                ticket_count,
                amount: 0,
                destination: None,
            });
        };

        let computation = compute_refund(
            &self.policy,
            event.date,
            requested_at,
            payment.amount,
            reservation.quantity,
            ticket_count,
        );

        let mapped_account = sqlx::query_as::<_, RefundAccount>(
            "SELECT ra.* FROM refund_accounts ra \
             JOIN refund_request_mappings m ON m.refund_account_id = ra.id \
             WHERE m.user_id = ? AND m.reservation_id = ? AND m.event_id = ?",
        )
        .bind(query.owner_id)
        .bind(query.reservation_id)
        .bind(reservation.event_id)
        .fetch_optional(&self.pool)
        .await?;

        let destination = match mapped_account {
            Some(account) => RefundDestination {
                bank_name: account.bank_name,
                account_number: account.account_number,
                account_holder: account.account_holder,
                via_transfer: true,
            },
            None => RefundDestination {
                bank_name: payment.bank_name.clone(),
                account_number: payment.account_number.clone(),
                account_holder: payment.account_holder.clone(),
                via_transfer: false,
            },
        };

        Ok(RefundQuoteResponse {
            refundable: true,
            days_until_event: computation.days_until_event,
            rate: computation.rate,
            ticket_count,
            amount: computation.amount,
            destination: Some(destination),
        })
    }
}
