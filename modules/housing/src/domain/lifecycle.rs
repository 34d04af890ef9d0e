//! Booking status transitions and who may perform them.

use uuid::Uuid;

use crate::contract::model::{Actor, Booking, BookingStatus, PaymentStatus, Role};
use crate::domain::error::DomainError;

/// Statuses a caller may ask for. `completed` is set by the system only.
const SETTABLE: [BookingStatus; 3] = [
    BookingStatus::Pending,
    BookingStatus::Confirmed,
    BookingStatus::Cancelled,
];

/// Outcome of an authorized status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Inactive → active; the dates must be re-checked for conflicts.
    pub reactivates: bool,
}

/// Decide whether `actor` may move `booking` to `requested`.
///
/// `listing_owner` is the landlord of the booking's listing. Checks run in
/// order: ownership, role rules, requested value, terminal state.
pub fn plan_transition(
    booking: &Booking,
    listing_owner: Uuid,
    actor: &Actor,
    requested: &str,
) -> Result<Transition, DomainError> {
    match actor.role {
        Role::Student => {
            if booking.student_id != actor.user_id {
                return Err(DomainError::forbidden("booking belongs to another student"));
            }
            if requested != BookingStatus::Cancelled.as_str() {
                return Err(DomainError::forbidden("students may only cancel bookings"));
            }
            if booking.status != BookingStatus::Pending {
                return Err(DomainError::forbidden(format!(
                    "only pending bookings can be cancelled by the student (booking is {})",
                    booking.status
                )));
            }
        }
        Role::Landlord => {
            if listing_owner != actor.user_id {
                return Err(DomainError::forbidden("listing belongs to another landlord"));
            }
        }
    }

    let target = requested
        .parse::<BookingStatus>()
        .ok()
        .filter(|s| SETTABLE.contains(s))
        .ok_or_else(|| DomainError::invalid_transition(booking.status.as_str(), requested))?;

    if booking.status == BookingStatus::Completed {
        return Err(DomainError::invalid_transition(
            booking.status.as_str(),
            requested,
        ));
    }

    let payment_status = if booking.status == BookingStatus::Confirmed
        && booking.payment_status == PaymentStatus::Paid
        && target == BookingStatus::Cancelled
    {
        PaymentStatus::Refunded
    } else {
        booking.payment_status
    };

    Ok(Transition {
        status: target,
        payment_status,
        reactivates: !booking.status.is_active() && target.is_active(),
    })
}
