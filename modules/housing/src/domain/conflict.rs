//! Booking conflict detection.
//!
//! Date ranges are closed intervals: a stay ending on the 10th and another
//! starting on the 10th both occupy the 10th and therefore conflict.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::contract::model::Booking;
use crate::domain::error::DomainError;
use crate::domain::repo::BookingsRepository;

/// Ordered, inclusive `[start, end]` date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::validation(
                "end_date",
                format!("end date {end} is before start date {start}"),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn of(booking: &Booking) -> Self {
        Self {
            start: booking.start_date,
            end: booking.end_date,
        }
    }
}

/// `[a, b]` and `[c, d]` overlap iff `a <= d && c <= b`.
pub fn overlaps(x: &DateRange, y: &DateRange) -> bool {
    x.start <= y.end && y.start <= x.end
}

/// Active bookings among `bookings` that overlap `range`, skipping `exclude`.
pub fn conflicting<'a>(
    bookings: &'a [Booking],
    range: &DateRange,
    exclude: Option<Uuid>,
) -> impl Iterator<Item = &'a Booking> + 'a {
    let range = *range;
    bookings.iter().filter(move |b| {
        Some(b.id) != exclude && b.status.is_active() && overlaps(&DateRange::of(b), &range)
    })
}

/// Active bookings on `listing_id` that overlap `range`. Read-only.
pub async fn find_conflicts<R>(
    repo: &R,
    listing_id: Uuid,
    range: &DateRange,
    exclude: Option<Uuid>,
) -> Result<Vec<Booking>, DomainError>
where
    R: BookingsRepository + ?Sized,
{
    let active = repo
        .active_bookings_for_listing(listing_id)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;
    Ok(conflicting(&active, range, exclude).cloned().collect())
}

pub async fn has_conflict<R>(
    repo: &R,
    listing_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<bool, DomainError>
where
    R: BookingsRepository + ?Sized,
{
    let range = DateRange::new(start, end)?;
    Ok(!find_conflicts(repo, listing_id, &range, None).await?.is_empty())
}
