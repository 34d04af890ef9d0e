use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Listing not found: {id}")]
    ListingNotFound { id: Uuid },

    #[error("Booking not found: {id}")]
    BookingNotFound { id: Uuid },

    #[error("Listing {listing_id} is not in favorites")]
    FavoriteNotFound { listing_id: Uuid },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Dates overlap {} active booking(s) on listing {listing_id}", .conflicting.len())]
    BookingConflict {
        listing_id: Uuid,
        conflicting: Vec<Uuid>,
    },

    #[error("Listing {id} has {count} active booking(s)")]
    ListingHasActiveBookings { id: Uuid, count: usize },

    #[error("Listing {id} is referenced by {count} past booking(s)")]
    ListingHasBookingHistory { id: Uuid, count: u64 },

    #[error("Listing {listing_id} is already a favorite")]
    DuplicateFavorite { listing_id: Uuid },

    #[error("Invalid status transition: '{from}' -> '{requested}'")]
    InvalidTransition { from: String, requested: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn listing_not_found(id: Uuid) -> Self {
        Self::ListingNotFound { id }
    }

    pub fn booking_not_found(id: Uuid) -> Self {
        Self::BookingNotFound { id }
    }

    pub fn favorite_not_found(listing_id: Uuid) -> Self {
        Self::FavoriteNotFound { listing_id }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn booking_conflict(listing_id: Uuid, conflicting: Vec<Uuid>) -> Self {
        Self::BookingConflict {
            listing_id,
            conflicting,
        }
    }

    pub fn listing_has_active_bookings(id: Uuid, count: usize) -> Self {
        Self::ListingHasActiveBookings { id, count }
    }

    pub fn listing_has_booking_history(id: Uuid, count: u64) -> Self {
        Self::ListingHasBookingHistory { id, count }
    }

    pub fn duplicate_favorite(listing_id: Uuid) -> Self {
        Self::DuplicateFavorite { listing_id }
    }

    pub fn invalid_transition(from: impl Into<String>, requested: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            requested: requested.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
