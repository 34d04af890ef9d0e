use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other modules and clients
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HousingError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        conflicting: Vec<Uuid>,
    },

    #[error("Cannot move booking from '{from}' to '{requested}'")]
    InvalidTransition { from: String, requested: String },

    #[error("Service unavailable")]
    Unavailable,
}

impl HousingError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            conflicting: Vec::new(),
        }
    }

    pub fn unavailable() -> Self {
        Self::Unavailable
    }

    /// Only transport/storage failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl From<crate::domain::error::DomainError> for HousingError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            Validation { field, message } => Self::validation(format!("{field}: {message}")),
            ListingNotFound { id } => Self::not_found("Listing", id),
            BookingNotFound { id } => Self::not_found("Booking", id),
            FavoriteNotFound { listing_id } => Self::not_found("Favorite", listing_id),
            Forbidden { reason } => Self::forbidden(reason),
            BookingConflict {
                listing_id,
                conflicting,
            } => Self::Conflict {
                message: format!("dates overlap existing bookings on listing {listing_id}"),
                conflicting,
            },
            ListingHasActiveBookings { id, count } => Self::conflict(format!(
                "listing {id} still has {count} active booking(s)"
            )),
            ListingHasBookingHistory { id, count } => Self::conflict(format!(
                "listing {id} is referenced by {count} past booking(s); mark it unavailable instead"
            )),
            DuplicateFavorite { listing_id } => {
                Self::conflict(format!("listing {listing_id} is already a favorite"))
            }
            InvalidTransition { from, requested } => Self::InvalidTransition { from, requested },
            Database { .. } => Self::unavailable(),
        }
    }
}
