use problem::{ErrDef, ProblemResponse, ValidationError};

use crate::domain::error::DomainError;

macro_rules! housing_err {
    ($name:ident, $status:literal, $title:literal, $code:literal) => {
        pub const $name: ErrDef = ErrDef::new(
            $status,
            $title,
            $code,
            concat!("https://errors.dormease.dev/", $code),
        );
    };
}

/// Error catalog for the housing REST surface.
pub mod catalog {
    use super::ErrDef;

    housing_err!(VALIDATION, 400, "Validation error", "HOUSING_VALIDATION");
    housing_err!(
        INVALID_TRANSITION,
        400,
        "Invalid status transition",
        "HOUSING_INVALID_TRANSITION"
    );
    housing_err!(UNAUTHENTICATED, 401, "Unauthorized", "HOUSING_UNAUTHENTICATED");
    housing_err!(FORBIDDEN, 403, "Forbidden", "HOUSING_FORBIDDEN");
    housing_err!(LISTING_NOT_FOUND, 404, "Listing not found", "HOUSING_LISTING_NOT_FOUND");
    housing_err!(BOOKING_NOT_FOUND, 404, "Booking not found", "HOUSING_BOOKING_NOT_FOUND");
    housing_err!(
        FAVORITE_NOT_FOUND,
        404,
        "Favorite not found",
        "HOUSING_FAVORITE_NOT_FOUND"
    );
    housing_err!(BOOKING_CONFLICT, 409, "Booking conflict", "HOUSING_BOOKING_CONFLICT");
    housing_err!(
        LISTING_HAS_BOOKINGS,
        409,
        "Listing has bookings",
        "HOUSING_LISTING_HAS_BOOKINGS"
    );
    housing_err!(FAVORITE_EXISTS, 409, "Favorite already exists", "HOUSING_FAVORITE_EXISTS");
    housing_err!(
        UNAVAILABLE,
        503,
        "Service unavailable",
        "HOUSING_UNAVAILABLE"
    );
}

/// Map domain error to RFC 9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Validation { field, message } => {
            let mut resp = catalog::VALIDATION.respond(e.to_string(), instance);
            resp.0 = resp.0.with_errors(vec![ValidationError {
                detail: message.clone(),
                pointer: format!("/{field}"),
            }]);
            resp
        }
        DomainError::ListingNotFound { id } => catalog::LISTING_NOT_FOUND
            .respond(format!("Listing with id {id} was not found"), instance),
        DomainError::BookingNotFound { id } => catalog::BOOKING_NOT_FOUND
            .respond(format!("Booking with id {id} was not found"), instance),
        DomainError::FavoriteNotFound { listing_id } => catalog::FAVORITE_NOT_FOUND.respond(
            format!("Listing {listing_id} is not in your favorites"),
            instance,
        ),
        DomainError::Forbidden { reason } => catalog::FORBIDDEN.respond(reason.clone(), instance),
        DomainError::BookingConflict {
            listing_id,
            conflicting,
        } => {
            let ids: Vec<String> = conflicting.iter().map(|id| id.to_string()).collect();
            catalog::BOOKING_CONFLICT.respond(
                format!(
                    "Requested dates overlap active booking(s) on listing {listing_id}: {}",
                    ids.join(", ")
                ),
                instance,
            )
        }
        DomainError::ListingHasActiveBookings { .. }
        | DomainError::ListingHasBookingHistory { .. } => {
            catalog::LISTING_HAS_BOOKINGS.respond(e.to_string(), instance)
        }
        DomainError::DuplicateFavorite { .. } => {
            catalog::FAVORITE_EXISTS.respond(e.to_string(), instance)
        }
        DomainError::InvalidTransition { from, requested } => catalog::INVALID_TRANSITION
            .respond(
                format!("A booking in status '{from}' cannot be set to '{requested}'"),
                instance,
            ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            catalog::UNAVAILABLE.respond("The service is temporarily unavailable", instance)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn status_codes_follow_error_kind() {
        let id = Uuid::new_v4();
        let cases = [
            (DomainError::validation("title", "empty"), 400),
            (DomainError::invalid_transition("completed", "pending"), 400),
            (DomainError::forbidden("no"), 403),
            (DomainError::listing_not_found(id), 404),
            (DomainError::booking_not_found(id), 404),
            (DomainError::favorite_not_found(id), 404),
            (DomainError::booking_conflict(id, vec![id]), 409),
            (DomainError::listing_has_active_bookings(id, 1), 409),
            (DomainError::duplicate_favorite(id), 409),
            (DomainError::database("locked"), 503),
        ];
        for (err, status) in cases {
            assert_eq!(map_domain_error(&err, "/x").0.status, status, "{err}");
        }
    }

    #[test]
    fn invalid_transition_has_its_own_code() {
        let p = map_domain_error(&DomainError::invalid_transition("completed", "pending"), "/b")
            .0;
        assert_eq!(p.code, "HOUSING_INVALID_TRANSITION");
        assert_ne!(p.code, catalog::VALIDATION.code);
    }

    #[test]
    fn validation_points_at_field() {
        let p = map_domain_error(
            &DomainError::validation("monthly_price", "too high"),
            "/listings",
        )
        .0;
        let errors = p.errors.unwrap();
        assert_eq!(errors[0].pointer, "/monthly_price");
        assert_eq!(errors[0].detail, "too high");
    }

    #[test]
    fn conflict_detail_names_overlapping_bookings() {
        let listing = Uuid::new_v4();
        let other = Uuid::new_v4();
        let p = map_domain_error(&DomainError::booking_conflict(listing, vec![other]), "/bookings")
            .0;
        assert!(p.detail.contains(&other.to_string()));
        assert_eq!(p.instance, "/bookings");
    }

    #[test]
    fn database_details_are_not_exposed() {
        let p = map_domain_error(&DomainError::database("SQLITE_BUSY at /var/db"), "/x").0;
        assert!(!p.detail.contains("SQLITE_BUSY"));
    }
}
