use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use problem::{Problem, ProblemResponse};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::auth::Authenticated;
use crate::api::rest::dto::{
    AvailabilityDto, AvailabilityQuery, BookingDto, CreateBookingReq, CreateListingReq,
    FavoriteCheckDto, FavoriteDto, FavoriteToggleDto, ListListingsQuery, ListingDto,
    ProfileDto, ProfilePictureReq, UpdateBookingStatusReq, UpdateListingReq, UpdateProfileReq,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{JsonBody, PathParam, QueryParams};
use crate::domain::service::Service;

// --- listings ---

/// List listings, optionally filtered by landlord and status
#[utoipa::path(
    get,
    path = "/listings",
    tag = "listings",
    operation_id = "housing.list_listings",
    params(ListListingsQuery),
    responses(
        (status = 200, description = "Listings, newest first", body = [ListingDto]),
        (status = 503, description = "Storage unavailable", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn list_listings(
    Extension(svc): Extension<Arc<Service>>,
    QueryParams(query): QueryParams<ListListingsQuery>,
    uri: Uri,
) -> Result<Json<Vec<ListingDto>>, ProblemResponse> {
    info!("Listing listings with query: {:?}", query);

    match svc.list_listings(query.into()).await {
        Ok(listings) => Ok(Json(listings.into_iter().map(ListingDto::from).collect())),
        Err(e) => {
            error!("Failed to list listings: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific listing by ID
#[utoipa::path(
    get,
    path = "/listings/{id}",
    tag = "listings",
    operation_id = "housing.get_listing",
    params(("id" = Uuid, Path, description = "Listing UUID")),
    responses(
        (status = 200, description = "Listing found", body = ListingDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn get_listing(
    Extension(svc): Extension<Arc<Service>>,
    PathParam(id): PathParam<Uuid>,
    uri: Uri,
) -> Result<Json<ListingDto>, ProblemResponse> {
    info!("Getting listing with id: {}", id);

    match svc.get_listing(id).await {
        Ok(listing) => Ok(Json(ListingDto::from(listing))),
        Err(e) => {
            error!("Failed to get listing {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/listings",
    tag = "listings",
    operation_id = "housing.create_listing",
    request_body = CreateListingReq,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Created listing", body = ListingDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json"),
        (status = 403, description = "Forbidden", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn create_listing(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
    JsonBody(req_body): JsonBody<CreateListingReq>,
) -> Result<(StatusCode, Json<ListingDto>), ProblemResponse> {
    info!("Creating listing: {:?}", req_body.title);

    match svc.create_listing(&actor, req_body.into()).await {
        Ok(listing) => Ok((StatusCode::CREATED, Json(ListingDto::from(listing)))),
        Err(e) => {
            error!("Failed to create listing: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    put,
    path = "/listings/{id}",
    tag = "listings",
    operation_id = "housing.update_listing",
    params(("id" = Uuid, Path, description = "Listing UUID")),
    request_body = UpdateListingReq,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated listing", body = ListingDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 403, description = "Forbidden", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn update_listing(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req_body): JsonBody<UpdateListingReq>,
) -> Result<Json<ListingDto>, ProblemResponse> {
    info!("Updating listing {} with: {:?}", id, req_body);

    match svc.update_listing(&actor, id, req_body.into()).await {
        Ok(listing) => Ok(Json(ListingDto::from(listing))),
        Err(e) => {
            error!("Failed to update listing {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/listings/{id}",
    tag = "listings",
    operation_id = "housing.delete_listing",
    params(("id" = Uuid, Path, description = "Listing UUID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 403, description = "Forbidden", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Listing has active bookings", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn delete_listing(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting listing: {}", id);

    match svc.delete_listing(&actor, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete listing {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Check whether a date range is free on a listing
#[utoipa::path(
    get,
    path = "/listings/{id}/availability",
    tag = "listings",
    operation_id = "housing.check_availability",
    params(("id" = Uuid, Path, description = "Listing UUID"), AvailabilityQuery),
    responses(
        (status = 200, description = "Availability of the range", body = AvailabilityDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn check_availability(
    Extension(svc): Extension<Arc<Service>>,
    PathParam(id): PathParam<Uuid>,
    QueryParams(query): QueryParams<AvailabilityQuery>,
    uri: Uri,
) -> Result<Json<AvailabilityDto>, ProblemResponse> {
    info!("Checking availability of listing {}: {:?}", id, query);

    match svc.has_conflict(id, query.start_date, query.end_date).await {
        Ok(conflict) => Ok(Json(AvailabilityDto {
            listing_id: id,
            start_date: query.start_date,
            end_date: query.end_date,
            available: !conflict,
        })),
        Err(e) => {
            error!("Failed to check availability of listing {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// --- bookings ---

#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    operation_id = "housing.list_bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Bookings visible to the caller", body = [BookingDto]),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn list_bookings(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
) -> Result<Json<Vec<BookingDto>>, ProblemResponse> {
    info!("Listing bookings for {:?}", actor.role);

    match svc.list_bookings(&actor).await {
        Ok(bookings) => Ok(Json(bookings.into_iter().map(BookingDto::from).collect())),
        Err(e) => {
            error!("Failed to list bookings: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Request a booking; it starts as pending
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    operation_id = "housing.create_booking",
    request_body = CreateBookingReq,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Created booking", body = BookingDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 403, description = "Forbidden", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Listing not found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Dates overlap an active booking", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn create_booking(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
    JsonBody(req_body): JsonBody<CreateBookingReq>,
) -> Result<(StatusCode, Json<BookingDto>), ProblemResponse> {
    info!("Creating booking: {:?}", req_body);

    match svc.create_booking(&actor, req_body.into()).await {
        Ok(booking) => Ok((StatusCode::CREATED, Json(BookingDto::from(booking)))),
        Err(e) => {
            error!("Failed to create booking: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    operation_id = "housing.get_booking",
    params(("id" = Uuid, Path, description = "Booking UUID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Booking found", body = BookingDto),
        (status = 403, description = "Forbidden", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn get_booking(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<BookingDto>, ProblemResponse> {
    info!("Getting booking with id: {}", id);

    match svc.get_booking(&actor, id).await {
        Ok(booking) => Ok(Json(BookingDto::from(booking))),
        Err(e) => {
            error!("Failed to get booking {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Move a booking through its lifecycle
#[utoipa::path(
    put,
    path = "/bookings/{id}/status",
    tag = "bookings",
    operation_id = "housing.set_booking_status",
    params(("id" = Uuid, Path, description = "Booking UUID")),
    request_body = UpdateBookingStatusReq,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated booking", body = BookingDto),
        (status = 400, description = "Invalid transition", body = Problem, content_type = "application/problem+json"),
        (status = 403, description = "Forbidden", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Dates overlap an active booking", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn set_booking_status(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req_body): JsonBody<UpdateBookingStatusReq>,
) -> Result<Json<BookingDto>, ProblemResponse> {
    info!("Setting booking {} status to {}", id, req_body.status);

    match svc.set_booking_status(&actor, id, &req_body.status).await {
        Ok(booking) => Ok(Json(BookingDto::from(booking))),
        Err(e) => {
            error!("Failed to set status of booking {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// --- favorites ---

#[utoipa::path(
    get,
    path = "/favorites",
    tag = "favorites",
    operation_id = "housing.list_favorites",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Favorites with listings, newest first", body = [FavoriteDto]),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn list_favorites(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
) -> Result<Json<Vec<FavoriteDto>>, ProblemResponse> {
    info!("Listing favorites");

    match svc.list_favorites(&actor).await {
        Ok(favorites) => Ok(Json(favorites.into_iter().map(FavoriteDto::from).collect())),
        Err(e) => {
            error!("Failed to list favorites: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/favorites/{listing_id}",
    tag = "favorites",
    operation_id = "housing.add_favorite",
    params(("listing_id" = Uuid, Path, description = "Listing UUID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Favorite added", body = FavoriteToggleDto),
        (status = 404, description = "Listing not found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Already a favorite", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn add_favorite(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
    PathParam(listing_id): PathParam<Uuid>,
) -> Result<(StatusCode, Json<FavoriteToggleDto>), ProblemResponse> {
    info!("Adding listing {} to favorites", listing_id);

    match svc.add_favorite(&actor, listing_id).await {
        Ok(favorite) => Ok((
            StatusCode::CREATED,
            Json(FavoriteToggleDto {
                listing_id: favorite.listing_id,
                added: true,
            }),
        )),
        Err(e) => {
            error!("Failed to add favorite {}: {}", listing_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/favorites/{listing_id}",
    tag = "favorites",
    operation_id = "housing.remove_favorite",
    params(("listing_id" = Uuid, Path, description = "Listing UUID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Favorite removed"),
        (status = 404, description = "Not a favorite", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn remove_favorite(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
    PathParam(listing_id): PathParam<Uuid>,
) -> Result<StatusCode, ProblemResponse> {
    info!("Removing listing {} from favorites", listing_id);

    match svc.remove_favorite(&actor, listing_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to remove favorite {}: {}", listing_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Flip the favorite state of a listing for the caller
#[utoipa::path(
    post,
    path = "/favorites/{listing_id}/toggle",
    tag = "favorites",
    operation_id = "housing.toggle_favorite",
    params(("listing_id" = Uuid, Path, description = "Listing UUID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "State after the toggle", body = FavoriteToggleDto),
        (status = 404, description = "Listing not found", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn toggle_favorite(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
    PathParam(listing_id): PathParam<Uuid>,
) -> Result<Json<FavoriteToggleDto>, ProblemResponse> {
    info!("Toggling favorite {}", listing_id);

    match svc.toggle_favorite(&actor, listing_id).await {
        Ok(toggle) => Ok(Json(FavoriteToggleDto::from(toggle))),
        Err(e) => {
            error!("Failed to toggle favorite {}: {}", listing_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/favorites/check/{listing_id}",
    tag = "favorites",
    operation_id = "housing.check_favorite",
    params(("listing_id" = Uuid, Path, description = "Listing UUID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Whether the listing is a favorite", body = FavoriteCheckDto)
    )
)]
pub async fn check_favorite(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
    PathParam(listing_id): PathParam<Uuid>,
) -> Result<Json<FavoriteCheckDto>, ProblemResponse> {
    info!("Checking favorite {}", listing_id);

    match svc.is_favorite(&actor, listing_id).await {
        Ok(is_favorite) => Ok(Json(FavoriteCheckDto {
            listing_id,
            is_favorite,
        })),
        Err(e) => {
            error!("Failed to check favorite {}: {}", listing_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// --- profile ---

/// Caller's profile; created empty on first access
#[utoipa::path(
    get,
    path = "/profile",
    tag = "profile",
    operation_id = "housing.get_profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile", body = ProfileDto),
        (status = 401, description = "Unauthorized", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn get_profile(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
) -> Result<Json<ProfileDto>, ProblemResponse> {
    info!("Getting profile");

    match svc.get_profile(&actor).await {
        Ok(profile) => Ok(Json(ProfileDto::from(profile))),
        Err(e) => {
            error!("Failed to get profile: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    put,
    path = "/profile",
    tag = "profile",
    operation_id = "housing.update_profile",
    request_body = UpdateProfileReq,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated profile", body = ProfileDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn update_profile(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
    JsonBody(req_body): JsonBody<UpdateProfileReq>,
) -> Result<Json<ProfileDto>, ProblemResponse> {
    info!("Updating profile with: {:?}", req_body);

    match svc.update_profile(&actor, req_body.into()).await {
        Ok(profile) => Ok(Json(ProfileDto::from(profile))),
        Err(e) => {
            error!("Failed to update profile: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/profile/picture",
    tag = "profile",
    operation_id = "housing.set_profile_picture",
    request_body = ProfilePictureReq,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated profile", body = ProfileDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn set_profile_picture(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(actor): Authenticated,
    JsonBody(req_body): JsonBody<ProfilePictureReq>,
) -> Result<Json<ProfileDto>, ProblemResponse> {
    info!("Setting profile picture");

    match svc.set_profile_picture(&actor, req_body.url).await {
        Ok(profile) => Ok(Json(ProfileDto::from(profile))),
        Err(e) => {
            error!("Failed to set profile picture: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
