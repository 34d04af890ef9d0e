use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::rest::auth::Authenticator;
use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the housing REST surface on `router`.
///
/// The service and the authenticator travel as request extensions, so the
/// returned router stays stateless and can be merged into any host router.
pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    authenticator: Arc<dyn Authenticator>,
) -> anyhow::Result<Router> {
    let housing = Router::new()
        // Listings; reads are public
        .route(
            "/listings",
            get(handlers::list_listings).post(handlers::create_listing),
        )
        .route(
            "/listings/{id}",
            get(handlers::get_listing)
                .put(handlers::update_listing)
                .delete(handlers::delete_listing),
        )
        .route(
            "/listings/{id}/availability",
            get(handlers::check_availability),
        )
        // Bookings
        .route(
            "/bookings",
            get(handlers::list_bookings).post(handlers::create_booking),
        )
        .route("/bookings/{id}", get(handlers::get_booking))
        .route("/bookings/{id}/status", put(handlers::set_booking_status))
        // Favorites
        .route("/favorites", get(handlers::list_favorites))
        .route(
            "/favorites/{listing_id}",
            post(handlers::add_favorite).delete(handlers::remove_favorite),
        )
        .route(
            "/favorites/{listing_id}/toggle",
            post(handlers::toggle_favorite),
        )
        .route(
            "/favorites/check/{listing_id}",
            get(handlers::check_favorite),
        )
        // Profile
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/profile/picture", post(handlers::set_profile_picture))
        .layer(Extension(authenticator))
        .layer(Extension(service));

    Ok(router.merge(housing))
}
