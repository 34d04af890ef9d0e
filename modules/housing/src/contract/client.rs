use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::contract::{
    error::HousingError,
    model::{
        Actor, BookingStatus, BookingWithListing, Favorite, FavoriteToggle, FavoriteWithListing,
        Listing, ListingFilter, ListingPatch, NewBooking, NewListing, Profile, ProfilePatch,
    },
};

/// Public API of the housing module for in-process consumers and client sessions.
#[async_trait]
pub trait HousingApi: Send + Sync {
    // --- listings ---

    async fn list_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>, HousingError>;

    async fn get_listing(&self, id: Uuid) -> Result<Listing, HousingError>;

    async fn create_listing(
        &self,
        actor: &Actor,
        new_listing: NewListing,
    ) -> Result<Listing, HousingError>;

    async fn update_listing(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: ListingPatch,
    ) -> Result<Listing, HousingError>;

    async fn delete_listing(&self, actor: &Actor, id: Uuid) -> Result<(), HousingError>;

    /// True when `[start, end]` overlaps an active booking on the listing.
    async fn has_conflict(
        &self,
        listing_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, HousingError>;

    // --- bookings ---

    async fn create_booking(
        &self,
        actor: &Actor,
        new_booking: NewBooking,
    ) -> Result<BookingWithListing, HousingError>;

    async fn get_booking(&self, actor: &Actor, id: Uuid)
        -> Result<BookingWithListing, HousingError>;

    async fn list_bookings(&self, actor: &Actor) -> Result<Vec<BookingWithListing>, HousingError>;

    async fn set_booking_status(
        &self,
        actor: &Actor,
        id: Uuid,
        requested: BookingStatus,
    ) -> Result<BookingWithListing, HousingError>;

    // --- favorites ---

    async fn list_favorites(&self, actor: &Actor)
        -> Result<Vec<FavoriteWithListing>, HousingError>;

    async fn add_favorite(&self, actor: &Actor, listing_id: Uuid)
        -> Result<Favorite, HousingError>;

    async fn remove_favorite(&self, actor: &Actor, listing_id: Uuid) -> Result<(), HousingError>;

    async fn toggle_favorite(
        &self,
        actor: &Actor,
        listing_id: Uuid,
    ) -> Result<FavoriteToggle, HousingError>;

    async fn is_favorite(&self, actor: &Actor, listing_id: Uuid) -> Result<bool, HousingError>;

    // --- profiles ---

    async fn get_profile(&self, actor: &Actor) -> Result<Profile, HousingError>;

    async fn update_profile(
        &self,
        actor: &Actor,
        patch: ProfilePatch,
    ) -> Result<Profile, HousingError>;

    async fn set_profile_picture(&self, actor: &Actor, url: String)
        -> Result<Profile, HousingError>;
}
