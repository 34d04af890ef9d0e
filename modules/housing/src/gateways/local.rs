use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::HousingApi,
    error::HousingError,
    model::{
        Actor, BookingStatus, BookingWithListing, Favorite, FavoriteToggle, FavoriteWithListing,
        Listing, ListingFilter, ListingPatch, NewBooking, NewListing, Profile, ProfilePatch,
    },
};
use crate::domain::service::Service;

/// In-process implementation of `HousingApi` that delegates to the domain service
pub struct HousingLocalClient {
    service: Arc<Service>,
}

impl HousingLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl HousingApi for HousingLocalClient {
    async fn list_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>, HousingError> {
        self.service.list_listings(filter).await.map_err(Into::into)
    }

    async fn get_listing(&self, id: Uuid) -> Result<Listing, HousingError> {
        self.service.get_listing(id).await.map_err(Into::into)
    }

    async fn create_listing(
        &self,
        actor: &Actor,
        new_listing: NewListing,
    ) -> Result<Listing, HousingError> {
        self.service
            .create_listing(actor, new_listing)
            .await
            .map_err(Into::into)
    }

    async fn update_listing(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: ListingPatch,
    ) -> Result<Listing, HousingError> {
        self.service
            .update_listing(actor, id, patch)
            .await
            .map_err(Into::into)
    }

    async fn delete_listing(&self, actor: &Actor, id: Uuid) -> Result<(), HousingError> {
        self.service.delete_listing(actor, id).await.map_err(Into::into)
    }

    async fn has_conflict(
        &self,
        listing_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, HousingError> {
        self.service
            .has_conflict(listing_id, start, end)
            .await
            .map_err(Into::into)
    }

    async fn create_booking(
        &self,
        actor: &Actor,
        new_booking: NewBooking,
    ) -> Result<BookingWithListing, HousingError> {
        self.service
            .create_booking(actor, new_booking)
            .await
            .map_err(Into::into)
    }

    async fn get_booking(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<BookingWithListing, HousingError> {
        self.service.get_booking(actor, id).await.map_err(Into::into)
    }

    async fn list_bookings(&self, actor: &Actor) -> Result<Vec<BookingWithListing>, HousingError> {
        self.service.list_bookings(actor).await.map_err(Into::into)
    }

    async fn set_booking_status(
        &self,
        actor: &Actor,
        id: Uuid,
        requested: BookingStatus,
    ) -> Result<BookingWithListing, HousingError> {
        self.service
            .set_booking_status(actor, id, requested.as_str())
            .await
            .map_err(Into::into)
    }

    async fn list_favorites(
        &self,
        actor: &Actor,
    ) -> Result<Vec<FavoriteWithListing>, HousingError> {
        self.service.list_favorites(actor).await.map_err(Into::into)
    }

    async fn add_favorite(
        &self,
        actor: &Actor,
        listing_id: Uuid,
    ) -> Result<Favorite, HousingError> {
        self.service
            .add_favorite(actor, listing_id)
            .await
            .map_err(Into::into)
    }

    async fn remove_favorite(&self, actor: &Actor, listing_id: Uuid) -> Result<(), HousingError> {
        self.service
            .remove_favorite(actor, listing_id)
            .await
            .map_err(Into::into)
    }

    async fn toggle_favorite(
        &self,
        actor: &Actor,
        listing_id: Uuid,
    ) -> Result<FavoriteToggle, HousingError> {
        self.service
            .toggle_favorite(actor, listing_id)
            .await
            .map_err(Into::into)
    }

    async fn is_favorite(&self, actor: &Actor, listing_id: Uuid) -> Result<bool, HousingError> {
        self.service
            .is_favorite(actor, listing_id)
            .await
            .map_err(Into::into)
    }

    async fn get_profile(&self, actor: &Actor) -> Result<Profile, HousingError> {
        self.service.get_profile(actor).await.map_err(Into::into)
    }

    async fn update_profile(
        &self,
        actor: &Actor,
        patch: ProfilePatch,
    ) -> Result<Profile, HousingError> {
        self.service
            .update_profile(actor, patch)
            .await
            .map_err(Into::into)
    }

    async fn set_profile_picture(
        &self,
        actor: &Actor,
        url: String,
    ) -> Result<Profile, HousingError> {
        self.service
            .set_profile_picture(actor, url)
            .await
            .map_err(Into::into)
    }
}
