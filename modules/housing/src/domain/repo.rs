use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{
    Booking, BookingStatus, Favorite, Listing, ListingFilter, PaymentStatus, Profile,
};

/// Persistence the domain needs for listings.
#[async_trait]
pub trait ListingsRepository: Send + Sync {
    async fn find_listing(&self, id: Uuid) -> anyhow::Result<Option<Listing>>;
    async fn find_listings_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Listing>>;
    /// Newest first.
    async fn list_listings(&self, filter: &ListingFilter) -> anyhow::Result<Vec<Listing>>;
    async fn insert_listing(&self, listing: Listing) -> anyhow::Result<()>;
    async fn update_listing(&self, listing: Listing) -> anyhow::Result<()>;
    /// Delete the listing and its favorites atomically. Returns true if a row was deleted.
    /// Bookings are never removed; callers must ensure none reference the listing.
    async fn delete_listing(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait BookingsRepository: Send + Sync {
    async fn find_booking(&self, id: Uuid) -> anyhow::Result<Option<Booking>>;
    /// Bookings on the listing with status pending or confirmed.
    async fn active_bookings_for_listing(&self, listing_id: Uuid) -> anyhow::Result<Vec<Booking>>;
    /// All bookings on the listing, whatever their status.
    async fn count_bookings_for_listing(&self, listing_id: Uuid) -> anyhow::Result<u64>;
    /// Newest first.
    async fn bookings_for_student(&self, student_id: Uuid) -> anyhow::Result<Vec<Booking>>;
    /// Bookings on any listing owned by the landlord, newest first.
    async fn bookings_for_landlord(&self, landlord_id: Uuid) -> anyhow::Result<Vec<Booking>>;
    async fn insert_booking(&self, booking: Booking) -> anyhow::Result<()>;
    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        payment_status: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}

#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    async fn find_favorite(
        &self,
        user_id: Uuid,
        listing_id: Uuid,
    ) -> anyhow::Result<Option<Favorite>>;
    /// Returns false when the (user, listing) pair already exists.
    async fn insert_favorite(&self, favorite: Favorite) -> anyhow::Result<bool>;
    /// Returns true if a row was deleted.
    async fn delete_favorite(&self, user_id: Uuid, listing_id: Uuid) -> anyhow::Result<bool>;
    /// Newest first.
    async fn favorites_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Favorite>>;
}

#[async_trait]
pub trait ProfilesRepository: Send + Sync {
    async fn find_profile(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>>;
    async fn upsert_profile(&self, profile: Profile) -> anyhow::Result<()>;
}

/// Everything the housing service persists.
pub trait HousingRepository:
    ListingsRepository + BookingsRepository + FavoritesRepository + ProfilesRepository
{
}

impl<T> HousingRepository for T where
    T: ListingsRepository + BookingsRepository + FavoritesRepository + ProfilesRepository
{
}
