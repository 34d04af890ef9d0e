use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    Actor, Booking, BookingStatus, BookingWithListing, Favorite, FavoriteToggle,
    FavoriteWithListing, Listing, ListingFilter, ListingPatch, ListingStatus, NewBooking,
    NewListing, PaymentStatus, Profile, ProfilePatch, Role,
};
use crate::domain::conflict::{self, DateRange};
use crate::domain::error::DomainError;
use crate::domain::lifecycle::plan_transition;
use crate::domain::locks::ListingLocks;
use crate::domain::repo::HousingRepository;

/// Domain service with the marketplace rules.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn HousingRepository>,
    locks: Arc<ListingLocks>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub min_monthly_price: i64,
    pub max_monthly_price: i64,
    pub max_title_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_monthly_price: 1,
            max_monthly_price: 15_000,
            max_title_length: 200,
        }
    }
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

impl Service {
    pub fn new(repo: Arc<dyn HousingRepository>, config: ServiceConfig) -> Self {
        Self {
            repo,
            locks: Arc::new(ListingLocks::new()),
            config,
        }
    }

    // --- listings ---

    #[instrument(name = "housing.service.list_listings", skip(self))]
    pub async fn list_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>, DomainError> {
        debug!("Listing listings");
        let listings = self.repo.list_listings(&filter).await.map_err(db_err)?;
        debug!("Found {} listings", listings.len());
        Ok(listings)
    }

    #[instrument(name = "housing.service.get_listing", skip(self), fields(listing_id = %id))]
    pub async fn get_listing(&self, id: Uuid) -> Result<Listing, DomainError> {
        debug!("Getting listing by id");
        self.load_listing(id).await
    }

    #[instrument(
        name = "housing.service.create_listing",
        skip(self, actor, new_listing),
        fields(landlord_id = %actor.user_id, title = %new_listing.title)
    )]
    pub async fn create_listing(
        &self,
        actor: &Actor,
        new_listing: NewListing,
    ) -> Result<Listing, DomainError> {
        info!("Creating listing");
        require_landlord(actor, "only landlords can create listings")?;

        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4(),
            landlord_id: actor.user_id,
            title: new_listing.title.trim().to_string(),
            description: new_listing.description,
            address: new_listing.address,
            monthly_price: new_listing.monthly_price,
            amenities: new_listing.amenities,
            images: new_listing.images,
            available_from: new_listing.available_from,
            available_to: new_listing.available_to,
            status: ListingStatus::Available,
            owner_email: new_listing.owner_email,
            owner_phone: new_listing.owner_phone,
            created_at: now,
            updated_at: now,
        };
        self.validate_listing(&listing)?;

        self.repo
            .insert_listing(listing.clone())
            .await
            .map_err(db_err)?;

        info!("Created listing with id={}", listing.id);
        Ok(listing)
    }

    #[instrument(
        name = "housing.service.update_listing",
        skip(self, actor, patch),
        fields(listing_id = %id, landlord_id = %actor.user_id)
    )]
    pub async fn update_listing(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: ListingPatch,
    ) -> Result<Listing, DomainError> {
        info!("Updating listing");
        require_landlord(actor, "only landlords can update listings")?;

        let mut current = self.load_listing(id).await?;
        require_owner(&current, actor)?;

        if let Some(title) = patch.title {
            current.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            current.description = description;
        }
        if let Some(address) = patch.address {
            current.address = address;
        }
        if let Some(price) = patch.monthly_price {
            current.monthly_price = price;
        }
        if let Some(amenities) = patch.amenities {
            current.amenities = amenities;
        }
        if let Some(images) = patch.images {
            current.images = images;
        }
        if let Some(from) = patch.available_from {
            current.available_from = from;
        }
        if let Some(to) = patch.available_to {
            current.available_to = to;
        }
        if let Some(status) = patch.status {
            current.status = status;
        }
        if let Some(email) = patch.owner_email {
            current.owner_email = Some(email);
        }
        if let Some(phone) = patch.owner_phone {
            current.owner_phone = Some(phone);
        }
        self.validate_listing(&current)?;
        current.updated_at = Utc::now();

        self.repo
            .update_listing(current.clone())
            .await
            .map_err(db_err)?;

        info!("Updated listing");
        Ok(current)
    }

    #[instrument(
        name = "housing.service.delete_listing",
        skip(self, actor),
        fields(listing_id = %id, landlord_id = %actor.user_id)
    )]
    pub async fn delete_listing(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting listing");
        require_landlord(actor, "only landlords can delete listings")?;

        let _guard = self.locks.acquire(id).await;
        let listing = self.load_listing(id).await?;
        require_owner(&listing, actor)?;

        let active = self
            .repo
            .active_bookings_for_listing(id)
            .await
            .map_err(db_err)?;
        if !active.is_empty() {
            return Err(DomainError::listing_has_active_bookings(id, active.len()));
        }
        // Booking history outlives listings; mark the listing unavailable instead
        let history = self
            .repo
            .count_bookings_for_listing(id)
            .await
            .map_err(db_err)?;
        if history > 0 {
            return Err(DomainError::listing_has_booking_history(id, history));
        }

        if !self.repo.delete_listing(id).await.map_err(db_err)? {
            return Err(DomainError::listing_not_found(id));
        }
        self.locks.forget(id);

        info!("Deleted listing");
        Ok(())
    }

    /// Availability check: true if `[start, end]` overlaps an active booking.
    #[instrument(name = "housing.service.has_conflict", skip(self), fields(listing_id = %listing_id))]
    pub async fn has_conflict(
        &self,
        listing_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, DomainError> {
        debug!("Checking availability");
        let range = DateRange::new(start, end)?;
        self.load_listing(listing_id).await?;
        conflict::has_conflict(self.repo.as_ref(), listing_id, range.start(), range.end()).await
    }

    // --- bookings ---

    #[instrument(
        name = "housing.service.create_booking",
        skip(self, actor, new_booking),
        fields(student_id = %actor.user_id, listing_id = %new_booking.listing_id)
    )]
    pub async fn create_booking(
        &self,
        actor: &Actor,
        new_booking: NewBooking,
    ) -> Result<BookingWithListing, DomainError> {
        info!("Creating booking");
        if !actor.is_student() {
            return Err(DomainError::forbidden("only students can create bookings"));
        }
        if new_booking.total_price <= 0 {
            return Err(DomainError::validation(
                "total_price",
                "total price must be positive",
            ));
        }
        let range = DateRange::new(new_booking.start_date, new_booking.end_date)?;

        let _guard = self.locks.acquire(new_booking.listing_id).await;
        let listing = self.load_listing(new_booking.listing_id).await?;

        let conflicts =
            conflict::find_conflicts(self.repo.as_ref(), listing.id, &range, None).await?;
        if !conflicts.is_empty() {
            let ids: Vec<Uuid> = conflicts.iter().map(|b| b.id).collect();
            warn!(conflicting = ?ids, "Requested dates overlap active bookings");
            return Err(DomainError::booking_conflict(listing.id, ids));
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            listing_id: listing.id,
            student_id: actor.user_id,
            start_date: range.start(),
            end_date: range.end(),
            total_price: new_booking.total_price,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.repo
            .insert_booking(booking.clone())
            .await
            .map_err(db_err)?;

        info!("Created booking with id={}", booking.id);
        Ok(BookingWithListing { booking, listing })
    }

    #[instrument(
        name = "housing.service.get_booking",
        skip(self, actor),
        fields(booking_id = %id, user_id = %actor.user_id)
    )]
    pub async fn get_booking(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<BookingWithListing, DomainError> {
        debug!("Getting booking");
        let booking = self.load_booking(id).await?;
        let listing = self.load_listing(booking.listing_id).await?;

        let allowed = match actor.role {
            Role::Student => booking.student_id == actor.user_id,
            Role::Landlord => listing.landlord_id == actor.user_id,
        };
        if !allowed {
            return Err(DomainError::forbidden("booking is not visible to this user"));
        }
        Ok(BookingWithListing { booking, listing })
    }

    #[instrument(
        name = "housing.service.list_bookings",
        skip(self, actor),
        fields(user_id = %actor.user_id)
    )]
    pub async fn list_bookings(
        &self,
        actor: &Actor,
    ) -> Result<Vec<BookingWithListing>, DomainError> {
        debug!("Listing bookings");
        let bookings = match actor.role {
            Role::Student => self.repo.bookings_for_student(actor.user_id).await,
            Role::Landlord => self.repo.bookings_for_landlord(actor.user_id).await,
        }
        .map_err(db_err)?;

        let ids: Vec<Uuid> = bookings.iter().map(|b| b.listing_id).collect();
        let listings = self.listings_by_id(&ids).await?;

        let result: Vec<BookingWithListing> = bookings
            .into_iter()
            .filter_map(|booking| {
                listings
                    .get(&booking.listing_id)
                    .cloned()
                    .map(|listing| BookingWithListing { booking, listing })
            })
            .collect();
        debug!("Found {} bookings", result.len());
        Ok(result)
    }

    /// Move a booking to `requested`, enforcing ownership and transition rules.
    ///
    /// Re-activating a cancelled booking re-runs the conflict check against the
    /// other active bookings on the listing.
    #[instrument(
        name = "housing.service.set_booking_status",
        skip(self, actor),
        fields(booking_id = %id, user_id = %actor.user_id)
    )]
    pub async fn set_booking_status(
        &self,
        actor: &Actor,
        id: Uuid,
        requested: &str,
    ) -> Result<BookingWithListing, DomainError> {
        info!("Changing booking status");
        let listing_id = self.load_booking(id).await?.listing_id;

        let _guard = self.locks.acquire(listing_id).await;
        let mut booking = self.load_booking(id).await?;
        let listing = self.load_listing(booking.listing_id).await?;

        let transition = plan_transition(&booking, listing.landlord_id, actor, requested)?;

        if transition.reactivates {
            let conflicts = conflict::find_conflicts(
                self.repo.as_ref(),
                listing.id,
                &DateRange::of(&booking),
                Some(booking.id),
            )
            .await?;
            if !conflicts.is_empty() {
                let ids: Vec<Uuid> = conflicts.iter().map(|b| b.id).collect();
                warn!(conflicting = ?ids, "Re-activation would overlap active bookings");
                return Err(DomainError::booking_conflict(listing.id, ids));
            }
        }

        let now = Utc::now();
        self.repo
            .update_booking_status(id, transition.status, transition.payment_status, now)
            .await
            .map_err(db_err)?;

        info!(
            from = %booking.status,
            to = %transition.status,
            payment_status = %transition.payment_status,
            "Booking status changed"
        );
        booking.status = transition.status;
        booking.payment_status = transition.payment_status;
        booking.updated_at = now;
        Ok(BookingWithListing { booking, listing })
    }

    // --- favorites ---

    #[instrument(
        name = "housing.service.list_favorites",
        skip(self, actor),
        fields(user_id = %actor.user_id)
    )]
    pub async fn list_favorites(
        &self,
        actor: &Actor,
    ) -> Result<Vec<FavoriteWithListing>, DomainError> {
        debug!("Listing favorites");
        let favorites = self
            .repo
            .favorites_for_user(actor.user_id)
            .await
            .map_err(db_err)?;

        let ids: Vec<Uuid> = favorites.iter().map(|f| f.listing_id).collect();
        let listings = self.listings_by_id(&ids).await?;

        Ok(favorites
            .into_iter()
            .filter_map(|favorite| {
                listings
                    .get(&favorite.listing_id)
                    .cloned()
                    .map(|listing| FavoriteWithListing { favorite, listing })
            })
            .collect())
    }

    #[instrument(
        name = "housing.service.add_favorite",
        skip(self, actor),
        fields(user_id = %actor.user_id, listing_id = %listing_id)
    )]
    pub async fn add_favorite(
        &self,
        actor: &Actor,
        listing_id: Uuid,
    ) -> Result<Favorite, DomainError> {
        info!("Adding favorite");
        self.load_listing(listing_id).await?;

        let favorite = Favorite {
            id: Uuid::new_v4(),
            user_id: actor.user_id,
            listing_id,
            created_at: Utc::now(),
        };
        if !self
            .repo
            .insert_favorite(favorite.clone())
            .await
            .map_err(db_err)?
        {
            return Err(DomainError::duplicate_favorite(listing_id));
        }
        Ok(favorite)
    }

    #[instrument(
        name = "housing.service.remove_favorite",
        skip(self, actor),
        fields(user_id = %actor.user_id, listing_id = %listing_id)
    )]
    pub async fn remove_favorite(&self, actor: &Actor, listing_id: Uuid) -> Result<(), DomainError> {
        info!("Removing favorite");
        if !self
            .repo
            .delete_favorite(actor.user_id, listing_id)
            .await
            .map_err(db_err)?
        {
            return Err(DomainError::favorite_not_found(listing_id));
        }
        Ok(())
    }

    /// Remove the favorite if present, otherwise add it.
    #[instrument(
        name = "housing.service.toggle_favorite",
        skip(self, actor),
        fields(user_id = %actor.user_id, listing_id = %listing_id)
    )]
    pub async fn toggle_favorite(
        &self,
        actor: &Actor,
        listing_id: Uuid,
    ) -> Result<FavoriteToggle, DomainError> {
        info!("Toggling favorite");
        if self
            .repo
            .delete_favorite(actor.user_id, listing_id)
            .await
            .map_err(db_err)?
        {
            return Ok(FavoriteToggle {
                listing_id,
                added: false,
            });
        }

        match self.add_favorite(actor, listing_id).await {
            // A concurrent toggle inserted it first; the favorite exists either way
            Ok(_) | Err(DomainError::DuplicateFavorite { .. }) => Ok(FavoriteToggle {
                listing_id,
                added: true,
            }),
            Err(e) => Err(e),
        }
    }

    #[instrument(
        name = "housing.service.is_favorite",
        skip(self, actor),
        fields(user_id = %actor.user_id, listing_id = %listing_id)
    )]
    pub async fn is_favorite(&self, actor: &Actor, listing_id: Uuid) -> Result<bool, DomainError> {
        debug!("Checking favorite");
        Ok(self
            .repo
            .find_favorite(actor.user_id, listing_id)
            .await
            .map_err(db_err)?
            .is_some())
    }

    // --- profiles ---

    /// Profiles are created on first access.
    #[instrument(
        name = "housing.service.get_profile",
        skip(self, actor),
        fields(user_id = %actor.user_id)
    )]
    pub async fn get_profile(&self, actor: &Actor) -> Result<Profile, DomainError> {
        debug!("Getting profile");
        self.load_or_create_profile(actor.user_id).await
    }

    #[instrument(
        name = "housing.service.update_profile",
        skip(self, actor, patch),
        fields(user_id = %actor.user_id)
    )]
    pub async fn update_profile(
        &self,
        actor: &Actor,
        patch: ProfilePatch,
    ) -> Result<Profile, DomainError> {
        info!("Updating profile");
        let mut profile = self.load_or_create_profile(actor.user_id).await?;

        if let Some(bio) = patch.bio {
            profile.bio = bio;
        }
        if let Some(phone) = patch.phone_number {
            profile.phone_number = phone;
        }
        if let Some(address) = patch.address {
            profile.address = address;
        }
        if let Some(contact) = patch.emergency_contact {
            let current = &mut profile.emergency_contact;
            if let Some(name) = contact.name {
                current.name = name;
            }
            if let Some(relationship) = contact.relationship {
                current.relationship = relationship;
            }
            if let Some(phone) = contact.phone_number {
                current.phone_number = phone;
            }
        }
        if let Some(prefs) = patch.preferences {
            let current = &mut profile.preferences;
            if let Some(room_type) = prefs.room_type {
                current.room_type = room_type;
            }
            if let Some(min) = prefs.price_min {
                current.price_min = Some(min);
            }
            if let Some(max) = prefs.price_max {
                current.price_max = Some(max);
            }
            if let Some(amenities) = prefs.amenities {
                current.amenities = amenities;
            }
            if let Some(locations) = prefs.locations {
                current.locations = locations;
            }
        }
        validate_preferences(&profile)?;
        profile.updated_at = Utc::now();

        self.repo
            .upsert_profile(profile.clone())
            .await
            .map_err(db_err)?;
        info!("Updated profile");
        Ok(profile)
    }

    #[instrument(
        name = "housing.service.set_profile_picture",
        skip(self, actor, url),
        fields(user_id = %actor.user_id)
    )]
    pub async fn set_profile_picture(
        &self,
        actor: &Actor,
        url: String,
    ) -> Result<Profile, DomainError> {
        info!("Setting profile picture");
        let url = url.trim();
        if url.is_empty() {
            return Err(DomainError::validation(
                "profile_picture",
                "picture URL cannot be empty",
            ));
        }

        let mut profile = self.load_or_create_profile(actor.user_id).await?;
        profile.profile_picture = Some(url.to_string());
        profile.updated_at = Utc::now();
        self.repo
            .upsert_profile(profile.clone())
            .await
            .map_err(db_err)?;
        Ok(profile)
    }

    // --- helpers ---

    async fn load_listing(&self, id: Uuid) -> Result<Listing, DomainError> {
        self.repo
            .find_listing(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::listing_not_found(id))
    }

    async fn load_booking(&self, id: Uuid) -> Result<Booking, DomainError> {
        self.repo
            .find_booking(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::booking_not_found(id))
    }

    async fn listings_by_id(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Listing>, DomainError> {
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();
        Ok(self
            .repo
            .find_listings_by_ids(&unique)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|l| (l.id, l))
            .collect())
    }

    async fn load_or_create_profile(&self, user_id: Uuid) -> Result<Profile, DomainError> {
        if let Some(profile) = self.repo.find_profile(user_id).await.map_err(db_err)? {
            return Ok(profile);
        }
        debug!("Creating empty profile");
        let profile = Profile::empty(user_id, Utc::now());
        self.repo
            .upsert_profile(profile.clone())
            .await
            .map_err(db_err)?;
        Ok(profile)
    }

    fn validate_listing(&self, listing: &Listing) -> Result<(), DomainError> {
        let title = listing.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title", "title cannot be empty"));
        }
        if title.chars().count() > self.config.max_title_length {
            return Err(DomainError::validation(
                "title",
                format!(
                    "title too long: {} characters (max: {})",
                    title.chars().count(),
                    self.config.max_title_length
                ),
            ));
        }
        let (min, max) = (self.config.min_monthly_price, self.config.max_monthly_price);
        if listing.monthly_price < min || listing.monthly_price > max {
            return Err(DomainError::validation(
                "monthly_price",
                format!(
                    "monthly price {} is outside the allowed range {min}..={max}",
                    listing.monthly_price
                ),
            ));
        }
        if listing.available_to < listing.available_from {
            return Err(DomainError::validation(
                "available_to",
                "availability window ends before it starts",
            ));
        }
        if let Some(email) = &listing.owner_email {
            if !email.contains('@') {
                return Err(DomainError::validation(
                    "owner_email",
                    format!("'{email}' is not an email address"),
                ));
            }
        }
        Ok(())
    }
}

fn require_landlord(actor: &Actor, reason: &str) -> Result<(), DomainError> {
    if actor.is_landlord() {
        Ok(())
    } else {
        Err(DomainError::forbidden(reason))
    }
}

fn require_owner(listing: &Listing, actor: &Actor) -> Result<(), DomainError> {
    if listing.landlord_id == actor.user_id {
        Ok(())
    } else {
        Err(DomainError::forbidden("listing belongs to another landlord"))
    }
}

fn validate_preferences(profile: &Profile) -> Result<(), DomainError> {
    let prefs = &profile.preferences;
    for (field, value) in [("price_min", prefs.price_min), ("price_max", prefs.price_max)] {
        if matches!(value, Some(v) if v < 0) {
            return Err(DomainError::validation(field, "price cannot be negative"));
        }
    }
    if let (Some(min), Some(max)) = (prefs.price_min, prefs.price_max) {
        if min > max {
            return Err(DomainError::validation(
                "price_max",
                "price_max must not be below price_min",
            ));
        }
    }
    Ok(())
}
